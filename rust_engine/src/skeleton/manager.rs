//! 骨架：持有全部关节，负责姿态传播

use glam::{Mat4, Vec3};

use crate::render::UniformLocation;
use crate::{Result, SkinError};

use super::{propagate, Hierarchy, Joint, JointDef, JointId};

/// 骨架绘制用的矩阵上传目标（由外部着色器层提供）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixTargets {
    pub model: UniformLocation,
    pub view: UniformLocation,
    pub projection: UniformLocation,
}

/// 骨架
///
/// 独占所有关节；销毁骨架即销毁全部关节。
pub struct Skeleton {
    hierarchy: Hierarchy,
    joints: Vec<Joint>,
    targets: Option<MatrixTargets>,
}

impl Skeleton {
    pub fn new(defs: &[JointDef]) -> Result<Self> {
        let hierarchy = Hierarchy::new(defs)?;
        Ok(Self::from_hierarchy(hierarchy, defs))
    }

    fn from_hierarchy(hierarchy: Hierarchy, defs: &[JointDef]) -> Self {
        let joints = defs.iter().map(Joint::new).collect();
        Self {
            hierarchy,
            joints,
            targets: None,
        }
    }

    /// 设置矩阵上传目标
    pub fn set_targets(&mut self, targets: MatrixTargets) {
        self.targets = Some(targets);
    }

    pub fn targets(&self) -> Option<MatrixTargets> {
        self.targets
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// 获取关节数量
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// 获取关节
    pub fn get_joint(&self, joint: JointId) -> Option<&Joint> {
        self.joints.get(joint.0)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// 设置姿态：覆盖所有关节的本地变换并重新计算世界变换
    pub fn set_pose(&mut self, locals: &[Mat4]) -> Result<()> {
        let world = propagate(&self.hierarchy, locals)?;
        for ((joint, local), global) in self.joints.iter_mut().zip(locals).zip(world) {
            joint.local_transform = *local;
            joint.global_transform = global;
        }
        Ok(())
    }

    /// 写入已计算好的本地与世界变换（长度由调用方保证）
    pub(crate) fn store_pose(&mut self, locals: &[Mat4], world: &[Mat4]) {
        for ((joint, local), global) in self.joints.iter_mut().zip(locals).zip(world) {
            joint.local_transform = *local;
            joint.global_transform = *global;
        }
    }

    /// 获取全局变换
    pub fn get_global_transform(&self, joint: JointId) -> Result<Mat4> {
        self.joints
            .get(joint.0)
            .map(|j| j.global_transform)
            .ok_or(SkinError::UnknownJoint { joint: joint.0 })
    }

    /// 最近一次姿态的全部世界变换（按关节索引）
    pub fn world_transforms(&self) -> Vec<Mat4> {
        self.joints.iter().map(|j| j.global_transform).collect()
    }

    /// 关节原点的世界坐标
    pub fn joint_positions(&self) -> Vec<Vec3> {
        self.joints.iter().map(Joint::world_position).collect()
    }

    /// 骨骼线段（父关节原点 -> 子关节原点），根关节不产生线段
    pub fn bone_segments(&self) -> Vec<(Vec3, Vec3)> {
        self.hierarchy
            .order()
            .iter()
            .filter_map(|&joint| {
                let parent = self.hierarchy.parent(joint)?;
                Some((
                    self.joints[parent.0].world_position(),
                    self.joints[joint.0].world_position(),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm() -> Skeleton {
        Skeleton::new(&[
            JointDef::root("shoulder"),
            JointDef::child("elbow", JointId(0)),
            JointDef::child("wrist", JointId(1)),
        ])
        .unwrap()
    }

    #[test]
    fn test_set_pose_overwrites_all_joints() {
        let mut skeleton = arm();
        let offset = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        skeleton.set_pose(&[offset; 3]).unwrap();

        let positions = skeleton.joint_positions();
        assert!(positions[0].abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        assert!(positions[2].abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-6));

        skeleton.set_pose(&[Mat4::IDENTITY; 3]).unwrap();
        for joint in skeleton.joints() {
            assert!(joint.global_transform.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_set_pose_length_mismatch() {
        let mut skeleton = arm();
        assert!(skeleton.set_pose(&[Mat4::IDENTITY; 2]).is_err());
    }

    #[test]
    fn test_bone_segments() {
        let mut skeleton = arm();
        let offset = Mat4::from_translation(Vec3::X);
        skeleton.set_pose(&[Mat4::IDENTITY, offset, offset]).unwrap();

        let segments = skeleton.bone_segments();
        assert_eq!(segments.len(), 2);
        assert!(segments[0].0.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(segments[0].1.abs_diff_eq(Vec3::X, 1e-6));
        assert!(segments[1].1.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_unknown_joint_lookup() {
        let skeleton = arm();
        assert!(skeleton.get_global_transform(JointId(0)).is_ok());
        assert!(matches!(
            skeleton.get_global_transform(JointId(9)),
            Err(SkinError::UnknownJoint { joint: 9 })
        ));
    }
}
