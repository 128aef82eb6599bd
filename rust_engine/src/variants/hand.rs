//! 手骨架：五根手指各自成链（五个根关节）

use glam::Vec3;

use crate::classify::{ClassifierTable, Comparison, Region};
use crate::pose::{Axis, CoordinateKey, JointRecipe, Pose, PoseRecipe, Step};
use crate::skeleton::{JointDef, JointId};

use super::SkeletonVariant;

pub const NAME: &str = "hand";

// 每个关节一个绕 X 轴的坐标，坐标键与关节索引一一对应
pub const H11_X: CoordinateKey = CoordinateKey(0);
pub const H12_X: CoordinateKey = CoordinateKey(1);
pub const H21_X: CoordinateKey = CoordinateKey(2);
pub const H22_X: CoordinateKey = CoordinateKey(3);
pub const H23_X: CoordinateKey = CoordinateKey(4);
pub const H31_X: CoordinateKey = CoordinateKey(5);
pub const H32_X: CoordinateKey = CoordinateKey(6);
pub const H33_X: CoordinateKey = CoordinateKey(7);
pub const H41_X: CoordinateKey = CoordinateKey(8);
pub const H42_X: CoordinateKey = CoordinateKey(9);
pub const H43_X: CoordinateKey = CoordinateKey(10);
pub const H51_X: CoordinateKey = CoordinateKey(11);
pub const H52_X: CoordinateKey = CoordinateKey(12);
pub const H53_X: CoordinateKey = CoordinateKey(13);

pub const H11: JointId = JointId(0);
pub const H12: JointId = JointId(1);
pub const H21: JointId = JointId(2);
pub const H22: JointId = JointId(3);
pub const H23: JointId = JointId(4);
pub const H31: JointId = JointId(5);
pub const H32: JointId = JointId(6);
pub const H33: JointId = JointId(7);
pub const H41: JointId = JointId(8);
pub const H42: JointId = JointId(9);
pub const H43: JointId = JointId(10);
pub const H51: JointId = JointId(11);
pub const H52: JointId = JointId(12);
pub const H53: JointId = JointId(13);

const JOINT_NAMES: [&str; 14] = [
    "H11", "H12", "H21", "H22", "H23", "H31", "H32", "H33", "H41", "H42", "H43", "H51", "H52",
    "H53",
];

const COORDINATE_NAMES: [&str; 14] = [
    "H11_X", "H12_X", "H21_X", "H22_X", "H23_X", "H31_X", "H32_X", "H33_X", "H41_X", "H42_X",
    "H43_X", "H51_X", "H52_X", "H53_X",
];

/// 每个关节的父关节
const PARENTS: [Option<JointId>; 14] = [
    None,
    Some(H11),
    None,
    Some(H21),
    Some(H22),
    None,
    Some(H31),
    Some(H32),
    None,
    Some(H41),
    Some(H42),
    None,
    Some(H51),
    Some(H52),
];

fn joints() -> Vec<JointDef> {
    JOINT_NAMES
        .iter()
        .zip(PARENTS)
        .map(|(name, parent)| JointDef {
            name: name.to_string(),
            parent,
        })
        .collect()
}

fn recipe() -> PoseRecipe {
    let recipes = (0..JOINT_NAMES.len())
        .map(|i| JointRecipe::new(JointId(i), vec![Step::rotate(CoordinateKey(i), Axis::X)]))
        .collect();
    PoseRecipe::new(JOINT_NAMES.len(), recipes)
}

/// 绑定姿态：h1.obj 建模时手指略微弯曲
fn bind_pose() -> Pose {
    Pose::from_pairs((0..COORDINATE_NAMES.len()).map(|i| (CoordinateKey(i), 0.0)))
        .with(H32_X, 3.0)
        .with(H33_X, 3.0)
        .with(H41_X, -5.0)
        .with(H42_X, 5.0)
        .with(H52_X, -15.0)
        .with(H53_X, -15.0)
}

/// h1.obj 的顶点分类阈值
///
/// 匹配不到任何区域的顶点（掌心附近）归到 H11。
fn classifier() -> ClassifierTable {
    use Axis::{X, Y};
    use Comparison::{Gt, Lt};

    ClassifierTable::new(H11)
        .region(Region::new(H12).when(X, Lt, -0.13).when(Y, Lt, -0.23))
        .region(Region::new(H11).when(X, Lt, -0.13))
        .region(Region::new(H23).when(X, Gt, -0.13).when(Y, Lt, -0.385))
        .region(Region::new(H22).when(X, Gt, -0.13).when(Y, Lt, -0.345))
        .region(Region::new(H21).when(X, Gt, -0.13).when(Y, Lt, -0.24))
        .region(Region::new(H33).when(X, Gt, -0.06).when(Y, Lt, -0.395))
        .region(Region::new(H32).when(X, Gt, -0.06).when(Y, Lt, -0.35))
        .region(Region::new(H31).when(X, Gt, -0.06).when(Y, Lt, -0.24))
        .region(Region::new(H43).when(X, Gt, 0.013).when(Y, Lt, -0.38))
        .region(Region::new(H42).when(X, Gt, 0.013).when(Y, Lt, -0.34))
        .region(Region::new(H41).when(X, Gt, 0.013).when(Y, Lt, -0.24))
        .region(Region::new(H53).when(X, Gt, 0.07).when(Y, Lt, -0.33))
        .region(Region::new(H52).when(X, Gt, 0.07).when(Y, Lt, -0.3))
        .region(Region::new(H51).when(X, Gt, 0.07).when(Y, Lt, -0.24))
}

/// 演示姿态：所有坐标为 0（手指伸直）
pub fn demo_pose(_time: f32) -> Pose {
    Pose::from_pairs((0..COORDINATE_NAMES.len()).map(|i| (CoordinateKey(i), 0.0)))
}

pub fn variant() -> SkeletonVariant {
    SkeletonVariant {
        name: NAME,
        joints: joints(),
        coordinate_names: COORDINATE_NAMES.to_vec(),
        recipe: recipe(),
        bind_pose: bind_pose(),
        classifier: classifier(),
        camera_position: Vec3::new(0.0, -0.3, 1.0),
        reference_offset: None,
        draw_skeleton: true,
        // y = -0.3 水平线，对照手指分区阈值
        guide_segment: Some((Vec3::new(-0.4, -0.3, 0.0), Vec3::new(0.2, -0.3, 0.0))),
        mesh_path: "models/h1.obj",
        demo_pose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Hierarchy;
    use crate::skinning::SkinningPipeline;
    use glam::Mat4;

    #[test]
    fn test_five_finger_roots() {
        let hierarchy = Hierarchy::new(&joints()).unwrap();
        let roots: Vec<_> = hierarchy.roots().collect();
        assert_eq!(roots, vec![H11, H21, H31, H41, H51]);
        assert_eq!(hierarchy.depth(H53), 2);
    }

    #[test]
    fn test_classifier_regions() {
        let table = classifier();
        assert_eq!(table.joint_for(Vec3::new(-0.2, -0.3, 0.0)), H12);
        assert_eq!(table.joint_for(Vec3::new(-0.2, -0.1, 0.0)), H11);
        assert_eq!(table.joint_for(Vec3::new(-0.1, -0.4, 0.0)), H23);
        assert_eq!(table.joint_for(Vec3::new(0.0, -0.36, 0.0)), H22);
        assert_eq!(table.joint_for(Vec3::new(0.1, -0.1, 0.0)), H11);
    }

    #[test]
    fn test_straight_fingers_relative_to_bent_bind() {
        let pipeline = SkinningPipeline::new(
            Hierarchy::new(&joints()).unwrap(),
            recipe(),
            bind_pose(),
        )
        .unwrap();
        let result = pipeline.evaluate(&demo_pose(0.0));

        // 未在绑定姿态中弯曲的手指保持不动
        for joint in [H11, H12, H21, H22, H23, H31, H51] {
            assert!(result.skinning[joint.0].abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
        // H52 绑定时累计 -15 度，伸直后相对绑定姿态转回 +15 度
        let expected = Mat4::from_rotation_x(15f32.to_radians());
        assert!(result.skinning[H52.0].abs_diff_eq(expected, 1e-5));
    }
}
