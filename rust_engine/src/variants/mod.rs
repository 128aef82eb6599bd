//! 骨架配置数据（编译期常量）
//!
//! 每种骨架一份：关节表、坐标配方、绑定姿态、顶点分类阈值表。
//! 管线本身只有一份实现，配置数据不同。

pub mod hand;
pub mod human;

use glam::Vec3;

use crate::classify::ClassifierTable;
use crate::pose::{CoordinateKey, Pose, PoseGenerator, PoseRecipe};
use crate::skeleton::{Hierarchy, JointDef};
use crate::{Result, SkinError};

/// 一种骨架配置
#[derive(Clone, Debug)]
pub struct SkeletonVariant {
    pub name: &'static str,
    pub joints: Vec<JointDef>,
    /// 坐标名称，下标即坐标键
    pub coordinate_names: Vec<&'static str>,
    pub recipe: PoseRecipe,
    /// 绑定网格与骨架时的参考姿态
    pub bind_pose: Pose,
    pub classifier: ClassifierTable,
    /// 相机初始位置
    pub camera_position: Vec3,
    /// 静止姿态参照网格的摆放位置（None 表示不绘制）
    pub reference_offset: Option<Vec3>,
    /// 是否绘制骨架线段与关节点
    pub draw_skeleton: bool,
    /// 调整阈值用的固定参考线段（世界坐标）
    pub guide_segment: Option<(Vec3, Vec3)>,
    /// 蒙皮网格路径
    pub mesh_path: &'static str,
    /// 演示用的随时间变化的姿态
    pub demo_pose: fn(f32) -> Pose,
}

impl SkeletonVariant {
    pub fn hierarchy(&self) -> Result<Hierarchy> {
        Hierarchy::new(&self.joints)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn coordinate_count(&self) -> usize {
        self.coordinate_names.len()
    }

    /// 通过名称查找坐标键
    pub fn coordinate(&self, name: &str) -> Option<CoordinateKey> {
        self.coordinate_names
            .iter()
            .position(|n| *n == name)
            .map(CoordinateKey)
    }

    /// 检查配方与阈值表都引用存在的关节
    pub fn validate(&self) -> Result<()> {
        if self.recipe.joint_count != self.joints.len() {
            return Err(SkinError::JointCountMismatch {
                expected: self.joints.len(),
                actual: self.recipe.joint_count,
            });
        }
        self.recipe.validate()?;
        self.classifier.validate(self.joints.len())
    }
}

impl PoseGenerator for SkeletonVariant {
    fn pose_at(&self, time: f32) -> Pose {
        (self.demo_pose)(time)
    }
}

/// 所有内置骨架名称
pub const VARIANT_NAMES: [&str; 2] = [human::NAME, hand::NAME];

/// 通过名称获取内置骨架
pub fn by_name(name: &str) -> Result<SkeletonVariant> {
    match name {
        human::NAME => Ok(human::variant()),
        hand::NAME => Ok(hand::variant()),
        other => Err(SkinError::UnknownVariant(other.to_string())),
    }
}
