//! 坐标 -> 本地变换配方（骨架配置数据）

use glam::{Mat4, Vec3};

use crate::skeleton::JointId;
use crate::{Result, SkinError};

use super::CoordinateKey;

/// 坐标轴
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// 取向量在该轴上的分量
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// 基本变换类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// 绕轴旋转，坐标值单位为角度
    Rotate,
    /// 沿轴平移，坐标值为长度
    Translate,
}

/// 单个组合步骤：(坐标键, 轴, 类型)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub key: CoordinateKey,
    pub axis: Axis,
    pub kind: StepKind,
}

impl Step {
    pub fn rotate(key: CoordinateKey, axis: Axis) -> Self {
        Self {
            key,
            axis,
            kind: StepKind::Rotate,
        }
    }

    pub fn translate(key: CoordinateKey, axis: Axis) -> Self {
        Self {
            key,
            axis,
            kind: StepKind::Translate,
        }
    }

    /// 给定坐标值时的变换矩阵；值为 0 时为单位矩阵
    pub fn matrix(&self, value: f32) -> Mat4 {
        match self.kind {
            StepKind::Rotate => Mat4::from_axis_angle(self.axis.unit(), value.to_radians()),
            StepKind::Translate => Mat4::from_translation(self.axis.unit() * value),
        }
    }
}

/// 单个关节的配方，按从左到右的矩阵顺序组合
#[derive(Clone, Debug)]
pub struct JointRecipe {
    pub joint: JointId,
    pub steps: Vec<Step>,
}

impl JointRecipe {
    pub fn new(joint: JointId, steps: Vec<Step>) -> Self {
        Self { joint, steps }
    }

    pub fn references(&self, key: CoordinateKey) -> bool {
        self.steps.iter().any(|s| s.key == key)
    }
}

/// 整个骨架的配方
#[derive(Clone, Debug)]
pub struct PoseRecipe {
    pub joint_count: usize,
    pub recipes: Vec<JointRecipe>,
}

impl PoseRecipe {
    pub fn new(joint_count: usize, recipes: Vec<JointRecipe>) -> Self {
        Self { joint_count, recipes }
    }

    /// 检查配方引用的关节都存在
    pub fn validate(&self) -> Result<()> {
        for recipe in &self.recipes {
            if recipe.joint.0 >= self.joint_count {
                return Err(SkinError::UnknownJoint { joint: recipe.joint.0 });
            }
        }
        Ok(())
    }

    /// 配方中引用了 `key` 的关节
    pub fn joints_referencing(&self, key: CoordinateKey) -> Vec<JointId> {
        self.recipes
            .iter()
            .filter(|r| r.references(key))
            .map(|r| r.joint)
            .collect()
    }

    /// 某关节配方引用的全部坐标键
    pub fn referenced_keys(&self, joint: JointId) -> Vec<CoordinateKey> {
        self.recipes
            .iter()
            .filter(|r| r.joint == joint)
            .flat_map(|r| r.steps.iter().map(|s| s.key))
            .collect()
    }
}
