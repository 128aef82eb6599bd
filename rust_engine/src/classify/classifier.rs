//! 基于坐标阈值的顶点分类
//!
//! 阈值表只对编写它的那一个网格有效，换网格需要换整张表。

use glam::Vec3;
use rayon::prelude::*;

use crate::config;
use crate::pose::Axis;
use crate::skeleton::JointId;
use crate::{Result, SkinError};

use super::VertexJointAssignment;

/// 比较方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn test(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }
}

/// 单个轴对齐阈值条件
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    pub axis: Axis,
    pub cmp: Comparison,
    pub value: f32,
}

impl Threshold {
    pub fn new(axis: Axis, cmp: Comparison, value: f32) -> Self {
        Self { axis, cmp, value }
    }

    pub fn matches(&self, p: Vec3) -> bool {
        self.cmp.test(self.axis.component(p), self.value)
    }
}

/// 区域：所有条件同时满足时归属 `joint`
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub joint: JointId,
    pub conditions: Vec<Threshold>,
}

impl Region {
    pub fn new(joint: JointId) -> Self {
        Self {
            joint,
            conditions: Vec::new(),
        }
    }

    pub fn when(mut self, axis: Axis, cmp: Comparison, value: f32) -> Self {
        self.conditions.push(Threshold::new(axis, cmp, value));
        self
    }

    pub fn matches(&self, p: Vec3) -> bool {
        self.conditions.iter().all(|c| c.matches(p))
    }
}

/// 阈值表：按优先级排列的区域 + 兜底关节
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierTable {
    pub regions: Vec<Region>,
    pub fallback: JointId,
}

impl ClassifierTable {
    pub fn new(fallback: JointId) -> Self {
        Self {
            regions: Vec::new(),
            fallback,
        }
    }

    pub fn region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// 第一个匹配的区域胜出，否则使用兜底关节
    pub fn joint_for(&self, p: Vec3) -> JointId {
        self.regions
            .iter()
            .find(|r| r.matches(p))
            .map(|r| r.joint)
            .unwrap_or(self.fallback)
    }

    /// 检查表中引用的关节都存在
    pub fn validate(&self, joint_count: usize) -> Result<()> {
        let joints = self.regions.iter().map(|r| r.joint).chain([self.fallback]);
        for joint in joints {
            if joint.0 >= joint_count {
                return Err(SkinError::UnknownJoint { joint: joint.0 });
            }
        }
        Ok(())
    }
}

/// 为每个静止姿态顶点分配控制关节
pub fn classify(table: &ClassifierTable, positions: &[Vec3]) -> VertexJointAssignment {
    let joints = if config::with_config(|c| c.parallel_classify) {
        // par_iter + collect 保持输入顺序
        positions.par_iter().map(|p| table.joint_for(*p)).collect()
    } else {
        positions.iter().map(|p| table.joint_for(*p)).collect()
    };
    VertexJointAssignment::new(joints)
}
