//! 顶点 -> 控制关节分类

mod classifier;

pub use classifier::{classify, ClassifierTable, Comparison, Region, Threshold};

use crate::skeleton::JointId;

/// 顶点的控制关节（静态，网格加载后计算一次）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexJointAssignment {
    joints: Vec<JointId>,
}

impl VertexJointAssignment {
    pub fn new(joints: Vec<JointId>) -> Self {
        Self { joints }
    }

    /// 顶点数量
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint(&self, vertex: usize) -> Option<JointId> {
        self.joints.get(vertex).copied()
    }

    pub fn as_slice(&self) -> &[JointId] {
        &self.joints
    }

    /// 每个关节分到的顶点数（按关节索引）
    pub fn histogram(&self, joint_count: usize) -> Vec<usize> {
        let mut counts = vec![0usize; joint_count];
        for joint in &self.joints {
            if let Some(count) = counts.get_mut(joint.0) {
                *count += 1;
            }
        }
        counts
    }

    /// 顶点属性格式（每顶点一个 float，与着色器的关节索引属性一致）
    pub fn to_attribute(&self) -> Vec<f32> {
        self.joints.iter().map(|j| j.0 as f32).collect()
    }
}
