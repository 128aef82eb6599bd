//! Skin Engine - 关节骨架蒙皮运行时
//!
//! 提供从广义坐标到蒙皮矩阵的完整管线：
//! - 关节层级（森林结构，父节点先于子节点遍历）
//! - 广义坐标 -> 关节本地变换（按骨架配置的组合配方）
//! - 层级传播得到世界变换
//! - 绑定姿态 + 当前姿态 -> 蒙皮矩阵
//! - 顶点 -> 控制关节分类
//! - 渲染层接口与 JNI 接口

pub mod classify;
pub mod config;
pub mod jni_bridge;
pub mod model;
pub mod pose;
pub mod render;
pub mod skeleton;
pub mod skinning;
pub mod variants;

pub use classify::{classify, ClassifierTable, Region, VertexJointAssignment};
pub use model::{load_obj, MeshData, SkinnedModel};
pub use pose::{evaluate, CoordinateKey, Pose, PoseRecipe};
pub use skeleton::{propagate, Hierarchy, JointDef, JointId, Skeleton};
pub use skinning::{build_skinning_matrices, skinning_matrices, SkinningPipeline};
pub use variants::SkeletonVariant;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mesh parse error: {0}")]
    MeshParse(String),

    #[error("joint {joint} references missing parent {parent}")]
    UnknownParent { joint: usize, parent: usize },

    #[error("joint hierarchy contains a cycle through joint {joint}")]
    Cycle { joint: usize },

    #[error("bind pose world transform of joint {joint} is singular")]
    SingularBindPose { joint: usize },

    #[error("expected {expected} joint transforms, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("unknown joint {joint}")]
    UnknownJoint { joint: usize },

    #[error("unknown skeleton variant: {0}")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, SkinError>;
