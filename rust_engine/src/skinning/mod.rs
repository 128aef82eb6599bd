//! 蒙皮矩阵计算与顶点蒙皮

mod builder;
mod skinning;

pub use builder::{build_skinning_matrices, skinning_matrices, InverseBindPose, SkinningPipeline};
pub use skinning::{compute_skinning, skin_vertices};

use glam::{Mat4, Vec3};

use crate::classify::VertexJointAssignment;

/// 单帧管线结果
#[derive(Clone, Debug)]
pub struct SkinnedPose {
    /// 每个关节的本地变换
    pub locals: Vec<Mat4>,
    /// 每个关节的世界变换
    pub world: Vec<Mat4>,
    /// 蒙皮矩阵 S[j] = C[j] * inverse(B[j])
    pub skinning: Vec<Mat4>,
}

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 静止姿态顶点位置
    pub positions: &'a [Vec3],
    /// 静止姿态顶点法线（可为空）
    pub normals: &'a [Vec3],
    /// 每个顶点的控制关节
    pub assignment: &'a VertexJointAssignment,
    /// 蒙皮矩阵
    pub joint_matrices: &'a [Mat4],
}

/// 蒙皮输出数据
pub struct SkinningOutput {
    /// 变换后的顶点位置
    pub positions: Vec<Vec3>,
    /// 变换后的顶点法线
    pub normals: Vec<Vec3>,
}
