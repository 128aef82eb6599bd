//! 顶点蒙皮计算（CPU 路径）
//!
//! 每个顶点只受一个关节控制，等价于着色器中的刚性蒙皮。

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use crate::classify::VertexJointAssignment;
use crate::skeleton::JointId;

use super::{SkinningInput, SkinningOutput};

/// 计算蒙皮（位置 + 法线）
pub fn compute_skinning(input: &SkinningInput) -> SkinningOutput {
    let joints = input.assignment.as_slice();

    let positions = input
        .positions
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let m = get_matrix(input.joint_matrices, joints.get(i).copied());
            m.transform_point3(*p)
        })
        .collect();

    let normals = input
        .normals
        .par_iter()
        .enumerate()
        .map(|(i, n)| {
            let m = get_matrix(input.joint_matrices, joints.get(i).copied());
            m.transform_vector3(*n).normalize_or_zero()
        })
        .collect();

    SkinningOutput { positions, normals }
}

/// 只变换顶点位置
pub fn skin_vertices(
    positions: &[Vec3],
    assignment: &VertexJointAssignment,
    matrices: &[Mat4],
) -> Vec<Vec3> {
    let input = SkinningInput {
        positions,
        normals: &[],
        assignment,
        joint_matrices: matrices,
    };
    compute_skinning(&input).positions
}

/// 越界或缺失的关节按单位矩阵处理
fn get_matrix(matrices: &[Mat4], joint: Option<JointId>) -> Mat4 {
    joint
        .and_then(|j| matrices.get(j.0))
        .copied()
        .unwrap_or(Mat4::IDENTITY)
}
