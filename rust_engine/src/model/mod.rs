//! 蒙皮模型：网格 + 骨架 + 管线

mod loader;
mod runtime;

pub use loader::{load_obj, parse_obj};
pub use runtime::SkinnedModel;

use glam::{Vec2, Vec3};

/// 静止姿态的索引网格
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 获取三角形数量
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 轴对齐包围盒 (min, max)，空网格返回 None
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}
