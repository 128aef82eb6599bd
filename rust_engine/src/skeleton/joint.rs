//! 关节节点

use std::fmt;

use glam::{Mat4, Vec3};

/// 关节索引（在骨架内稳定）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 关节的静态定义：名称 + 父关节（None 表示根）
#[derive(Clone, Debug)]
pub struct JointDef {
    pub name: String,
    pub parent: Option<JointId>,
}

impl JointDef {
    pub fn root(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
        }
    }

    pub fn child(name: &str, parent: JointId) -> Self {
        Self {
            name: name.to_string(),
            parent: Some(parent),
        }
    }
}

/// 关节运行时状态
///
/// 父关节只以索引引用，不持有所有权；所有关节由 `Skeleton` 统一持有。
#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    pub parent: Option<JointId>,

    // 变换结果（每帧完全覆盖）
    pub local_transform: Mat4,
    pub global_transform: Mat4,
}

impl Joint {
    pub fn new(def: &JointDef) -> Self {
        Self {
            name: def.name.clone(),
            parent: def.parent,
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 关节原点的世界坐标
    pub fn world_position(&self) -> Vec3 {
        self.global_transform.w_axis.truncate()
    }
}
