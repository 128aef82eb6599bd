//! 关节层级（森林）与世界变换传播

use std::collections::HashMap;

use glam::Mat4;

use crate::{Result, SkinError};

use super::{JointDef, JointId};

/// 已验证的关节层级
///
/// 构造时保证：父索引有效、无环。`order()` 中父关节总在子关节之前。
#[derive(Clone, Debug)]
pub struct Hierarchy {
    names: Vec<String>,
    parents: Vec<Option<JointId>>,
    children: Vec<Vec<JointId>>,
    depths: Vec<usize>,
    sorted_indices: Vec<JointId>,
    name_to_index: HashMap<String, JointId>,
}

impl Hierarchy {
    /// 从关节定义构建层级
    pub fn new(defs: &[JointDef]) -> Result<Self> {
        let count = defs.len();
        let parents: Vec<Option<JointId>> = defs.iter().map(|d| d.parent).collect();

        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                if p.0 >= count {
                    return Err(SkinError::UnknownParent { joint: i, parent: p.0 });
                }
            }
        }

        // 沿父链向上计数得到深度；超过关节总数说明存在环
        let mut depths = vec![0usize; count];
        for (i, depth) in depths.iter_mut().enumerate() {
            let mut steps = 0;
            let mut current = parents[i];
            while let Some(p) = current {
                steps += 1;
                if steps > count {
                    return Err(SkinError::Cycle { joint: i });
                }
                current = parents[p.0];
            }
            *depth = steps;
        }

        let mut children = vec![Vec::new(); count];
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                children[p.0].push(JointId(i));
            }
        }

        // 按深度排序（稳定排序，同深度保持索引顺序）
        let mut sorted_indices: Vec<JointId> = (0..count).map(JointId).collect();
        sorted_indices.sort_by_key(|j| depths[j.0]);

        let names: Vec<String> = defs.iter().map(|d| d.name.clone()).collect();
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), JointId(i)))
            .collect();

        Ok(Self {
            names,
            parents,
            children,
            depths,
            sorted_indices,
            name_to_index,
        })
    }

    /// 关节数量
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, joint: JointId) -> Option<JointId> {
        self.parents.get(joint.0).copied().flatten()
    }

    pub fn children(&self, joint: JointId) -> &[JointId] {
        self.children.get(joint.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn depth(&self, joint: JointId) -> usize {
        self.depths.get(joint.0).copied().unwrap_or(0)
    }

    pub fn roots(&self) -> impl Iterator<Item = JointId> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| JointId(i))
    }

    /// 父先子后的遍历顺序
    pub fn order(&self) -> &[JointId] {
        &self.sorted_indices
    }

    pub fn name(&self, joint: JointId) -> Option<&str> {
        self.names.get(joint.0).map(String::as_str)
    }

    /// 通过名称查找关节
    pub fn find(&self, name: &str) -> Option<JointId> {
        self.name_to_index.get(name).copied()
    }

    /// `ancestor` 是否为 `joint` 的祖先（不含自身）
    pub fn is_ancestor(&self, ancestor: JointId, joint: JointId) -> bool {
        let mut current = self.parent(joint);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }
}

/// 由本地变换计算世界变换
///
/// world(j) = world(parent) * local(j)，根关节 world = local。
pub fn propagate(hierarchy: &Hierarchy, locals: &[Mat4]) -> Result<Vec<Mat4>> {
    if locals.len() != hierarchy.len() {
        return Err(SkinError::JointCountMismatch {
            expected: hierarchy.len(),
            actual: locals.len(),
        });
    }

    Ok(propagate_unchecked(hierarchy, locals))
}

/// 长度已由调用方保证时使用；缺失的本地变换按单位矩阵处理
pub(crate) fn propagate_unchecked(hierarchy: &Hierarchy, locals: &[Mat4]) -> Vec<Mat4> {
    let mut world = vec![Mat4::IDENTITY; hierarchy.len()];
    for &joint in hierarchy.order() {
        let local = locals.get(joint.0).copied().unwrap_or(Mat4::IDENTITY);
        world[joint.0] = match hierarchy.parent(joint) {
            Some(parent) => world[parent.0] * local,
            None => local,
        };
    }
    world
}
