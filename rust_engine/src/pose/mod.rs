//! 姿态：广义坐标与坐标 -> 本地变换配方

mod evaluator;
mod recipe;

pub use evaluator::evaluate;
pub use recipe::{Axis, JointRecipe, PoseRecipe, Step, StepKind};

use std::collections::HashMap;

/// 广义坐标键（每种骨架配置固定一组）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateKey(pub usize);

/// 姿态：坐标键 -> 数值
///
/// 缺失的键视为 0（稀疏姿态合法，例如只移动躯干）。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    values: HashMap<CoordinateKey, f32>,
}

impl Pose {
    /// 空姿态（所有坐标为 0）
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CoordinateKey, f32)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// 链式设置
    pub fn with(mut self, key: CoordinateKey, value: f32) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn set(&mut self, key: CoordinateKey, value: f32) {
        self.values.insert(key, value);
    }

    /// 读取坐标值，缺失返回 0
    pub fn get(&self, key: CoordinateKey) -> f32 {
        self.values.get(&key).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: CoordinateKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoordinateKey, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

/// 姿态生成器：每帧由调用方提供（可随时间变化）
pub trait PoseGenerator {
    fn pose_at(&self, time: f32) -> Pose;
}

impl<F> PoseGenerator for F
where
    F: Fn(f32) -> Pose,
{
    fn pose_at(&self, time: f32) -> Pose {
        self(time)
    }
}
