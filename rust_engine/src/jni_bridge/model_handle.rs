//! 模型句柄

use crate::model::SkinnedModel;
use crate::pose::PoseGenerator;
use crate::variants::SkeletonVariant;

/// 注册表中的一个模型：运行时模型 + 生成演示姿态的骨架配置
pub struct ModelSlot {
    pub variant: SkeletonVariant,
    pub model: SkinnedModel,
}

impl ModelSlot {
    pub fn new(variant: SkeletonVariant, model: SkinnedModel) -> Self {
        Self { variant, model }
    }

    /// 以 time 时刻的演示姿态更新矩阵与 CPU 蒙皮结果
    pub fn update(&mut self, time: f32) {
        let pose = self.variant.pose_at(time);
        self.model.update(&pose);
        self.model.update_cpu_skinning();
    }
}
