//! 姿态求值：广义坐标 -> 每个关节的本地变换

use glam::Mat4;

use super::{Pose, PoseRecipe};

/// 按配方计算每个关节的本地变换（按关节索引稠密排列）
///
/// 没有配方的关节为单位矩阵；缺失的坐标按 0 处理，对应项为单位变换。
pub fn evaluate(recipe: &PoseRecipe, pose: &Pose) -> Vec<Mat4> {
    let mut locals = vec![Mat4::IDENTITY; recipe.joint_count];

    for joint_recipe in &recipe.recipes {
        let Some(local) = locals.get_mut(joint_recipe.joint.0) else {
            continue;
        };
        for step in &joint_recipe.steps {
            *local *= step.matrix(pose.get(step.key));
        }
    }

    locals
}
