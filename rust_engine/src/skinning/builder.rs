//! 蒙皮矩阵构建：S[j] = C[j] * inverse(B[j])

use glam::Mat4;

use crate::config;
use crate::pose::{evaluate, Pose, PoseRecipe};
use crate::skeleton::{propagate, propagate_unchecked, Hierarchy};
use crate::{Result, SkinError};

use super::SkinnedPose;

/// 逆绑定矩阵缓存
///
/// 绑定姿态在骨架配置生命周期内不变，逆矩阵只需计算一次。
#[derive(Clone, Debug)]
pub struct InverseBindPose {
    inverses: Vec<Mat4>,
}

impl InverseBindPose {
    /// 由绑定姿态世界变换计算逆矩阵；奇异矩阵为配置错误
    pub fn new(bind_world: &[Mat4]) -> Result<Self> {
        let epsilon = config::with_config(|c| c.singular_epsilon);
        let inverses = bind_world
            .iter()
            .enumerate()
            .map(|(joint, m)| {
                let det = m.determinant();
                if !det.is_finite() || det.abs() < epsilon {
                    Err(SkinError::SingularBindPose { joint })
                } else {
                    Ok(m.inverse())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { inverses })
    }

    pub fn len(&self) -> usize {
        self.inverses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverses.is_empty()
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.inverses
    }

    /// 与当前姿态世界变换组合为蒙皮矩阵
    pub fn apply(&self, current_world: &[Mat4]) -> Result<Vec<Mat4>> {
        if current_world.len() != self.inverses.len() {
            return Err(SkinError::JointCountMismatch {
                expected: self.inverses.len(),
                actual: current_world.len(),
            });
        }
        Ok(self.apply_unchecked(current_world))
    }

    fn apply_unchecked(&self, current_world: &[Mat4]) -> Vec<Mat4> {
        current_world
            .iter()
            .zip(&self.inverses)
            .map(|(current, inverse_bind)| *current * *inverse_bind)
            .collect()
    }
}

/// 由绑定姿态和当前姿态的世界变换计算蒙皮矩阵
pub fn build_skinning_matrices(bind_world: &[Mat4], current_world: &[Mat4]) -> Result<Vec<Mat4>> {
    InverseBindPose::new(bind_world)?.apply(current_world)
}

/// 完整管线（纯函数）：(姿态, 绑定姿态, 层级, 配方) -> 蒙皮矩阵
///
/// 与渲染状态无关，每次调用都重新计算绑定姿态。
pub fn skinning_matrices(
    hierarchy: &Hierarchy,
    recipe: &PoseRecipe,
    bind_pose: &Pose,
    pose: &Pose,
) -> Result<Vec<Mat4>> {
    check_recipe(hierarchy, recipe)?;
    let bind_world = propagate(hierarchy, &evaluate(recipe, bind_pose))?;
    let current_world = propagate(hierarchy, &evaluate(recipe, pose))?;
    build_skinning_matrices(&bind_world, &current_world)
}

/// 配方的关节数与层级一致，且只引用存在的关节
fn check_recipe(hierarchy: &Hierarchy, recipe: &PoseRecipe) -> Result<()> {
    if recipe.joint_count != hierarchy.len() {
        return Err(SkinError::JointCountMismatch {
            expected: hierarchy.len(),
            actual: recipe.joint_count,
        });
    }
    recipe.validate()
}

/// 缓存绑定姿态的蒙皮管线
///
/// 构造时完成全部配置检查（关节数、配方关节、绑定姿态可逆），
/// 之后每帧求值不会失败。
#[derive(Clone, Debug)]
pub struct SkinningPipeline {
    hierarchy: Hierarchy,
    recipe: PoseRecipe,
    bind_pose: Pose,
    bind_world: Vec<Mat4>,
    inverse_bind: InverseBindPose,
}

impl SkinningPipeline {
    pub fn new(hierarchy: Hierarchy, recipe: PoseRecipe, bind_pose: Pose) -> Result<Self> {
        check_recipe(&hierarchy, &recipe)?;

        let bind_world = propagate(&hierarchy, &evaluate(&recipe, &bind_pose))?;
        let inverse_bind = InverseBindPose::new(&bind_world)?;

        log::debug!(
            "Skinning pipeline ready: {} joints, {} recipes, bind pose with {} coordinates",
            hierarchy.len(),
            recipe.recipes.len(),
            bind_pose.len()
        );

        Ok(Self {
            hierarchy,
            recipe,
            bind_pose,
            bind_world,
            inverse_bind,
        })
    }

    /// 单帧求值
    pub fn evaluate(&self, pose: &Pose) -> SkinnedPose {
        let locals = evaluate(&self.recipe, pose);
        let world = propagate_unchecked(&self.hierarchy, &locals);
        let skinning = self.inverse_bind.apply_unchecked(&world);
        SkinnedPose {
            locals,
            world,
            skinning,
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn recipe(&self) -> &PoseRecipe {
        &self.recipe
    }

    pub fn bind_pose(&self) -> &Pose {
        &self.bind_pose
    }

    /// 绑定姿态世界变换 B[j]
    pub fn bind_world(&self) -> &[Mat4] {
        &self.bind_world
    }

    pub fn joint_count(&self) -> usize {
        self.hierarchy.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Axis, CoordinateKey, JointRecipe, Step};
    use crate::skeleton::{JointDef, JointId};
    use glam::Vec3;

    const ROOT_RY: CoordinateKey = CoordinateKey(0);
    const CHILD_TZ: CoordinateKey = CoordinateKey(1);
    const CHILD_RX: CoordinateKey = CoordinateKey(2);

    fn two_joint_chain() -> (Hierarchy, PoseRecipe) {
        let hierarchy =
            Hierarchy::new(&[JointDef::root("root"), JointDef::child("child", JointId(0))])
                .unwrap();
        let recipe = PoseRecipe::new(
            2,
            vec![JointRecipe::new(
                JointId(1),
                vec![Step::translate(CHILD_TZ, Axis::Z)],
            )],
        );
        (hierarchy, recipe)
    }

    fn articulated() -> (Hierarchy, PoseRecipe) {
        let hierarchy = Hierarchy::new(&[
            JointDef::root("root"),
            JointDef::child("child", JointId(0)),
            JointDef::root("loose"),
        ])
        .unwrap();
        let recipe = PoseRecipe::new(
            3,
            vec![
                JointRecipe::new(JointId(0), vec![Step::rotate(ROOT_RY, Axis::Y)]),
                JointRecipe::new(
                    JointId(1),
                    vec![
                        Step::translate(CHILD_TZ, Axis::Z),
                        Step::rotate(CHILD_RX, Axis::X),
                    ],
                ),
            ],
        );
        (hierarchy, recipe)
    }

    #[test]
    fn test_child_translation_scenario() {
        let (hierarchy, recipe) = two_joint_chain();
        let pose = Pose::zero().with(CHILD_TZ, 2.0);
        let matrices = skinning_matrices(&hierarchy, &recipe, &Pose::zero(), &pose).unwrap();

        assert_eq!(matrices.len(), 2);
        assert!(matrices[0].abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(matrices[1].abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)), 1e-6));
    }

    #[test]
    fn test_bind_pose_yields_identity() {
        let (hierarchy, recipe) = articulated();
        let bind = Pose::zero()
            .with(ROOT_RY, 35.0)
            .with(CHILD_TZ, -1.25)
            .with(CHILD_RX, 80.0);
        let matrices = skinning_matrices(&hierarchy, &recipe, &bind, &bind).unwrap();
        for m in matrices {
            assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-5));
        }
    }

    #[test]
    fn test_skinning_carries_bind_attached_point() {
        let (hierarchy, recipe) = articulated();
        let bind = Pose::zero().with(CHILD_TZ, 1.0);
        let pose = Pose::zero().with(ROOT_RY, 90.0).with(CHILD_TZ, 1.0);
        let pipeline = SkinningPipeline::new(hierarchy, recipe, bind).unwrap();
        let result = pipeline.evaluate(&pose);

        // 绑定时刚性附着在子关节上的点，应随子关节的当前世界变换移动
        let attached_local = Vec3::new(0.5, 0.0, 0.0);
        let at_bind = pipeline.bind_world()[1].transform_point3(attached_local);
        let posed = result.skinning[1].transform_point3(at_bind);
        let expected = result.world[1].transform_point3(attached_local);
        assert!(posed.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_pipeline_matches_pure_function() {
        let (hierarchy, recipe) = articulated();
        let bind = Pose::zero().with(CHILD_RX, 10.0);
        let pose = Pose::zero().with(ROOT_RY, 20.0).with(CHILD_RX, -45.0);
        let pure = skinning_matrices(&hierarchy, &recipe, &bind, &pose).unwrap();
        let pipeline = SkinningPipeline::new(hierarchy, recipe, bind).unwrap();
        let cached = pipeline.evaluate(&pose).skinning;
        for (a, b) in pure.iter().zip(&cached) {
            assert!(a.abs_diff_eq(*b, 1e-6));
        }
    }

    #[test]
    fn test_singular_bind_pose_rejected() {
        let bind = vec![Mat4::IDENTITY, Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))];
        let result = build_skinning_matrices(&bind, &[Mat4::IDENTITY; 2]);
        assert!(matches!(result, Err(SkinError::SingularBindPose { joint: 1 })));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = build_skinning_matrices(&[Mat4::IDENTITY; 3], &[Mat4::IDENTITY; 2]);
        assert!(matches!(
            result,
            Err(SkinError::JointCountMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_pipeline_rejects_recipe_for_missing_joint() {
        let (hierarchy, _) = two_joint_chain();
        let recipe = PoseRecipe::new(
            2,
            vec![JointRecipe::new(JointId(5), vec![Step::rotate(ROOT_RY, Axis::Y)])],
        );
        let result = SkinningPipeline::new(hierarchy, recipe, Pose::zero());
        assert!(matches!(result, Err(SkinError::UnknownJoint { joint: 5 })));
    }

    #[test]
    fn test_pure_pipeline_rejects_recipe_for_missing_joint() {
        let hierarchy = Hierarchy::new(&[JointDef::root("root")]).unwrap();
        let recipe = PoseRecipe::new(
            1,
            vec![JointRecipe::new(JointId(4), vec![Step::rotate(ROOT_RY, Axis::X)])],
        );
        let result = skinning_matrices(&hierarchy, &recipe, &Pose::zero(), &Pose::zero());
        assert!(matches!(result, Err(SkinError::UnknownJoint { joint: 4 })));

        // 关节数与层级不一致
        let (hierarchy, _) = two_joint_chain();
        let recipe = PoseRecipe::new(3, Vec::new());
        let result = skinning_matrices(&hierarchy, &recipe, &Pose::zero(), &Pose::zero());
        assert!(matches!(
            result,
            Err(SkinError::JointCountMismatch { expected: 2, actual: 3 })
        ));
    }
}
