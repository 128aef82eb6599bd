//! 人体骨架：躯干两节 + 双腿三节 + 双臂两节

use glam::Vec3;

use crate::classify::{ClassifierTable, Comparison, Region};
use crate::pose::{Axis, CoordinateKey, JointRecipe, Pose, PoseRecipe, Step};
use crate::skeleton::{JointDef, JointId};

use super::SkeletonVariant;

pub const NAME: &str = "human";

// ========== 广义坐标 ==========
pub const B0_T_Z: CoordinateKey = CoordinateKey(0);
pub const B0_R_Y: CoordinateKey = CoordinateKey(1);
pub const B1_T_Z: CoordinateKey = CoordinateKey(2);
pub const B1_R_Y: CoordinateKey = CoordinateKey(3);
pub const B1_R_X: CoordinateKey = CoordinateKey(4);
pub const F1R_R_X: CoordinateKey = CoordinateKey(5);
pub const F1L_R_X: CoordinateKey = CoordinateKey(6);
pub const F2R_R_X: CoordinateKey = CoordinateKey(7);
pub const F2L_R_X: CoordinateKey = CoordinateKey(8);
pub const F3R_R_X: CoordinateKey = CoordinateKey(9);
pub const F3L_R_X: CoordinateKey = CoordinateKey(10);
pub const H1R_R_Y: CoordinateKey = CoordinateKey(11);
pub const H1L_R_Y: CoordinateKey = CoordinateKey(12);
pub const H1R_R_Z: CoordinateKey = CoordinateKey(13);
pub const H1L_R_Z: CoordinateKey = CoordinateKey(14);
pub const H2R_R_Y: CoordinateKey = CoordinateKey(15);
pub const H2L_R_Y: CoordinateKey = CoordinateKey(16);

const COORDINATE_NAMES: [&str; 17] = [
    "B0_T_Z", "B0_R_Y", "B1_T_Z", "B1_R_Y", "B1_R_X", "F1R_R_X", "F1L_R_X", "F2R_R_X",
    "F2L_R_X", "F3R_R_X", "F3L_R_X", "H1R_R_Y", "H1L_R_Y", "H1R_R_Z", "H1L_R_Z", "H2R_R_Y",
    "H2L_R_Y",
];

// ========== 关节 ==========
/// 骨盆（根）
pub const B0: JointId = JointId(0);
/// 胸
pub const B1: JointId = JointId(1);
/// 大腿
pub const F1R: JointId = JointId(2);
pub const F1L: JointId = JointId(3);
/// 小腿
pub const F2R: JointId = JointId(4);
pub const F2L: JointId = JointId(5);
/// 脚
pub const F3R: JointId = JointId(6);
pub const F3L: JointId = JointId(7);
/// 上臂
pub const H1R: JointId = JointId(8);
pub const H1L: JointId = JointId(9);
/// 前臂
pub const H2R: JointId = JointId(10);
pub const H2L: JointId = JointId(11);

pub const JOINT_COUNT: usize = 12;

fn joints() -> Vec<JointDef> {
    vec![
        JointDef::root("B0"),
        JointDef::child("B1", B0),
        JointDef::child("F1R", B0),
        JointDef::child("F1L", B0),
        JointDef::child("F2R", F1R),
        JointDef::child("F2L", F1L),
        JointDef::child("F3R", F2R),
        JointDef::child("F3L", F2L),
        JointDef::child("H1R", B1),
        JointDef::child("H1L", B1),
        JointDef::child("H2R", H1R),
        JointDef::child("H2L", H1L),
    ]
}

fn recipe() -> PoseRecipe {
    PoseRecipe::new(
        JOINT_COUNT,
        vec![
            JointRecipe::new(
                B0,
                vec![Step::translate(B0_T_Z, Axis::Z), Step::rotate(B0_R_Y, Axis::Y)],
            ),
            JointRecipe::new(
                B1,
                vec![
                    Step::translate(B1_T_Z, Axis::Z),
                    Step::rotate(B1_R_X, Axis::X),
                    Step::rotate(B1_R_Y, Axis::Y),
                ],
            ),
            JointRecipe::new(F1R, vec![Step::rotate(F1R_R_X, Axis::X)]),
            JointRecipe::new(F1L, vec![Step::rotate(F1L_R_X, Axis::X)]),
            JointRecipe::new(F2R, vec![Step::rotate(F2R_R_X, Axis::X)]),
            JointRecipe::new(F2L, vec![Step::rotate(F2L_R_X, Axis::X)]),
            JointRecipe::new(F3R, vec![Step::rotate(F3R_R_X, Axis::X)]),
            JointRecipe::new(F3L, vec![Step::rotate(F3L_R_X, Axis::X)]),
            // 上臂的 "Y"/"Z" 两个坐标都绕 X 轴旋转，保持已有动画数据的观感
            JointRecipe::new(
                H1R,
                vec![Step::rotate(H1R_R_Y, Axis::X), Step::rotate(H1R_R_Z, Axis::X)],
            ),
            JointRecipe::new(
                H1L,
                vec![Step::rotate(H1L_R_Y, Axis::X), Step::rotate(H1L_R_Z, Axis::X)],
            ),
            JointRecipe::new(H2R, vec![Step::rotate(H2R_R_Y, Axis::Y)]),
            JointRecipe::new(H2L, vec![Step::rotate(H2L_R_Y, Axis::Y)]),
        ],
    )
}

/// 绑定姿态：全零
fn bind_pose() -> Pose {
    Pose::from_pairs((0..COORDINATE_NAMES.len()).map(|i| (CoordinateKey(i), 0.0)))
}

/// human.obj 的顶点分类阈值（单位与模型一致）
fn classifier() -> ClassifierTable {
    use Axis::{X, Y};
    use Comparison::{Ge, Gt, Le, Lt};

    ClassifierTable::new(B0)
        // 脚
        .region(Region::new(F3R).when(Y, Le, 0.27).when(X, Lt, 0.0))
        .region(Region::new(F3L).when(Y, Le, 0.27).when(X, Gt, 0.0))
        // 小腿
        .region(Region::new(F2R).when(Y, Le, 1.8).when(X, Lt, 0.0))
        .region(Region::new(F2L).when(Y, Le, 1.8).when(X, Gt, 0.0))
        // 大腿
        .region(Region::new(F1R).when(Y, Le, 3.1).when(X, Lt, 0.0))
        .region(Region::new(F1L).when(Y, Le, 3.1).when(X, Gt, 0.0))
        // 前臂
        .region(Region::new(H2R).when(X, Le, -1.42))
        .region(Region::new(H2L).when(X, Ge, 1.42))
        // 上臂
        .region(Region::new(H1R).when(X, Le, -0.6))
        .region(Region::new(H1L).when(X, Ge, 0.6))
        // 胸
        .region(Region::new(B1).when(Y, Ge, 3.5))
}

/// 演示姿态：胸部前后平移并左右扭转，四肢固定在 100 度
pub fn demo_pose(time: f32) -> Pose {
    let s = time.sin();
    Pose::zero()
        .with(B0_T_Z, 0.0)
        .with(B0_R_Y, 0.0)
        .with(B1_T_Z, s)
        .with(B1_R_Y, 50.0 * s)
        .with(B1_R_X, 0.0)
        .with(F1R_R_X, 0.0)
        .with(F1L_R_X, 100.0)
        .with(F2R_R_X, 100.0)
        .with(F2L_R_X, 100.0)
        .with(F3R_R_X, 100.0)
        .with(F3L_R_X, 100.0)
        .with(H1R_R_Y, 100.0)
        .with(H1L_R_Y, 100.0)
        .with(H1R_R_Z, 100.0)
        .with(H1L_R_Z, 100.0)
        .with(H2R_R_Y, 100.0)
        .with(H2L_R_Y, 100.0)
}

pub fn variant() -> SkeletonVariant {
    SkeletonVariant {
        name: NAME,
        joints: joints(),
        coordinate_names: COORDINATE_NAMES.to_vec(),
        recipe: recipe(),
        bind_pose: bind_pose(),
        classifier: classifier(),
        camera_position: Vec3::new(0.0, 3.0, 7.0),
        reference_offset: Some(Vec3::new(6.0, 0.0, 0.0)),
        // 关节原点都在躯干附近，线段没有可看的长度
        draw_skeleton: false,
        guide_segment: None,
        mesh_path: "models/human.obj",
        demo_pose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::evaluate;
    use crate::skeleton::propagate;
    use glam::Mat4;

    #[test]
    fn test_zero_pose_identity_locals() {
        let locals = evaluate(&recipe(), &Pose::zero());
        assert_eq!(locals.len(), JOINT_COUNT);
        for local in locals {
            assert!(local.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_classifier_regions() {
        let table = classifier();
        assert_eq!(table.joint_for(Vec3::new(-0.3, 0.1, 0.0)), F3R);
        assert_eq!(table.joint_for(Vec3::new(0.3, 0.1, 0.0)), F3L);
        assert_eq!(table.joint_for(Vec3::new(-0.3, 1.0, 0.0)), F2R);
        assert_eq!(table.joint_for(Vec3::new(0.3, 2.5, 0.0)), F1L);
        assert_eq!(table.joint_for(Vec3::new(-1.6, 4.5, 0.0)), H2R);
        assert_eq!(table.joint_for(Vec3::new(0.8, 4.5, 0.0)), H1L);
        assert_eq!(table.joint_for(Vec3::new(0.0, 4.5, 0.0)), B1);
        assert_eq!(table.joint_for(Vec3::new(0.0, 3.3, 0.0)), B0);
        // x == 0 的低处顶点两侧都不匹配，落到躯干
        assert_eq!(table.joint_for(Vec3::new(0.0, 0.1, 0.0)), B0);
    }

    #[test]
    fn test_torso_twist_leaves_legs_alone() {
        let hierarchy = crate::skeleton::Hierarchy::new(&joints()).unwrap();
        let recipe = recipe();
        let base = propagate(&hierarchy, &evaluate(&recipe, &Pose::zero())).unwrap();
        let twisted = propagate(
            &hierarchy,
            &evaluate(&recipe, &Pose::zero().with(B1_R_Y, 40.0)),
        )
        .unwrap();

        for joint in [B0, F1R, F1L, F2R, F2L, F3R, F3L] {
            assert!(twisted[joint.0].abs_diff_eq(base[joint.0], 1e-6));
        }
        for joint in [B1, H1R, H1L, H2R, H2L] {
            assert!(!twisted[joint.0].abs_diff_eq(base[joint.0], 1e-6));
        }
    }

    #[test]
    fn test_demo_pose_covers_all_coordinates() {
        let pose = demo_pose(0.5);
        assert_eq!(pose.len(), COORDINATE_NAMES.len());
        assert!((pose.get(B1_R_Y) - 50.0 * 0.5f32.sin()).abs() < 1e-6);
    }
}
