//! 蒙皮运行时模型

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use crate::classify::{classify, VertexJointAssignment};
use crate::config;
use crate::pose::Pose;
use crate::skeleton::{MatrixTargets, Skeleton};
use crate::skinning::{compute_skinning, SkinningInput, SkinningPipeline};
use crate::variants::SkeletonVariant;
use crate::Result;

use super::{load_obj, MeshData};

/// 蒙皮运行时模型
///
/// 顶点分类在构造时完成一次，之后每帧只重新计算蒙皮矩阵。
pub struct SkinnedModel {
    // 静态数据
    pub name: String,
    pub mesh: MeshData,
    assignment: VertexJointAssignment,
    /// 每个顶点的关节下标（着色器顶点属性）
    joint_attribute: Vec<f32>,
    reference_offset: Option<Vec3>,
    camera_position: Vec3,
    draw_skeleton: bool,
    guide_segment: Option<(Vec3, Vec3)>,

    // 子系统
    skeleton: Skeleton,
    pipeline: SkinningPipeline,

    // 运行时数据
    skinning_matrices: Vec<Mat4>,
    pub update_positions: Vec<Vec3>,
    pub update_normals: Vec<Vec3>,
    /// JNI 用平铺缓冲区
    pub update_positions_raw: Vec<f32>,

    debug_logged: bool,
}

impl SkinnedModel {
    /// 绑定网格与骨架配置
    pub fn new(variant: &SkeletonVariant, mesh: MeshData) -> Result<Self> {
        variant.validate()?;
        let skeleton = Skeleton::new(&variant.joints)?;
        let pipeline = SkinningPipeline::new(
            variant.hierarchy()?,
            variant.recipe.clone(),
            variant.bind_pose.clone(),
        )?;

        let assignment = classify(&variant.classifier, &mesh.positions);
        let joint_attribute = assignment.to_attribute();

        log::info!(
            "模型 {} 就绪: {} 个顶点, {} 个关节, 顶点分布 {:?}",
            variant.name,
            mesh.vertex_count(),
            skeleton.joint_count(),
            assignment.histogram(skeleton.joint_count())
        );

        let joint_count = skeleton.joint_count();
        let mut model = Self {
            name: variant.name.to_string(),
            update_positions: mesh.positions.clone(),
            update_normals: mesh.normals.clone(),
            update_positions_raw: mesh.positions.iter().flat_map(|p| p.to_array()).collect(),
            mesh,
            assignment,
            joint_attribute,
            reference_offset: variant.reference_offset,
            camera_position: variant.camera_position,
            draw_skeleton: variant.draw_skeleton,
            guide_segment: variant.guide_segment,
            skeleton,
            pipeline,
            skinning_matrices: vec![Mat4::IDENTITY; joint_count],
            debug_logged: false,
        };
        model.update(&variant.bind_pose);
        Ok(model)
    }

    /// 从配置中的网格路径加载
    pub fn load(variant: &SkeletonVariant) -> Result<Self> {
        let mesh = load_obj(variant.mesh_path)?;
        Self::new(variant, mesh)
    }

    /// 单帧更新：姿态 -> 关节世界变换 + 蒙皮矩阵
    pub fn update(&mut self, pose: &Pose) {
        let result = self.pipeline.evaluate(pose);
        self.skeleton.store_pose(&result.locals, &result.world);
        self.skinning_matrices = result.skinning;

        if config::with_config(|c| c.debug_log) {
            log::debug!(
                "模型 {} 更新: {} 个坐标, 根关节位置 {:?}",
                self.name,
                pose.len(),
                self.skeleton.joint_positions().first()
            );
        }
    }

    /// CPU 蒙皮，结果写入 update_positions / update_normals
    pub fn update_cpu_skinning(&mut self) {
        let input = SkinningInput {
            positions: &self.mesh.positions,
            normals: &self.mesh.normals,
            assignment: &self.assignment,
            joint_matrices: &self.skinning_matrices,
        };
        let output = compute_skinning(&input);
        self.update_positions = output.positions;
        self.update_normals = output.normals;

        let raw_len = self.update_positions.len() * 3;
        if self.update_positions_raw.len() != raw_len {
            self.update_positions_raw.resize(raw_len, 0.0);
        }
        self.update_positions_raw
            .par_chunks_mut(3)
            .zip(self.update_positions.par_iter())
            .for_each(|(chunk, p)| {
                chunk[0] = p.x;
                chunk[1] = p.y;
                chunk[2] = p.z;
            });

        // 调试日志（只在首次执行）
        if !self.debug_logged {
            self.debug_logged = true;
            log::info!(
                "CPU 蒙皮: vertex_count={}, pos_raw_len={}",
                self.update_positions.len(),
                self.update_positions_raw.len()
            );
        }
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// 获取关节数量
    pub fn joint_count(&self) -> usize {
        self.skeleton.joint_count()
    }

    /// 骨架绘制时使用的矩阵上传目标
    pub fn set_matrix_targets(&mut self, targets: MatrixTargets) {
        self.skeleton.set_targets(targets);
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn pipeline(&self) -> &SkinningPipeline {
        &self.pipeline
    }

    pub fn assignment(&self) -> &VertexJointAssignment {
        &self.assignment
    }

    pub fn joint_attribute(&self) -> &[f32] {
        &self.joint_attribute
    }

    /// 最近一次更新的蒙皮矩阵
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    pub fn reference_offset(&self) -> Option<Vec3> {
        self.reference_offset
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// 该骨架配置是否绘制骨架
    pub fn draws_skeleton(&self) -> bool {
        self.draw_skeleton
    }

    pub fn guide_segment(&self) -> Option<(Vec3, Vec3)> {
        self.guide_segment
    }
}
