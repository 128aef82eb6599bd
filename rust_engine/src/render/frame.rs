//! 单帧渲染流程与主循环

use glam::Mat4;

use crate::config;
use crate::model::SkinnedModel;
use crate::pose::{Pose, PoseGenerator};
use crate::skeleton::MatrixTargets;

use super::{
    CameraController, LightLocations, MaterialLocations, MeshDrawer, SegmentDrawer, Topology,
    UniformLocation, UniformUploader, WindowHost, BONE_MATERIAL, DEFAULT_LIGHT,
};

/// 着色器中用到的全部 uniform 位置（加载时解析一次）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderUniforms {
    pub matrices: MatrixTargets,
    pub light: LightLocations,
    pub material: MaterialLocations,
    pub use_skinning: UniformLocation,
    pub bone_transformations: UniformLocation,
}

impl ShaderUniforms {
    pub fn locate(uploader: &dyn UniformUploader) -> Self {
        let uniforms = Self {
            matrices: MatrixTargets {
                model: uploader.location("M"),
                view: uploader.location("V"),
                projection: uploader.location("P"),
            },
            light: LightLocations::locate(uploader),
            material: MaterialLocations::locate(uploader),
            use_skinning: uploader.location("useSkinning"),
            bone_transformations: uploader.location("boneTransformations"),
        };
        if !uniforms.bone_transformations.is_valid() {
            log::warn!("着色器缺少 boneTransformations，蒙皮将不会生效");
        }
        uniforms
    }
}

/// 渲染上下文：替代全局的着色器/相机/网格句柄
pub struct FrameContext {
    pub uploader: Box<dyn UniformUploader>,
    pub camera: Box<dyn CameraController>,
    /// 蒙皮网格
    pub skin: Box<dyn MeshDrawer>,
    /// 静止姿态参照网格
    pub reference: Option<Box<dyn MeshDrawer>>,
    pub segments: Box<dyn SegmentDrawer>,
    pub uniforms: ShaderUniforms,
}

impl FrameContext {
    pub fn new(
        uploader: Box<dyn UniformUploader>,
        camera: Box<dyn CameraController>,
        skin: Box<dyn MeshDrawer>,
        reference: Option<Box<dyn MeshDrawer>>,
        segments: Box<dyn SegmentDrawer>,
    ) -> Self {
        let uniforms = ShaderUniforms::locate(uploader.as_ref());
        Self {
            uploader,
            camera,
            skin,
            reference,
            segments,
            uniforms,
        }
    }

    /// 模型首次进入上下文时调用：相机位置、关节属性、骨架矩阵目标
    pub fn attach(&mut self, model: &mut SkinnedModel) {
        self.camera.set_position(model.camera_position());
        self.skin.bind();
        self.skin.upload_joint_attribute(model.joint_attribute());
        model.set_matrix_targets(self.uniforms.matrices);
    }
}

fn upload_matrices(
    uploader: &mut dyn UniformUploader,
    targets: MatrixTargets,
    model: &Mat4,
    view: &Mat4,
    projection: &Mat4,
) {
    uploader.set_mat4(targets.model, model);
    uploader.set_mat4(targets.view, view);
    uploader.set_mat4(targets.projection, projection);
}

/// 渲染一帧
pub fn render_frame(ctx: &mut FrameContext, model: &mut SkinnedModel, pose: &Pose) {
    let (skin_wireframe, draw_skeleton) =
        config::with_config(|c| (c.skin_wireframe, c.draw_skeleton));
    let uniforms = ctx.uniforms;

    ctx.uploader.use_program();

    // 相机
    ctx.camera.update();
    let view = ctx.camera.view_matrix();
    let projection = ctx.camera.projection_matrix();

    // 光照
    DEFAULT_LIGHT.upload(ctx.uploader.as_mut(), &uniforms.light);
    BONE_MATERIAL.upload(ctx.uploader.as_mut(), &uniforms.material);

    // 姿态 -> 蒙皮矩阵
    model.update(pose);

    // 蒙皮网格
    ctx.skin.bind();
    upload_matrices(
        ctx.uploader.as_mut(),
        uniforms.matrices,
        &Mat4::IDENTITY,
        &view,
        &projection,
    );
    ctx.uploader
        .set_mat4_array(uniforms.bone_transformations, model.skinning_matrices());
    ctx.uploader.set_int(uniforms.use_skinning, 1);
    let skin_topology = if skin_wireframe {
        Topology::Wireframe
    } else {
        Topology::Triangles
    };
    ctx.skin.draw(skin_topology);

    // 静止姿态参照
    if let (Some(offset), Some(reference)) = (model.reference_offset(), ctx.reference.as_mut()) {
        let placement = Mat4::from_translation(offset);
        upload_matrices(
            ctx.uploader.as_mut(),
            uniforms.matrices,
            &placement,
            &view,
            &projection,
        );
        ctx.uploader.set_int(uniforms.use_skinning, 0);
        reference.bind();
        reference.draw(skin_topology);
    }

    // 骨架
    if draw_skeleton && model.draws_skeleton() {
        let targets = model.skeleton().targets().unwrap_or(uniforms.matrices);
        upload_matrices(
            ctx.uploader.as_mut(),
            targets,
            &Mat4::IDENTITY,
            &view,
            &projection,
        );
        ctx.uploader.set_int(uniforms.use_skinning, 0);
        let segments = model.skeleton().bone_segments();
        ctx.segments.draw_segments(&segments, Topology::Lines);
        ctx.segments.draw_segments(&segments, Topology::Points);
    }

    // 参考线段
    if let Some(guide) = model.guide_segment() {
        upload_matrices(
            ctx.uploader.as_mut(),
            uniforms.matrices,
            &Mat4::IDENTITY,
            &view,
            &projection,
        );
        ctx.uploader.set_int(uniforms.use_skinning, 0);
        ctx.segments.draw_segments(&[guide], Topology::Lines);
        ctx.segments.draw_segments(&[guide], Topology::Points);
    }
}

/// 主循环：窗口关闭或按下 Esc 时退出，返回渲染的帧数
pub fn run(
    host: &mut dyn WindowHost,
    ctx: &mut FrameContext,
    model: &mut SkinnedModel,
    generator: &dyn PoseGenerator,
) -> u64 {
    let clear_color = config::with_config(|c| c.clear_color);
    ctx.attach(model);
    log::info!("进入主循环: 模型 {}", model.name);

    let mut frames = 0u64;
    while !host.should_close() {
        host.clear(clear_color);
        let pose = generator.pose_at(host.time());
        render_frame(ctx, model, &pose);
        host.swap_and_poll();
        frames += 1;
    }

    log::info!("主循环结束: 共 {} 帧", frames);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_obj;
    use crate::render::Light;
    use crate::variants::{hand, human};
    use glam::{Vec3, Vec4};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        UseProgram,
        Int(i32, i32),
        Float(i32, f32),
        Vec3(i32, Vec3),
        Vec4(i32, Vec4),
        Mat4(i32, Mat4),
        Mat4Array(i32, usize),
        CameraUpdate,
        CameraPosition(Vec3),
        Bind(&'static str),
        Draw(&'static str, Topology),
        JointAttribute(usize),
        Segments(usize, Topology),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    const NAMES: [&str; 14] = [
        "M",
        "V",
        "P",
        "mtl.Ka",
        "mtl.Kd",
        "mtl.Ks",
        "mtl.Ns",
        "light.La",
        "light.Ld",
        "light.Ls",
        "light.lightPosition_worldspace",
        "light.power",
        "useSkinning",
        "boneTransformations",
    ];

    struct FakeUploader(Log);

    impl UniformUploader for FakeUploader {
        fn use_program(&mut self) {
            self.0.borrow_mut().push(Call::UseProgram);
        }
        fn location(&self, name: &str) -> UniformLocation {
            NAMES
                .iter()
                .position(|n| *n == name)
                .map(|i| UniformLocation(i as i32))
                .unwrap_or(UniformLocation::NONE)
        }
        fn set_int(&mut self, location: UniformLocation, value: i32) {
            self.0.borrow_mut().push(Call::Int(location.0, value));
        }
        fn set_float(&mut self, location: UniformLocation, value: f32) {
            self.0.borrow_mut().push(Call::Float(location.0, value));
        }
        fn set_vec3(&mut self, location: UniformLocation, value: Vec3) {
            self.0.borrow_mut().push(Call::Vec3(location.0, value));
        }
        fn set_vec4(&mut self, location: UniformLocation, value: Vec4) {
            self.0.borrow_mut().push(Call::Vec4(location.0, value));
        }
        fn set_mat4(&mut self, location: UniformLocation, value: &Mat4) {
            self.0.borrow_mut().push(Call::Mat4(location.0, *value));
        }
        fn set_mat4_array(&mut self, location: UniformLocation, values: &[Mat4]) {
            self.0.borrow_mut().push(Call::Mat4Array(location.0, values.len()));
        }
    }

    struct FakeCamera(Log);

    impl CameraController for FakeCamera {
        fn update(&mut self) {
            self.0.borrow_mut().push(Call::CameraUpdate);
        }
        fn view_matrix(&self) -> Mat4 {
            Mat4::IDENTITY
        }
        fn projection_matrix(&self) -> Mat4 {
            Mat4::IDENTITY
        }
        fn set_position(&mut self, position: Vec3) {
            self.0.borrow_mut().push(Call::CameraPosition(position));
        }
    }

    struct FakeMesh(&'static str, Log);

    impl MeshDrawer for FakeMesh {
        fn bind(&mut self) {
            self.1.borrow_mut().push(Call::Bind(self.0));
        }
        fn draw(&mut self, topology: Topology) {
            self.1.borrow_mut().push(Call::Draw(self.0, topology));
        }
        fn upload_joint_attribute(&mut self, data: &[f32]) {
            self.1.borrow_mut().push(Call::JointAttribute(data.len()));
        }
    }

    struct FakeSegments(Log);

    impl SegmentDrawer for FakeSegments {
        fn draw_segments(&mut self, segments: &[(Vec3, Vec3)], topology: Topology) {
            self.0
                .borrow_mut()
                .push(Call::Segments(segments.len(), topology));
        }
    }

    struct FakeHost {
        frames_left: Cell<u32>,
    }

    impl WindowHost for FakeHost {
        fn should_close(&self) -> bool {
            self.frames_left.get() == 0
        }
        fn time(&self) -> f32 {
            0.25
        }
        fn clear(&mut self, _color: [f32; 4]) {}
        fn swap_and_poll(&mut self) {
            self.frames_left.set(self.frames_left.get() - 1);
        }
    }

    fn context(log: &Log, with_reference: bool) -> FrameContext {
        let reference: Option<Box<dyn MeshDrawer>> = if with_reference {
            Some(Box::new(FakeMesh("reference", log.clone())))
        } else {
            None
        };
        FrameContext::new(
            Box::new(FakeUploader(log.clone())),
            Box::new(FakeCamera(log.clone())),
            Box::new(FakeMesh("skin", log.clone())),
            reference,
            Box::new(FakeSegments(log.clone())),
        )
    }

    fn human_model() -> SkinnedModel {
        let mesh = parse_obj("v 0 4.5 0\nv 0.1 4.5 0\nv 0 4.6 0\nf 1 2 3\n".as_bytes()).unwrap();
        SkinnedModel::new(&human::variant(), mesh).unwrap()
    }

    fn position(log: &[Call], call: &Call) -> usize {
        log.iter()
            .position(|c| c == call)
            .unwrap_or_else(|| panic!("missing call {:?}", call))
    }

    #[test]
    fn test_locate_resolves_every_name() {
        let log = Log::default();
        let uniforms = ShaderUniforms::locate(&FakeUploader(log));
        assert_eq!(uniforms.matrices.model, UniformLocation(0));
        assert_eq!(uniforms.material.ns, UniformLocation(6));
        assert_eq!(uniforms.light.power, UniformLocation(11));
        assert_eq!(uniforms.use_skinning, UniformLocation(12));
        assert_eq!(uniforms.bone_transformations, UniformLocation(13));
    }

    #[test]
    fn test_light_upload_values() {
        let log = Log::default();
        let mut uploader = FakeUploader(log.clone());
        let at = LightLocations::locate(&uploader);
        let light: Light = DEFAULT_LIGHT;
        light.upload(&mut uploader, &at);

        let calls = log.borrow();
        assert!(calls.contains(&Call::Vec3(10, Vec3::new(0.0, 4.0, 4.0))));
        assert!(calls.contains(&Call::Float(11, 20.0)));
    }

    #[test]
    fn test_frame_order() {
        let log = Log::default();
        let mut ctx = context(&log, true);
        let mut model = human_model();
        ctx.attach(&mut model);
        log.borrow_mut().clear();

        render_frame(&mut ctx, &mut model, &human::demo_pose(0.0));

        let calls = log.borrow();
        assert_eq!(calls[0], Call::UseProgram);
        assert_eq!(calls[1], Call::CameraUpdate);

        let light = position(&calls, &Call::Float(11, 20.0));
        let bones = position(&calls, &Call::Mat4Array(13, human::JOINT_COUNT));
        let skinning_on = position(&calls, &Call::Int(12, 1));
        let skin_draw = position(&calls, &Call::Draw("skin", Topology::Wireframe));
        let reference_draw = position(&calls, &Call::Draw("reference", Topology::Wireframe));

        assert!(light < bones);
        assert!(bones < skinning_on);
        assert!(skinning_on < skin_draw);
        assert!(skin_draw < reference_draw);
        // 人体不画骨架，也没有参考线段
        assert!(!calls.iter().any(|c| matches!(c, Call::Segments(..))));

        // 参照网格平移到 (6, 0, 0) 且关闭蒙皮
        let placed = position(
            &calls,
            &Call::Mat4(0, Mat4::from_translation(Vec3::new(6.0, 0.0, 0.0))),
        );
        assert!(skin_draw < placed && placed < reference_draw);
        assert!(calls[placed..reference_draw].contains(&Call::Int(12, 0)));
    }

    #[test]
    fn test_hand_has_no_reference_copy() {
        let log = Log::default();
        let mut ctx = context(&log, true);
        let mesh = parse_obj("v -0.2 -0.3 0\nv -0.2 -0.31 0\nv -0.21 -0.3 0\nf 1 2 3\n".as_bytes())
            .unwrap();
        let mut model = SkinnedModel::new(&hand::variant(), mesh).unwrap();

        render_frame(&mut ctx, &mut model, &hand::demo_pose(0.0));

        let calls = log.borrow();
        assert!(!calls.iter().any(|c| matches!(c, Call::Draw("reference", _))));
        // 五根手指，每根链上 (关节数 - 1) 条线段
        assert!(calls.contains(&Call::Segments(9, Topology::Lines)));
    }

    #[test]
    fn test_hand_draws_skeleton_then_guide_segment() {
        let log = Log::default();
        let mut ctx = context(&log, false);
        let mesh = parse_obj("v -0.2 -0.3 0\nv -0.2 -0.31 0\nv -0.21 -0.3 0\nf 1 2 3\n".as_bytes())
            .unwrap();
        let mut model = SkinnedModel::new(&hand::variant(), mesh).unwrap();
        ctx.attach(&mut model);
        log.borrow_mut().clear();

        render_frame(&mut ctx, &mut model, &hand::demo_pose(0.0));

        let calls = log.borrow();
        let skin_draw = position(&calls, &Call::Draw("skin", Topology::Wireframe));
        let skeleton_lines = position(&calls, &Call::Segments(9, Topology::Lines));
        let skeleton_points = position(&calls, &Call::Segments(9, Topology::Points));
        let guide_lines = position(&calls, &Call::Segments(1, Topology::Lines));
        let guide_points = position(&calls, &Call::Segments(1, Topology::Points));

        assert!(skin_draw < skeleton_lines);
        assert!(skeleton_lines < skeleton_points);
        assert!(skeleton_points < guide_lines);
        assert!(guide_lines < guide_points);

        // 参考线段在世界坐标中绘制，关闭蒙皮
        let between = &calls[skeleton_points..guide_lines];
        assert!(between.contains(&Call::Mat4(0, Mat4::IDENTITY)));
        assert!(between.contains(&Call::Int(12, 0)));
    }

    #[test]
    fn test_run_until_close() {
        let log = Log::default();
        let mut ctx = context(&log, false);
        let mut model = human_model();
        let variant = human::variant();
        let mut host = FakeHost {
            frames_left: Cell::new(3),
        };

        let frames = run(&mut host, &mut ctx, &mut model, &variant);
        assert_eq!(frames, 3);

        let calls = log.borrow();
        assert_eq!(calls[0], Call::CameraPosition(Vec3::new(0.0, 3.0, 7.0)));
        assert!(calls.contains(&Call::JointAttribute(3)));
        let skin_draws = calls
            .iter()
            .filter(|c| matches!(c, Call::Draw("skin", _)))
            .count();
        assert_eq!(skin_draws, 3);
        assert_eq!(model.skeleton().targets(), Some(ctx.uniforms.matrices));
    }
}
