//! 渲染层接口
//!
//! 窗口、着色器、相机由宿主实现，这里只定义调用顺序和数据。

mod frame;
mod material;

pub use frame::{render_frame, run, FrameContext, ShaderUniforms};
pub use material::{
    Light, LightLocations, Material, MaterialLocations, BONE_MATERIAL, DEFAULT_LIGHT,
};

use glam::{Mat4, Vec3, Vec4};

/// 着色器 uniform 位置（-1 表示着色器中不存在）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    pub const NONE: Self = Self(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

/// 图元类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Lines,
    Points,
    Triangles,
    /// 三角形以线框模式绘制
    Wireframe,
}

/// uniform 上传
pub trait UniformUploader {
    fn use_program(&mut self);
    fn location(&self, name: &str) -> UniformLocation;
    fn set_int(&mut self, location: UniformLocation, value: i32);
    fn set_float(&mut self, location: UniformLocation, value: f32);
    fn set_vec3(&mut self, location: UniformLocation, value: Vec3);
    fn set_vec4(&mut self, location: UniformLocation, value: Vec4);
    fn set_mat4(&mut self, location: UniformLocation, value: &Mat4);
    fn set_mat4_array(&mut self, location: UniformLocation, values: &[Mat4]);
}

/// 网格绘制（顶点缓冲由宿主持有）
pub trait MeshDrawer {
    fn bind(&mut self);
    fn draw(&mut self, topology: Topology);
    /// 上传每顶点关节下标属性
    fn upload_joint_attribute(&mut self, data: &[f32]);
}

/// 线段/点绘制
pub trait SegmentDrawer {
    /// Lines 绘制线段，Points 绘制线段端点
    fn draw_segments(&mut self, segments: &[(Vec3, Vec3)], topology: Topology);
}

/// 相机控制器
pub trait CameraController {
    /// 处理输入并刷新矩阵
    fn update(&mut self);
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    fn set_position(&mut self, position: Vec3);
}

/// 窗口宿主
pub trait WindowHost {
    /// 窗口关闭或按下 Esc
    fn should_close(&self) -> bool;
    /// 启动以来的秒数
    fn time(&self) -> f32;
    fn clear(&mut self, color: [f32; 4]);
    fn swap_and_poll(&mut self);
}
