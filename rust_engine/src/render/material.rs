//! 光照与材质常量

use glam::{Vec3, Vec4};

use super::{UniformLocation, UniformUploader};

/// 点光源
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub la: Vec4,
    pub ld: Vec4,
    pub ls: Vec4,
    pub position: Vec3,
    pub power: f32,
}

/// 材质（Phong）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ka: Vec4,
    pub kd: Vec4,
    pub ks: Vec4,
    pub ns: f32,
}

pub const DEFAULT_LIGHT: Light = Light {
    la: Vec4::ONE,
    ld: Vec4::ONE,
    ls: Vec4::ONE,
    position: Vec3::new(0.0, 4.0, 4.0),
    power: 20.0,
};

pub const BONE_MATERIAL: Material = Material {
    ka: Vec4::new(0.1, 0.1, 0.1, 1.0),
    kd: Vec4::new(1.0, 1.0, 1.0, 1.0),
    ks: Vec4::new(0.3, 0.3, 0.3, 1.0),
    ns: 0.1,
};

/// 光源 uniform 位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightLocations {
    pub la: UniformLocation,
    pub ld: UniformLocation,
    pub ls: UniformLocation,
    pub position: UniformLocation,
    pub power: UniformLocation,
}

impl LightLocations {
    pub fn locate(uploader: &dyn UniformUploader) -> Self {
        Self {
            la: uploader.location("light.La"),
            ld: uploader.location("light.Ld"),
            ls: uploader.location("light.Ls"),
            position: uploader.location("light.lightPosition_worldspace"),
            power: uploader.location("light.power"),
        }
    }
}

/// 材质 uniform 位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialLocations {
    pub ka: UniformLocation,
    pub kd: UniformLocation,
    pub ks: UniformLocation,
    pub ns: UniformLocation,
}

impl MaterialLocations {
    pub fn locate(uploader: &dyn UniformUploader) -> Self {
        Self {
            ka: uploader.location("mtl.Ka"),
            kd: uploader.location("mtl.Kd"),
            ks: uploader.location("mtl.Ks"),
            ns: uploader.location("mtl.Ns"),
        }
    }
}

impl Light {
    pub fn upload(&self, uploader: &mut dyn UniformUploader, at: &LightLocations) {
        uploader.set_vec4(at.la, self.la);
        uploader.set_vec4(at.ld, self.ld);
        uploader.set_vec4(at.ls, self.ls);
        uploader.set_vec3(at.position, self.position);
        uploader.set_float(at.power, self.power);
    }
}

impl Material {
    pub fn upload(&self, uploader: &mut dyn UniformUploader, at: &MaterialLocations) {
        uploader.set_vec4(at.ka, self.ka);
        uploader.set_vec4(at.kd, self.kd);
        uploader.set_vec4(at.ks, self.ks);
        uploader.set_float(at.ns, self.ns);
    }
}
