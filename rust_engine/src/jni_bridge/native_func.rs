//! JNI 原生函数实现
//!
//! 窗口、着色器、相机由 Java 侧持有，这里只负责模型与数据拷贝。
//! 使用标准 jni 0.21 API

use jni::objects::{JByteBuffer, JClass, JString};
use jni::sys::{jboolean, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::ptr;

use super::{create_model, remove_model, with_model};

const VERSION: &str = concat!("SkinEngine-", env!("CARGO_PKG_VERSION"));

/// 把字节拷贝进 direct ByteBuffer，容量不足或不是 direct buffer 时返回 false
fn copy_to_buffer(env: &JNIEnv, buffer: &JByteBuffer, src: &[u8]) -> bool {
    let dst = match env.get_direct_buffer_address(buffer) {
        Ok(dst) => dst,
        Err(e) => {
            log::warn!("无法获取 ByteBuffer 地址: {}", e);
            return false;
        }
    };
    match env.get_direct_buffer_capacity(buffer) {
        Ok(capacity) if capacity >= src.len() => {}
        Ok(capacity) => {
            log::warn!("ByteBuffer 容量不足: {} < {}", capacity, src.len());
            return false;
        }
        Err(e) => {
            log::warn!("无法获取 ByteBuffer 容量: {}", e);
            return false;
        }
    }
    unsafe {
        ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
    }
    true
}

// ============================================================================
// 基础函数
// ============================================================================

/// 获取版本号
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_GetVersion(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// 模型相关函数
// ============================================================================

/// 创建模型：variant 为骨架名称（"human" / "hand"），返回句柄，失败返回 0
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_CreateModel(
    mut env: JNIEnv,
    _class: JClass,
    variant: JString,
    obj_path: JString,
) -> jlong {
    let variant: String = match env.get_string(&variant) {
        Ok(s) => s.into(),
        Err(_) => return 0,
    };
    let obj_path: String = match env.get_string(&obj_path) {
        Ok(s) => s.into(),
        Err(_) => return 0,
    };

    match create_model(&variant, &obj_path) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to create model {} from {}: {}", variant, obj_path, e);
            0
        }
    }
}

/// 删除模型
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_DeleteModel(
    _env: JNIEnv,
    _class: JClass,
    model: jlong,
) {
    if !remove_model(model) {
        log::warn!("DeleteModel: 未知句柄 {}", model);
    }
}

/// 以 time 时刻的演示姿态更新模型
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_UpdateModel(
    _env: JNIEnv,
    _class: JClass,
    model: jlong,
    time: jfloat,
) -> jboolean {
    match with_model(model, |slot| slot.update(time)) {
        Some(()) => JNI_TRUE,
        None => JNI_FALSE,
    }
}

/// 获取关节数量
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_GetJointCount(
    _env: JNIEnv,
    _class: JClass,
    model: jlong,
) -> jint {
    with_model(model, |slot| slot.model.joint_count() as jint).unwrap_or(0)
}

/// 获取顶点数量
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_GetVertexCount(
    _env: JNIEnv,
    _class: JClass,
    model: jlong,
) -> jlong {
    with_model(model, |slot| slot.model.vertex_count() as jlong).unwrap_or(0)
}

// ============================================================================
// 数据拷贝函数
// ============================================================================

/// 复制蒙皮矩阵到 ByteBuffer（列主序，每个 64 字节），返回矩阵数量
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_CopySkinningMatrices(
    env: JNIEnv,
    _class: JClass,
    model: jlong,
    buffer: JByteBuffer,
) -> jint {
    with_model(model, |slot| {
        let matrices = slot.model.skinning_matrices();
        if copy_to_buffer(&env, &buffer, bytemuck::cast_slice(matrices)) {
            matrices.len() as jint
        } else {
            0
        }
    })
    .unwrap_or(0)
}

/// 复制每顶点关节下标（float）到 ByteBuffer，返回顶点数量
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_CopyJointIndices(
    env: JNIEnv,
    _class: JClass,
    model: jlong,
    buffer: JByteBuffer,
) -> jint {
    with_model(model, |slot| {
        let attribute = slot.model.joint_attribute();
        if copy_to_buffer(&env, &buffer, bytemuck::cast_slice(attribute)) {
            attribute.len() as jint
        } else {
            0
        }
    })
    .unwrap_or(0)
}

/// 复制 CPU 蒙皮后的顶点位置（xyz 平铺）到 ByteBuffer，返回顶点数量
#[no_mangle]
pub extern "system" fn Java_com_skinengine_NativeFunc_CopySkinnedPositions(
    env: JNIEnv,
    _class: JClass,
    model: jlong,
    buffer: JByteBuffer,
) -> jint {
    with_model(model, |slot| {
        let raw = &slot.model.update_positions_raw;
        if copy_to_buffer(&env, &buffer, bytemuck::cast_slice(raw)) {
            (raw.len() / 3) as jint
        } else {
            0
        }
    })
    .unwrap_or(0)
}
