//! JNI 绑定层 - 与 Java 代码交互

mod model_handle;
mod native_func;

pub use model_handle::ModelSlot;
pub use native_func::*;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::Lazy;

use crate::model::SkinnedModel;
use crate::variants;
use crate::Result;

/// 全局模型存储
pub static MODELS: Lazy<RwLock<HashMap<i64, Arc<Mutex<ModelSlot>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// 生成唯一句柄 ID
fn next_handle_id() -> i64 {
    use std::sync::atomic::{AtomicI64, Ordering};
    static COUNTER: AtomicI64 = AtomicI64::new(1);
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// 注册模型并返回句柄
pub fn register_model(slot: ModelSlot) -> i64 {
    let id = next_handle_id();
    let mut models = match MODELS.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    models.insert(id, Arc::new(Mutex::new(slot)));
    id
}

/// 移除模型，返回句柄是否存在
pub fn remove_model(handle: i64) -> bool {
    let mut models = match MODELS.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    models.remove(&handle).is_some()
}

/// 在持锁状态下访问模型，句柄不存在时返回 None
pub fn with_model<R>(handle: i64, f: impl FnOnce(&mut ModelSlot) -> R) -> Option<R> {
    let slot = {
        let models = match MODELS.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        models.get(&handle).cloned()?
    };
    let mut slot = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    Some(f(&mut slot))
}

/// 按骨架名称与网格路径创建模型并注册
pub fn create_model(variant_name: &str, obj_path: &str) -> Result<i64> {
    let variant = variants::by_name(variant_name)?;
    let mesh = crate::model::load_obj(obj_path)?;
    let model = SkinnedModel::new(&variant, mesh)?;
    Ok(register_model(ModelSlot::new(variant, model)))
}
