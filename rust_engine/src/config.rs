//! 引擎配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。
//! 骨架相关的数据（关节表、坐标配方、阈值表）不在这里，见 `variants`。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ========== 窗口 ==========
    /// 窗口宽度，默认 1024
    pub window_width: u32,
    /// 窗口高度，默认 768
    pub window_height: u32,
    /// 窗口标题
    pub window_title: String,
    /// 清屏颜色（RGBA）
    pub clear_color: [f32; 4],

    // ========== 蒙皮 ==========
    /// 绑定姿态世界矩阵行列式绝对值低于此值视为奇异，默认 1e-6
    pub singular_epsilon: f32,
    /// 顶点分类是否使用 rayon 并行，默认 true
    pub parallel_classify: bool,

    // ========== 绘制 ==========
    /// 蒙皮网格是否以线框绘制，默认 true
    pub skin_wireframe: bool,
    /// 是否绘制骨架线段，默认 true
    pub draw_skeleton: bool,

    // ========== 调试 ==========
    /// 是否输出每帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            window_title: "Lab 06".to_string(),
            // 灰色背景
            clear_color: [0.5, 0.5, 0.5, 0.0],

            // 旋转/平移组合的矩阵行列式恒为 1，
            // 只有配置错误（例如零缩放）才会触发
            singular_epsilon: 1e-6,
            parallel_classify: true,

            skin_wireframe: true,
            draw_skeleton: true,

            debug_log: false,
        }
    }
}

/// 全局配置实例
static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> = Lazy::new(|| {
    RwLock::new(EngineConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> EngineConfig {
    match ENGINE_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 持读锁访问配置（只取单个字段时避免整体克隆）
pub fn with_config<R>(f: impl FnOnce(&EngineConfig) -> R) -> R {
    match ENGINE_CONFIG.read() {
        Ok(config) => f(&config),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: EngineConfig) {
    match ENGINE_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(EngineConfig::default());
}
