//! 骨架物理配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use super::bone::ConstraintPolicy;

/// 骨架配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct RigConfig {
    // ========== 关节 ==========
    /// 关节质量，默认 8.0
    /// 同时作为点击命中半径
    pub joint_mass: f32,
    /// 每步速度衰减系数，默认 0.5
    pub joint_damping: f32,

    // ========== 骨骼 ==========
    /// 弹簧刚度 k，默认 0.5
    pub bone_stiffness: f32,
    /// 约束策略，默认 Clamped
    pub constraint_policy: ConstraintPolicy,

    // ========== 重力 ==========
    /// 重力 Y 分量（负数向下），默认 -1980.0
    /// 只在触发跌倒预设后施加
    pub gravity_y: f32,

    // ========== 渲染 ==========
    /// 骨架关节立方体边长 = 质量 * 该系数，默认 10.0
    pub joint_cube_scale: f32,
    /// 骨架渲染的骨骼数量，None 表示跳过最后两根横撑骨骼
    pub rendered_bone_count: Option<usize>,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            // ====== 关节 ======
            joint_mass: 8.0,
            joint_damping: 0.5,

            // ====== 骨骼 ======
            // 刚度过大会让 offset 层来回振荡
            bone_stiffness: 0.5,
            constraint_policy: ConstraintPolicy::Clamped,

            // ====== 重力 ======
            gravity_y: -1980.0,

            // ====== 渲染 ======
            joint_cube_scale: 10.0,
            rendered_bone_count: None,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

/// 全局配置实例
static RIG_CONFIG: Lazy<RwLock<RigConfig>> = Lazy::new(|| {
    RwLock::new(RigConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> RigConfig {
    RIG_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: RigConfig) {
    *RIG_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *RIG_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = RigConfig::default();
}
