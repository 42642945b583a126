//! 质点-弹簧物理
//!
//! - Joint: 质点，负责积分与拖拽
//! - Bone: 两个关节之间的弹簧约束
//! - RigConfig: 全局参数

mod bone;
mod config;
mod joint;

pub use bone::{Bone, ConstraintPolicy};
pub use config::{get_config, reset_config, set_config, RigConfig};
pub use joint::{Joint, JointFlags, DEFAULT_DAMPING, DEFAULT_MASS, GROUND_THRESHOLD, TELEPORT_DISTANCE};
