//! 骨架系统
//!
//! - Landmark: 45 点追踪帧到 15 个物理关节的映射表
//! - Skeleton: 追踪驱动的关节/骨骼组合

mod landmark;
mod rig;

pub use landmark::{
    neutral_frame, JointTopology, Landmark, BONE_PAIRS, BRACE_COUNT, JOINT_COUNT, LANDMARK_COUNT,
    OVERLAY_LINES,
};
pub use rig::{PushPreset, Skeleton};
