//! 质点-弹簧骨架引擎
//!
//! - physics: 关节（质点）、骨骼（弹簧约束）与全局配置
//! - skeleton: 由 45 点追踪帧驱动的 15 关节骨架
//! - topology: 由单行 CSV 构建的拖拽骨架
//! - animation: 追踪帧录制文件
//! - render: 渲染协作者接口

pub mod animation;
pub mod physics;
pub mod render;
pub mod skeleton;
pub mod topology;

pub use physics::{Bone, ConstraintPolicy, Joint, JointFlags, RigConfig};
pub use render::{DrawCommand, RecordingRenderer, Renderer};
pub use skeleton::{Landmark, PushPreset, Skeleton};
pub use topology::{PointerEvent, TopologyRecord, TopologyRig};

use thiserror::Error;

/// 引擎错误
#[derive(Debug, Error)]
pub enum RigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tracking frame: expected {expected} landmarks, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Frame recording parse error: {0}")]
    FrameParse(String),

    #[error("CSV parse error at record {record}, column {column}: {value:?}")]
    CsvParse {
        record: usize,
        column: usize,
        value: String,
    },

    #[error("Topology error: {0}")]
    Topology(String),
}

pub type Result<T> = std::result::Result<T, RigError>;
