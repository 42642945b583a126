//! 追踪帧输入
//!
//! FrameSequence: 预先录制的 45 点追踪帧序列

mod frame_loader;

pub use frame_loader::FrameSequence;
