//! 追踪帧录制文件加载器
//!
//! 文件布局（小端）：
//! - 8 字节头部 `RIGFRAME`
//! - u32 每帧追踪点数（必须为 45）
//! - u32 帧数
//! - 帧数 * 45 * 3 个 f32 (x, y, z)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::Vec3;

use crate::skeleton::LANDMARK_COUNT;
use crate::{Result, RigError};

/// 录制文件头
const FRAME_HEADER: &[u8; 8] = b"RIGFRAME";

/// 追踪帧序列
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    /// 所有帧，每帧 45 个点
    frames: Vec<Vec<Vec3>>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从文件路径加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        Self::load_from_reader(&mut reader)
    }

    /// 从字节切片加载
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = std::io::Cursor::new(bytes);
        Self::load_from_reader(&mut reader)
    }

    /// 从 Reader 加载
    pub fn load_from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)
            .map_err(|e| RigError::FrameParse(format!("Failed to read header: {}", e)))?;
        if &header != FRAME_HEADER {
            return Err(RigError::FrameParse("Invalid frame recording header".to_string()));
        }

        let landmark_count = reader.read_u32::<LittleEndian>()
            .map_err(|e| RigError::FrameParse(format!("Failed to read landmark count: {}", e)))?;
        if landmark_count as usize != LANDMARK_COUNT {
            return Err(RigError::FrameParse(format!(
                "Unsupported landmark count {} (expected {})",
                landmark_count, LANDMARK_COUNT
            )));
        }

        let frame_count = reader.read_u32::<LittleEndian>()
            .map_err(|e| RigError::FrameParse(format!("Failed to read frame count: {}", e)))?;

        let mut frames = Vec::new();
        for index in 0..frame_count {
            let frame = read_frame(reader)
                .map_err(|e| RigError::FrameParse(format!("Failed to read frame {}: {}", index, e)))?;
            frames.push(frame);
        }

        Ok(Self { frames })
    }

    /// 写出录制文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// 写入 Writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(FRAME_HEADER)?;
        writer.write_u32::<LittleEndian>(LANDMARK_COUNT as u32)?;
        writer.write_u32::<LittleEndian>(self.frames.len() as u32)?;
        for frame in &self.frames {
            for point in frame {
                writer.write_f32::<LittleEndian>(point.x)?;
                writer.write_f32::<LittleEndian>(point.y)?;
                writer.write_f32::<LittleEndian>(point.z)?;
            }
        }
        Ok(())
    }

    /// 追加一帧，长度必须为 45
    pub fn push(&mut self, frame: Vec<Vec3>) -> Result<()> {
        if frame.len() != LANDMARK_COUNT {
            return Err(RigError::FrameLength {
                expected: LANDMARK_COUNT,
                actual: frame.len(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn frame(&self, index: usize) -> Option<&[Vec3]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// 循环取帧（序列为空时返回 None）
    pub fn frame_looped(&self, index: usize) -> Option<&[Vec3]> {
        if self.frames.is_empty() {
            return None;
        }
        self.frame(index % self.frames.len())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Vec3]> {
        self.frames.iter().map(Vec::as_slice)
    }
}

fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Vec<Vec3>> {
    let mut frame = Vec::with_capacity(LANDMARK_COUNT);
    for _ in 0..LANDMARK_COUNT {
        let x = reader.read_f32::<LittleEndian>()?;
        let y = reader.read_f32::<LittleEndian>()?;
        let z = reader.read_f32::<LittleEndian>()?;
        frame.push(Vec3::new(x, y, z));
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::neutral_frame;

    fn sequence() -> FrameSequence {
        let mut sequence = FrameSequence::new();
        let base = neutral_frame();
        for i in 0..3 {
            let frame = base.iter().map(|p| *p + Vec3::new(i as f32, 0.0, 0.0)).collect();
            sequence.push(frame).unwrap();
        }
        sequence
    }

    #[test]
    fn test_write_then_load() {
        let sequence = sequence();
        let mut bytes = Vec::new();
        sequence.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 16 + 3 * LANDMARK_COUNT * 12);

        let loaded = FrameSequence::load_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.frame(2), sequence.frame(2));
    }

    #[test]
    fn test_truncated_recording() {
        let mut bytes = Vec::new();
        sequence().write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 5);

        let err = FrameSequence::load_from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, RigError::FrameParse(_)));
    }

    #[test]
    fn test_invalid_header() {
        let err = FrameSequence::load_from_bytes(b"NOTFRAMEXXXXXXXX").unwrap_err();
        assert!(matches!(err, RigError::FrameParse(_)));
    }

    #[test]
    fn test_push_rejects_short_frame() {
        let mut sequence = FrameSequence::new();
        assert!(sequence.push(vec![Vec3::ZERO; 3]).is_err());
        assert!(sequence.is_empty());
        assert!(sequence.frame_looped(7).is_none());
    }

    #[test]
    fn test_frame_looped() {
        let sequence = sequence();
        assert_eq!(sequence.frame_looped(4), sequence.frame(1));
    }
}
