//! 渲染协作者接口
//!
//! 骨架本身不做任何 GPU 工作，只通过 `Renderer` 发出绘制指令。

use glam::{Vec3, Vec4};

/// 关节与骨骼颜色
pub const RIG_COLOR: Vec4 = Vec4::new(0.68, 0.68, 0.68, 1.0);

/// 原始追踪点叠加层颜色
pub const OVERLAY_COLOR: Vec4 = Vec4::new(0.5, 0.5, 1.0, 1.0);

/// 叠加层线宽
pub const OVERLAY_LINE_WIDTH: f32 = 5.0;

/// 绘制后端
pub trait Renderer {
    fn set_color(&mut self, color: Vec4);
    fn set_line_width(&mut self, width: f32);
    fn draw_line(&mut self, from: Vec3, to: Vec3);
    fn draw_color_cube(&mut self, center: Vec3, size: Vec3);
}

/// 绘制指令
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Color(Vec4),
    LineWidth(f32),
    Line { from: Vec3, to: Vec3 },
    Cube { center: Vec3, size: Vec3 },
}

/// 记录所有绘制指令的渲染器（测试与无窗口回放）
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn line_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count()
    }

    pub fn cube_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Cube { .. })).count()
    }

    /// 清空指令（每帧开始时调用）
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn set_color(&mut self, color: Vec4) {
        self.commands.push(DrawCommand::Color(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn draw_line(&mut self, from: Vec3, to: Vec3) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn draw_color_cube(&mut self, center: Vec3, size: Vec3) {
        self.commands.push(DrawCommand::Cube { center, size });
    }
}
