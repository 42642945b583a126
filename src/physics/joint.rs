//! 关节 - 骨架中的单个质点
//!
//! 每个关节保存自身的积分状态（速度、加速度、offset）、
//! 可选的拓扑链接（父节点与左/中/右子节点索引）以及拖拽状态。

use glam::Vec3;
use bitflags::bitflags;

use crate::render::{Renderer, RIG_COLOR};

/// 追踪目标跳变超过该距离时视为噪声，本帧不吸附
pub const TELEPORT_DISTANCE: f32 = 1000.0;

/// 地面阈值：y + offset.y 不高于该值时钳制到地面
pub const GROUND_THRESHOLD: f32 = -10.0;

/// 默认质量
pub const DEFAULT_MASS: f32 = 8.0;

/// 默认阻尼
pub const DEFAULT_DAMPING: f32 = 0.5;

bitflags! {
    /// 关节状态标志位
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct JointFlags: u32 {
        /// 正在被指针拖拽
        const DRAGGED = 1 << 0;
        /// 位置每帧由外部追踪数据提供
        const DATA_DRIVEN = 1 << 1;
    }
}

/// 质点关节
#[derive(Clone, Debug)]
pub struct Joint {
    /// 调试名称
    pub name: String,

    /// 拓扑层级编号（CSV 中也用于布局）
    pub degree: i32,
    /// 父关节索引 (-1 表示无)
    pub parent: i32,
    /// 左子关节索引 (-1 表示无)
    pub left_child: i32,
    /// 中子关节索引 (-1 表示无)
    pub mid_child: i32,
    /// 右子关节索引 (-1 表示无)
    pub right_child: i32,

    /// 质量，必须大于 0
    pub mass: f32,
    /// 每步速度乘数
    pub damping: f32,

    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// 叠加在追踪位置上的次级位移
    pub offset: Vec3,
    /// 拖拽开始时 position - 指针位置
    pub drag_offset: Vec3,

    pub flags: JointFlags,
}

impl Joint {
    /// 在给定位置创建一个无拓扑链接的关节
    pub fn new(position: Vec3) -> Self {
        Self {
            name: String::new(),
            degree: 0,
            parent: -1,
            left_child: -1,
            mid_child: -1,
            right_child: -1,
            mass: DEFAULT_MASS,
            damping: DEFAULT_DAMPING,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            offset: Vec3::ZERO,
            drag_offset: Vec3::ZERO,
            flags: JointFlags::empty(),
        }
    }

    /// 创建带拓扑链接的关节
    pub fn with_topology(
        position: Vec3,
        degree: i32,
        parent: i32,
        left_child: i32,
        mid_child: i32,
        right_child: i32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            degree,
            parent,
            left_child,
            mid_child,
            right_child,
            ..Self::new(position)
        }
    }

    /// 创建由追踪数据驱动的关节
    pub fn data_driven(position: Vec3, name: impl Into<String>) -> Self {
        let mut joint = Self::new(position);
        joint.name = name.into();
        joint.flags.insert(JointFlags::DATA_DRIVEN);
        joint
    }

    /// 设置质量与阻尼
    pub fn with_physics(mut self, mass: f32, damping: f32) -> Self {
        debug_assert!(mass > 0.0, "joint mass must be positive");
        self.mass = mass;
        self.damping = damping;
        self
    }

    // ========================================
    // 拓扑访问器
    // ========================================

    #[inline]
    pub fn parent_id(&self) -> Option<usize> {
        link_id(self.parent)
    }

    #[inline]
    pub fn left_child_id(&self) -> Option<usize> {
        link_id(self.left_child)
    }

    #[inline]
    pub fn mid_child_id(&self) -> Option<usize> {
        link_id(self.mid_child)
    }

    #[inline]
    pub fn right_child_id(&self) -> Option<usize> {
        link_id(self.right_child)
    }

    /// 所有存在的子关节索引（左、中、右顺序）
    pub fn children(&self) -> impl Iterator<Item = usize> + '_ {
        [self.left_child, self.mid_child, self.right_child]
            .into_iter()
            .filter_map(link_id)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    #[inline]
    pub fn is_dragged(&self) -> bool {
        self.flags.contains(JointFlags::DRAGGED)
    }

    #[inline]
    pub fn is_data_driven(&self) -> bool {
        self.flags.contains(JointFlags::DATA_DRIVEN)
    }

    // ========================================
    // 积分
    // ========================================

    /// 累加外力：a += f / m
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// 无追踪目标的积分（纯弹簧模拟）
    pub fn integrate(&mut self) {
        self.velocity += self.acceleration;
        self.velocity *= self.damping;
        self.position += self.velocity;
        self.acceleration = Vec3::ZERO;
    }

    /// 追踪目标驱动的积分
    ///
    /// 先吸附到目标位置，再把速度累积进 offset 并叠加到位置上。
    /// 目标距离不小于 `TELEPORT_DISTANCE`（或为 NaN）时本帧不吸附。
    /// y + offset.y 落到 `GROUND_THRESHOLD` 以下时钳制到地面并清空 offset。
    pub fn integrate_towards(&mut self, target: Vec3) {
        self.snap_to(target);

        self.velocity += self.acceleration;
        self.velocity *= self.damping;

        if self.position.y + self.offset.y > GROUND_THRESHOLD {
            self.offset += self.velocity;
            self.position += self.offset;
        } else {
            self.position.y = 0.0;
            self.offset = Vec3::ZERO;
        }

        self.acceleration = Vec3::ZERO;
    }

    /// 吸附阶段，返回是否接受了目标
    pub fn snap_to(&mut self, target: Vec3) -> bool {
        if self.position.distance(target) < TELEPORT_DISTANCE {
            self.position = target;
            true
        } else {
            log::debug!("关节 '{}' 追踪目标跳变过大，忽略: {:?}", self.name, target);
            false
        }
    }

    // ========================================
    // 拖拽交互
    // ========================================

    /// 点击命中测试，命中则开始拖拽
    pub fn handle_click(&mut self, point: Vec3, radius: f32) -> bool {
        if point.distance(self.position) < radius {
            self.flags.insert(JointFlags::DRAGGED);
            self.drag_offset = self.position - point;
            true
        } else {
            false
        }
    }

    /// 以质量作为命中半径
    #[inline]
    pub fn handle_click_default(&mut self, point: Vec3) -> bool {
        self.handle_click(point, self.mass)
    }

    /// 拖拽中则刚性跟随指针
    pub fn handle_drag(&mut self, point: Vec3) {
        if self.is_dragged() {
            self.position = point + self.drag_offset;
        }
    }

    #[inline]
    pub fn end_drag(&mut self) {
        self.flags.remove(JointFlags::DRAGGED);
    }

    // ========================================
    // 渲染
    // ========================================

    /// 以质量为边长绘制立方体
    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.render_scaled(renderer, 1.0);
    }

    /// 以 质量 * scale 为边长绘制立方体
    pub fn render_scaled(&self, renderer: &mut dyn Renderer, scale: f32) {
        renderer.set_color(RIG_COLOR);
        renderer.draw_color_cube(self.position, Vec3::splat(self.mass * scale));
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[inline]
fn link_id(index: i32) -> Option<usize> {
    if index >= 0 {
        Some(index as usize)
    } else {
        None
    }
}
