//! 骨骼 - 两个关节之间的弹簧约束
//!
//! 骨骼只保存关节数组中的索引，不持有关节本身。
//! 每帧只做一次修正（无子步、无迭代求解），稳定性依赖关节阻尼。

use glam::Vec3;

use super::joint::Joint;
use crate::render::{Renderer, RIG_COLOR};

/// 小于该值的伸长量视为噪声
const DEADBAND_THRESHOLD: f32 = 30.0;
/// 超出死区后剥离的固定伸长量
const DEADBAND: f32 = 20.0;
/// 伸长量软钳制上限
const STRETCH_LIMIT: f32 = 100.0;
/// 力大小上限
const FORCE_LIMIT: f32 = 100.0;

/// 约束策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConstraintPolicy {
    /// 直接使用伸长量
    Simple,
    /// 死区 + 伸长量软钳制 + 力大小钳制
    #[default]
    Clamped,
}

impl ConstraintPolicy {
    /// 按策略修正伸长量
    pub fn shape_stretch(self, stretch: f32) -> f32 {
        match self {
            ConstraintPolicy::Simple => stretch,
            ConstraintPolicy::Clamped => {
                let mut stretch = if stretch.abs() > DEADBAND_THRESHOLD {
                    stretch - DEADBAND * stretch.signum()
                } else {
                    0.0
                };
                if stretch.abs() > STRETCH_LIMIT {
                    // 负方向因 +1 偏置略大于 100
                    stretch = STRETCH_LIMIT * (stretch.abs() + 1.0) / (stretch + 1.0);
                }
                stretch
            }
        }
    }

    /// 按策略钳制力
    pub fn clamp_force(self, force: Vec3) -> Vec3 {
        match self {
            ConstraintPolicy::Simple => force,
            ConstraintPolicy::Clamped => {
                if force.length() > FORCE_LIMIT {
                    force.normalize() * FORCE_LIMIT
                } else {
                    force
                }
            }
        }
    }
}

/// 弹簧骨骼
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    /// 端点 a 的关节索引
    pub a: usize,
    /// 端点 b 的关节索引
    pub b: usize,
    /// 静止长度
    pub rest_length: f32,
    /// 刚度 k
    pub stiffness: f32,
    pub policy: ConstraintPolicy,
}

impl Bone {
    pub fn new(a: usize, b: usize, rest_length: f32, stiffness: f32, policy: ConstraintPolicy) -> Self {
        debug_assert!(rest_length >= 0.0, "bone rest length must be non-negative");
        Self { a, b, rest_length, stiffness, policy }
    }

    /// 以两个关节当前距离作为静止长度
    pub fn between(joints: &[Joint], a: usize, b: usize, stiffness: f32, policy: ConstraintPolicy) -> Self {
        let rest_length = joints[a].position.distance(joints[b].position);
        Self::new(a, b, rest_length, stiffness, policy)
    }

    /// 当前长度
    #[inline]
    pub fn current_length(&self, joints: &[Joint]) -> f32 {
        (joints[self.a].position - joints[self.b].position).length()
    }

    /// 计算作用在端点 a 上的力（b 受力为其相反数）
    ///
    /// 端点重合时方向取零向量，力为零。
    pub fn constraint_force(&self, joints: &[Joint]) -> Vec3 {
        let delta = joints[self.a].position - joints[self.b].position;
        let stretch = self.policy.shape_stretch(delta.length() - self.rest_length);
        let direction = delta.normalize_or_zero();

        let force = direction * (-self.stiffness * stretch);
        self.policy.clamp_force(force)
    }

    /// 施加约束力，返回作用在 a 上的力
    pub fn apply_constraint(&self, joints: &mut [Joint]) -> Vec3 {
        let force = self.constraint_force(joints);
        joints[self.a].apply_force(force);
        joints[self.b].apply_force(-force);
        force
    }

    /// 绘制连线
    pub fn render(&self, joints: &[Joint], renderer: &mut dyn Renderer) {
        renderer.set_color(RIG_COLOR);
        renderer.draw_line(joints[self.a].position, joints[self.b].position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: Vec3, b: Vec3) -> Vec<Joint> {
        vec![Joint::new(a), Joint::new(b)]
    }

    #[test]
    fn test_rest_state_has_no_force() {
        let mut joints = pair(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 7.5, 0.25));
        let bone = Bone::between(&joints, 0, 1, 0.5, ConstraintPolicy::Simple);

        let force = bone.apply_constraint(&mut joints);
        assert_eq!(force, Vec3::ZERO);
        assert_eq!(joints[0].acceleration, Vec3::ZERO);
        assert_eq!(joints[1].acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_force_is_symmetric() {
        let mut joints = pair(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        let bone = Bone::new(0, 1, 4.0, 0.5, ConstraintPolicy::Simple);

        let force = bone.apply_constraint(&mut joints);
        // 拉伸 6：a 被拉向 b
        assert!((force - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
        assert!((joints[0].acceleration * joints[0].mass - force).length() < 1e-5);
        assert!((joints[1].acceleration * joints[1].mass + force).length() < 1e-5);
    }

    #[test]
    fn test_compressed_bone_pushes_apart() {
        let joints = pair(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        let bone = Bone::new(0, 1, 5.0, 1.0, ConstraintPolicy::Simple);
        let force = bone.constraint_force(&joints);
        assert!(force.y < 0.0);
    }

    #[test]
    fn test_coincident_joints_produce_zero_force() {
        let joints = pair(Vec3::ZERO, Vec3::ZERO);
        let bone = Bone::new(0, 1, 3.0, 1.0, ConstraintPolicy::Simple);
        assert_eq!(bone.constraint_force(&joints), Vec3::ZERO);
    }

    #[test]
    fn test_clamped_deadband() {
        let policy = ConstraintPolicy::Clamped;
        assert_eq!(policy.shape_stretch(25.0), 0.0);
        assert_eq!(policy.shape_stretch(-30.0), 0.0);
        assert_eq!(policy.shape_stretch(50.0), 30.0);
        assert_eq!(policy.shape_stretch(-50.0), -30.0);
    }

    #[test]
    fn test_clamped_soft_limit() {
        let policy = ConstraintPolicy::Clamped;
        // 199 - 20 = 179 -> 100 * 180 / 180
        assert!((policy.shape_stretch(199.0) - 100.0).abs() < 1e-4);
        // -199 + 20 = -179 -> 100 * 180 / -178
        let negative = policy.shape_stretch(-199.0);
        assert!((negative + 100.0 * 180.0 / 178.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamped_force_limit() {
        let joints = pair(Vec3::ZERO, Vec3::new(0.0, 500.0, 0.0));
        let bone = Bone::new(0, 1, 0.0, 10.0, ConstraintPolicy::Clamped);
        let force = bone.constraint_force(&joints);
        assert!((force.length() - 100.0).abs() < 1e-3);
        assert!(force.y > 0.0);
    }

    #[test]
    fn test_clamped_ignores_small_stretch() {
        let mut joints = pair(Vec3::ZERO, Vec3::new(0.0, 40.0, 0.0));
        let bone = Bone::new(0, 1, 20.0, 1.0, ConstraintPolicy::Clamped);
        assert_eq!(bone.apply_constraint(&mut joints), Vec3::ZERO);
    }
}
