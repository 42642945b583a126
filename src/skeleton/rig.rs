//! 追踪驱动的 15 关节骨架
//!
//! 流程：new(首帧) 标定静止长度 → 每帧 [update(追踪帧) → render]
//!
//! update 的顺序固定：先积分全部关节，再对每根骨骼施加约束。
//! 本帧算出的骨骼力进入下一帧的积分（一步滞后，无迭代求解）。

use glam::Vec3;

use crate::physics::{get_config, Bone, ConstraintPolicy, Joint, JointFlags, RigConfig};
use crate::render::{Renderer, OVERLAY_COLOR, OVERLAY_LINE_WIDTH};
use crate::{Result, RigError};

use super::landmark::{Landmark, BONE_PAIRS, BRACE_COUNT, JOINT_COUNT, LANDMARK_COUNT, OVERLAY_LINES};

/// Sweep 预设施加的固定力
const SWEEP_FORCE: Vec3 = Vec3::new(1000.0, -100.0, 1000.0);

/// 外力预设
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushPreset {
    /// 松开骨架：所有关节施加一次重力
    Fall,
    /// 所有关节施加给定力与一次重力
    FallToGround,
    /// 只推脊柱顶部
    Nudge,
    /// 所有关节施加固定横扫力
    Sweep,
    /// 推指定索引的关节
    Joint(usize),
}

/// 骨架
///
/// 关节与骨骼数组在构建后长度不变，骨骼通过索引引用关节。
#[derive(Clone, Debug)]
pub struct Skeleton {
    /// 最近一帧原始追踪点
    landmarks: Vec<Vec3>,
    /// 物理关节（顺序见 `Landmark::ALL`）
    joints: Vec<Joint>,
    /// 物理骨骼（顺序见 `BONE_PAIRS`）
    bones: Vec<Bone>,
    policy: ConstraintPolicy,
    /// 是否处于跌倒状态（只记录状态，重力在触发预设时施加一次）
    gravity_enabled: bool,
    gravity: Vec3,
    /// 渲染的骨骼数量
    rendered_bone_count: usize,
    joint_cube_scale: f32,
}

impl Skeleton {
    /// 使用全局配置创建骨架
    pub fn new(frame: &[Vec3]) -> Result<Self> {
        Self::with_config(frame, &get_config())
    }

    /// 使用指定配置创建骨架
    ///
    /// 骨骼静止长度取首帧中两端追踪点的距离。
    pub fn with_config(frame: &[Vec3], config: &RigConfig) -> Result<Self> {
        check_frame(frame)?;

        let joints: Vec<Joint> = Landmark::ALL
            .iter()
            .map(|&landmark| {
                let t = landmark.topology();
                let mut joint = Joint::with_topology(
                    landmark.extract(frame),
                    t.degree,
                    t.parent,
                    t.left_child,
                    t.mid_child,
                    t.right_child,
                    landmark.name(),
                )
                .with_physics(config.joint_mass, config.joint_damping);
                joint.flags.insert(JointFlags::DATA_DRIVEN);
                joint
            })
            .collect();

        let policy = config.constraint_policy;
        let bones: Vec<Bone> = BONE_PAIRS
            .iter()
            .map(|&(a, b)| Bone::between(&joints, a.joint_index(), b.joint_index(), config.bone_stiffness, policy))
            .collect();

        let rendered_bone_count = config
            .rendered_bone_count
            .unwrap_or(bones.len() - BRACE_COUNT)
            .min(bones.len());

        if config.debug_log {
            log::info!(
                "骨架构建完成: {} 关节, {} 骨骼, 策略={:?}, 渲染骨骼={}",
                joints.len(),
                bones.len(),
                policy,
                rendered_bone_count
            );
        }

        Ok(Self {
            landmarks: frame.to_vec(),
            joints,
            bones,
            policy,
            gravity_enabled: false,
            gravity: Vec3::new(0.0, config.gravity_y, 0.0),
            rendered_bone_count,
            joint_cube_scale: config.joint_cube_scale,
        })
    }

    // ========================================
    // 每帧更新
    // ========================================

    /// 用新的追踪帧驱动骨架
    pub fn update(&mut self, frame: &[Vec3]) -> Result<()> {
        check_frame(frame)?;
        self.landmarks.clear();
        self.landmarks.extend_from_slice(frame);

        for (joint, landmark) in self.joints.iter_mut().zip(Landmark::ALL) {
            joint.integrate_towards(landmark.extract(frame));
        }

        for bone in &self.bones {
            bone.apply_constraint(&mut self.joints);
        }

        Ok(())
    }

    // ========================================
    // 外力
    // ========================================

    /// 对脊柱底部施加外力
    pub fn inject_force(&mut self, force: Vec3) {
        self.joints[Landmark::SpineBase.joint_index()].apply_force(force);
    }

    /// 对指定关节施加外力，索引越界时忽略
    pub fn inject_force_at(&mut self, force: Vec3, index: usize) {
        match self.joints.get_mut(index) {
            Some(joint) => joint.apply_force(force),
            None => log::warn!("关节索引 {} 越界（共 {} 个），忽略外力", index, JOINT_COUNT),
        }
    }

    /// 触发外力预设
    pub fn push(&mut self, preset: PushPreset, force: Vec3) {
        match preset {
            PushPreset::Fall => self.fall(Vec3::ZERO),
            PushPreset::FallToGround => self.fall(force),
            PushPreset::Nudge => {
                self.joints[Landmark::SpineTop.joint_index()].apply_force(force);
            }
            PushPreset::Sweep => {
                for joint in &mut self.joints {
                    joint.apply_force(SWEEP_FORCE);
                }
            }
            PushPreset::Joint(index) => self.inject_force_at(force, index),
        }
    }

    /// 所有关节施加 force 与重力，只在触发时生效一次
    ///
    /// 之后由地面钳制与阻尼让关节停在地面以上。
    fn fall(&mut self, force: Vec3) {
        for joint in &mut self.joints {
            joint.apply_force(force + self.gravity);
        }
        self.gravity_enabled = true;
    }

    /// 清除跌倒状态
    pub fn release(&mut self) {
        self.gravity_enabled = false;
    }

    #[inline]
    pub fn gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    #[inline]
    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity_enabled = enabled;
    }

    // ========================================
    // 渲染
    // ========================================

    /// 绘制关节、骨骼，以及可选的原始追踪点叠加层
    pub fn render(&self, renderer: &mut dyn Renderer, show_overlay: bool) {
        for joint in &self.joints {
            joint.render_scaled(renderer, self.joint_cube_scale);
        }

        for bone in &self.bones[..self.rendered_bone_count] {
            bone.render(&self.joints, renderer);
        }

        if show_overlay {
            renderer.set_color(OVERLAY_COLOR);
            renderer.set_line_width(OVERLAY_LINE_WIDTH);
            for (a, b) in OVERLAY_LINES {
                renderer.draw_line(a.extract(&self.landmarks), b.extract(&self.landmarks));
            }
        }
    }

    #[inline]
    pub fn rendered_bone_count(&self) -> usize {
        self.rendered_bone_count
    }

    /// 设置渲染的骨骼数量（超过骨骼总数时取总数）
    pub fn set_rendered_bone_count(&mut self, count: usize) {
        self.rendered_bone_count = count.min(self.bones.len());
    }

    // ========================================
    // 访问器
    // ========================================

    #[inline]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    pub fn joint(&self, landmark: Landmark) -> &Joint {
        &self.joints[landmark.joint_index()]
    }

    /// 最近一帧中该关节的原始追踪位置
    #[inline]
    pub fn landmark(&self, landmark: Landmark) -> Vec3 {
        landmark.extract(&self.landmarks)
    }

    #[inline]
    pub fn landmarks(&self) -> &[Vec3] {
        &self.landmarks
    }

    #[inline]
    pub fn policy(&self) -> ConstraintPolicy {
        self.policy
    }

    /// 当前姿态下所有骨骼约束力大小之和
    pub fn net_bone_force(&self) -> f32 {
        self.bones.iter().map(|b| b.constraint_force(&self.joints).length()).sum()
    }
}

fn check_frame(frame: &[Vec3]) -> Result<()> {
    if frame.len() != LANDMARK_COUNT {
        return Err(RigError::FrameLength {
            expected: LANDMARK_COUNT,
            actual: frame.len(),
        });
    }
    Ok(())
}
