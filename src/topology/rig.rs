//! CSV 拓扑骨架 - 指针拖拽驱动
//!
//! 关节由 CSV 记录生成并按层级编号布局在窗口中，
//! 每条带父节点的记录生成一根 父 → 子 骨骼。
//! 没有追踪输入，只有拖拽与弹簧约束。

use std::fs;
use std::path::Path;

use glam::Vec3;

use crate::physics::{get_config, Bone, ConstraintPolicy, Joint, RigConfig};
use crate::render::Renderer;
use crate::{Result, RigError};

use super::csv_parse::{parse_records, TopologyRecord};

/// 指针事件
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Vec3),
    Drag(Vec3),
    Up,
}

/// CSV 拓扑骨架
#[derive(Clone, Debug, Default)]
pub struct TopologyRig {
    joints: Vec<Joint>,
    bones: Vec<Bone>,
    /// 最近的指针位置
    cursor: Vec3,
}

impl TopologyRig {
    /// 从 CSV 文件加载
    ///
    /// 文件不存在时记录错误并返回空骨架。
    pub fn load<P: AsRef<Path>>(path: P, window_width: f32) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::error!("拓扑文件不存在: {}", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_csv(&text, window_width)
    }

    /// 从 CSV 文本构建（使用全局配置）
    pub fn from_csv(text: &str, window_width: f32) -> Result<Self> {
        let records = parse_records(text)?;
        Self::from_records(&records, window_width, &get_config())
    }

    /// 从拓扑记录构建
    ///
    /// 关节 i 的位置：(窗口宽度/2 + 40 * (degree % 10), 5 * |degree| + 50, 0)
    pub fn from_records(records: &[TopologyRecord], window_width: f32, config: &RigConfig) -> Result<Self> {
        let count = records.len() as i32;
        for (i, record) in records.iter().enumerate() {
            let links = std::iter::once(record.parent).chain(record.children());
            for link in links {
                if link >= count || link < -1 {
                    return Err(RigError::Topology(format!(
                        "关节 '{}' (记录 {}) 引用了不存在的索引 {}",
                        record.name, i, link
                    )));
                }
            }
            if record.parent == i as i32 {
                return Err(RigError::Topology(format!("关节 '{}' 的父节点是自身", record.name)));
            }
        }

        let joints: Vec<Joint> = records
            .iter()
            .map(|r| {
                let position = Vec3::new(
                    window_width / 2.0 + 40.0 * (r.degree % 10) as f32,
                    5.0 * r.degree.abs() as f32 + 50.0,
                    0.0,
                );
                Joint::with_topology(position, r.degree, r.parent, r.left_child, r.mid_child, r.right_child, r.name.clone())
                    .with_physics(config.joint_mass, config.joint_damping)
            })
            .collect();

        let bones: Vec<Bone> = joints
            .iter()
            .enumerate()
            .filter_map(|(i, joint)| {
                joint
                    .parent_id()
                    .map(|p| Bone::between(&joints, p, i, config.bone_stiffness, ConstraintPolicy::Simple))
            })
            .collect();

        if config.debug_log {
            log::info!("拓扑骨架构建完成: {} 关节, {} 骨骼", joints.len(), bones.len());
        }

        Ok(Self {
            joints,
            bones,
            cursor: Vec3::ZERO,
        })
    }

    // ========================================
    // 指针交互
    // ========================================

    /// 按下：命中半径内的关节开始拖拽
    pub fn pointer_down(&mut self, point: Vec3) {
        self.cursor = point;
        for joint in &mut self.joints {
            joint.handle_click_default(point);
        }
    }

    pub fn pointer_drag(&mut self, point: Vec3) {
        self.cursor = point;
    }

    pub fn pointer_up(&mut self) {
        for joint in &mut self.joints {
            joint.end_drag();
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => self.pointer_down(p),
            PointerEvent::Drag(p) => self.pointer_drag(p),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    // ========================================
    // 每帧更新
    // ========================================

    /// 先施加全部骨骼约束，再积分关节，拖拽中的关节跟随指针
    pub fn step(&mut self) {
        for bone in &self.bones {
            bone.apply_constraint(&mut self.joints);
        }
        for joint in &mut self.joints {
            joint.integrate();
            joint.handle_drag(self.cursor);
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        for bone in &self.bones {
            bone.render(&self.joints, renderer);
        }
        for joint in &self.joints {
            joint.render(renderer);
        }
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
    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;

    const CSV: &str = "j0,-1,1,,,head,0\rj1,0,2,,3,neck,10\rj2,1,,,,l_arm,21\rj3,1,,,,r_arm,-21";

    fn rig() -> TopologyRig {
        let records = parse_records(CSV).unwrap();
        TopologyRig::from_records(&records, 800.0, &RigConfig::default()).unwrap()
    }

    #[test]
    fn test_layout_and_bones() {
        let rig = rig();
        assert_eq!(rig.joints().len(), 4);
        assert_eq!(rig.bones().len(), 3);

        assert_eq!(rig.joints()[0].position, Vec3::new(400.0, 50.0, 0.0));
        assert_eq!(rig.joints()[2].position, Vec3::new(440.0, 155.0, 0.0));
        // -21 % 10 == -1
        assert_eq!(rig.joints()[3].position, Vec3::new(360.0, 155.0, 0.0));

        let neck_arm = &rig.bones()[1];
        assert_eq!((neck_arm.a, neck_arm.b), (1, 2));
        assert!((neck_arm.rest_length - (40.0f32.powi(2) + 55.0f32.powi(2)).sqrt()).abs() < 1e-3);
        assert_eq!(rig.find_joint("r_arm"), Some(3));
    }

    #[test]
    fn test_rest_pose_is_stable() {
        let mut rig = rig();
        let before: Vec<Vec3> = rig.joints().iter().map(|j| j.position).collect();
        for _ in 0..50 {
            rig.step();
        }
        for (joint, p) in rig.joints().iter().zip(before) {
            assert_eq!(joint.position, p);
        }
    }

    #[test]
    fn test_drag_moves_joint_and_springs_follow() {
        let mut rig = rig();
        rig.handle_pointer(PointerEvent::Down(Vec3::new(442.0, 155.0, 0.0)));
        assert!(rig.joints()[2].is_dragged());
        assert!(!rig.joints()[3].is_dragged());

        rig.handle_pointer(PointerEvent::Drag(Vec3::new(542.0, 155.0, 0.0)));
        rig.step();
        assert_eq!(rig.joints()[2].position, Vec3::new(540.0, 155.0, 0.0));

        // 拉长的骨骼在下一帧把颈部拉向手臂
        let neck_before = rig.joints()[1].position;
        rig.step();
        assert!(rig.joints()[1].position.x > neck_before.x);

        rig.handle_pointer(PointerEvent::Up);
        assert!(rig.joints().iter().all(|j| !j.is_dragged()));
    }

    #[test]
    fn test_invalid_reference_is_error() {
        let records = parse_records("j0,-1,5,,,head,0").unwrap();
        let err = TopologyRig::from_records(&records, 800.0, &RigConfig::default()).unwrap_err();
        assert!(matches!(err, RigError::Topology(_)));
    }

    #[test]
    fn test_missing_file_gives_empty_rig() {
        let rig = TopologyRig::load("does/not/exist/skeleton1.csv", 800.0).unwrap();
        assert!(rig.is_empty());
        assert!(rig.bones().is_empty());
    }

    #[test]
    fn test_load_bundled_asset() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/skeleton1.csv");
        let rig = TopologyRig::load(&path, 800.0).unwrap();
        assert_eq!(rig.joints().len(), 16);
        assert_eq!(rig.bones().len(), 15);
        assert_eq!(rig.find_joint("pelvis"), Some(9));
        assert!(rig.joints().iter().filter(|j| j.is_root()).count() == 1);
    }

    #[test]
    fn test_render_draws_everything() {
        let rig = rig();
        let mut renderer = RecordingRenderer::new();
        rig.render(&mut renderer);
        assert_eq!(renderer.line_count(), 3);
        assert_eq!(renderer.cube_count(), 4);
    }
}
