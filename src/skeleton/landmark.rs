//! 追踪点映射表
//!
//! 45 点追踪帧 → 15 个物理关节的映射、关节拓扑与骨骼连接
//! 都在这里声明一次，构建与更新共用。

use glam::Vec3;

/// 每帧追踪点数量
pub const LANDMARK_COUNT: usize = 45;

/// 物理关节数量
pub const JOINT_COUNT: usize = 15;

/// 骨架关节（按物理关节数组顺序）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    Head,
    SpineTop,
    LeftShoulder,
    LeftElbow,
    LeftHand,
    SpineBase,
    LeftHip,
    LeftKnee,
    LeftFoot,
    RightHip,
    RightKnee,
    RightFoot,
    RightShoulder,
    RightElbow,
    RightHand,
}

/// 关节拓扑：(层级编号, 父, 左子, 中子, 右子)，-1 表示无
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JointTopology {
    pub degree: i32,
    pub parent: i32,
    pub left_child: i32,
    pub mid_child: i32,
    pub right_child: i32,
}

const fn topo(degree: i32, parent: i32, left_child: i32, mid_child: i32, right_child: i32) -> JointTopology {
    JointTopology { degree, parent, left_child, mid_child, right_child }
}

impl Landmark {
    /// 物理关节顺序
    pub const ALL: [Landmark; JOINT_COUNT] = [
        Landmark::Head,
        Landmark::SpineTop,
        Landmark::LeftShoulder,
        Landmark::LeftElbow,
        Landmark::LeftHand,
        Landmark::SpineBase,
        Landmark::LeftHip,
        Landmark::LeftKnee,
        Landmark::LeftFoot,
        Landmark::RightHip,
        Landmark::RightKnee,
        Landmark::RightFoot,
        Landmark::RightShoulder,
        Landmark::RightElbow,
        Landmark::RightHand,
    ];

    /// 物理关节数组中的索引
    #[inline]
    pub fn joint_index(self) -> usize {
        self as usize
    }

    /// 在 45 点追踪帧中的索引
    pub fn frame_index(self) -> usize {
        match self {
            Landmark::Head => 0,
            Landmark::SpineTop => 21,
            Landmark::LeftShoulder => 13,
            Landmark::LeftElbow => 16,
            Landmark::LeftHand => 17,
            Landmark::SpineBase => 27,
            Landmark::LeftHip => 29,
            Landmark::LeftKnee => 43,
            Landmark::LeftFoot => 44,
            Landmark::RightHip => 28,
            Landmark::RightKnee => 34,
            Landmark::RightFoot => 35,
            Landmark::RightShoulder => 6,
            Landmark::RightElbow => 8,
            Landmark::RightHand => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Landmark::Head => "head",
            Landmark::SpineTop => "spine_top",
            Landmark::LeftShoulder => "l_shoulder",
            Landmark::LeftElbow => "l_elbow",
            Landmark::LeftHand => "l_hand",
            Landmark::SpineBase => "spine_base",
            Landmark::LeftHip => "l_hip",
            Landmark::LeftKnee => "l_knee",
            Landmark::LeftFoot => "l_foot",
            Landmark::RightHip => "r_hip",
            Landmark::RightKnee => "r_knee",
            Landmark::RightFoot => "r_foot",
            Landmark::RightShoulder => "r_shoulder",
            Landmark::RightElbow => "r_elbow",
            Landmark::RightHand => "r_hand",
        }
    }

    pub fn topology(self) -> JointTopology {
        match self {
            Landmark::Head => topo(0, -1, 1, -1, -1),
            Landmark::SpineTop => topo(10, 0, 2, 5, 12),
            Landmark::LeftShoulder => topo(21, 1, 3, -1, -1),
            Landmark::LeftElbow => topo(32, 2, 4, -1, -1),
            Landmark::LeftHand => topo(43, 3, -1, -1, -1),
            Landmark::SpineBase => topo(20, 1, 6, -1, 9),
            Landmark::LeftHip => topo(31, 5, 7, -1, -1),
            Landmark::LeftKnee => topo(42, 6, 8, -1, -1),
            Landmark::LeftFoot => topo(53, 7, -1, -1, -1),
            Landmark::RightHip => topo(-31, 5, -1, -1, 10),
            Landmark::RightKnee => topo(-42, 9, -1, -1, 11),
            Landmark::RightFoot => topo(-53, 10, -1, -1, -1),
            Landmark::RightShoulder => topo(-21, 1, -1, -1, 13),
            Landmark::RightElbow => topo(-32, 12, -1, -1, 14),
            Landmark::RightHand => topo(-43, 13, -1, -1, -1),
        }
    }

    /// 从追踪帧中取出该关节的位置
    #[inline]
    pub fn extract(self, frame: &[Vec3]) -> Vec3 {
        frame[self.frame_index()]
    }

    pub fn from_name(name: &str) -> Option<Landmark> {
        Self::ALL.iter().copied().find(|l| l.name() == name)
    }
}

use Landmark::*;

/// 骨骼连接：先是 14 根树骨骼，最后两根是肩、髋横撑
pub const BONE_PAIRS: [(Landmark, Landmark); 16] = [
    (Head, SpineTop),
    (SpineTop, LeftShoulder),
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftHand),
    (SpineTop, SpineBase),
    (SpineBase, LeftHip),
    (LeftHip, LeftKnee),
    (LeftKnee, LeftFoot),
    (SpineBase, RightHip),
    (RightHip, RightKnee),
    (RightKnee, RightFoot),
    (SpineTop, RightShoulder),
    (RightShoulder, RightElbow),
    (RightElbow, RightHand),
    (LeftShoulder, RightShoulder),
    (LeftHip, RightHip),
];

/// 横撑骨骼数量（渲染时默认跳过）
pub const BRACE_COUNT: usize = 2;

/// 原始追踪点叠加层连线
pub const OVERLAY_LINES: [(Landmark, Landmark); 13] = [
    // 躯干
    (Head, SpineTop),
    (RightShoulder, LeftShoulder),
    (SpineTop, SpineBase),
    (SpineBase, RightHip),
    (SpineBase, LeftHip),
    // 右臂
    (RightShoulder, RightElbow),
    (RightElbow, RightHand),
    // 左臂
    (LeftShoulder, LeftElbow),
    (LeftElbow, LeftHand),
    // 右腿
    (RightHip, RightKnee),
    (RightKnee, RightFoot),
    // 左腿
    (LeftHip, LeftKnee),
    (LeftKnee, LeftFoot),
];

/// 站立姿态（y 向上，脚底接近 y = 0）
///
/// 未被映射的追踪点填为脊柱底部位置。
pub fn neutral_frame() -> Vec<Vec3> {
    let mut frame = vec![Vec3::new(0.0, 95.0, 0.0); LANDMARK_COUNT];
    let pose = [
        (Head, Vec3::new(0.0, 170.0, 0.0)),
        (SpineTop, Vec3::new(0.0, 145.0, 0.0)),
        (LeftShoulder, Vec3::new(20.0, 140.0, 0.0)),
        (LeftElbow, Vec3::new(25.0, 110.0, 2.0)),
        (LeftHand, Vec3::new(28.0, 80.0, 5.0)),
        (SpineBase, Vec3::new(0.0, 95.0, 0.0)),
        (LeftHip, Vec3::new(10.0, 90.0, 0.0)),
        (LeftKnee, Vec3::new(12.0, 50.0, 3.0)),
        (LeftFoot, Vec3::new(12.0, 5.0, 0.0)),
        (RightHip, Vec3::new(-10.0, 90.0, 0.0)),
        (RightKnee, Vec3::new(-12.0, 50.0, 3.0)),
        (RightFoot, Vec3::new(-12.0, 5.0, 0.0)),
        (RightShoulder, Vec3::new(-20.0, 140.0, 0.0)),
        (RightElbow, Vec3::new(-25.0, 110.0, 2.0)),
        (RightHand, Vec3::new(-28.0, 80.0, 5.0)),
    ];
    for (landmark, position) in pose {
        frame[landmark.frame_index()] = position;
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_joint_order_matches_index() {
        for (i, landmark) in Landmark::ALL.iter().enumerate() {
            assert_eq!(landmark.joint_index(), i);
            assert_eq!(Landmark::from_name(landmark.name()), Some(*landmark));
        }
    }

    #[test]
    fn test_frame_indices_unique_and_in_range() {
        let indices: HashSet<usize> = Landmark::ALL.iter().map(|l| l.frame_index()).collect();
        assert_eq!(indices.len(), JOINT_COUNT);
        assert!(indices.iter().all(|&i| i < LANDMARK_COUNT));
    }

    #[test]
    fn test_topology_links_in_range() {
        for landmark in Landmark::ALL {
            let t = landmark.topology();
            for link in [t.parent, t.left_child, t.mid_child, t.right_child] {
                assert!(link >= -1 && link < JOINT_COUNT as i32, "{:?}", landmark);
            }
        }
        assert_eq!(Head.topology().parent, -1);
    }

    #[test]
    fn test_children_point_back_to_parent() {
        for landmark in Landmark::ALL {
            let t = landmark.topology();
            for child in [t.left_child, t.mid_child, t.right_child] {
                if child >= 0 {
                    let child = Landmark::ALL[child as usize];
                    assert_eq!(child.topology().parent, landmark.joint_index() as i32);
                }
            }
        }
    }

    #[test]
    fn test_tree_bones_follow_parents() {
        let tree = &BONE_PAIRS[..BONE_PAIRS.len() - BRACE_COUNT];
        for (parent, child) in tree {
            assert_eq!(child.topology().parent, parent.joint_index() as i32);
        }
    }

    #[test]
    fn test_neutral_frame() {
        let frame = neutral_frame();
        assert_eq!(frame.len(), LANDMARK_COUNT);
        assert_eq!(Head.extract(&frame), Vec3::new(0.0, 170.0, 0.0));
        assert_eq!(RightHand.extract(&frame), Vec3::new(-28.0, 80.0, 5.0));
    }
}
