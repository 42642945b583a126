//! CSV 拓扑骨架
//!
//! - csv_parse: 单行 CSV 记录解析
//! - TopologyRig: 由记录构建、指针拖拽驱动的骨架

mod csv_parse;
mod rig;

pub use csv_parse::{parse_records, TopologyRecord};
pub use rig::{PointerEvent, TopologyRig};
