//! 单行 CSV 拓扑记录解析
//!
//! 记录之间以 '\r' 分隔（也接受 '\n'），字段以 ',' 分隔：
//! `id, parent, left, mid, right, name, degree`

use crate::{Result, RigError};

const COL_PARENT: usize = 1;
const COL_LEFT: usize = 2;
const COL_MID: usize = 3;
const COL_RIGHT: usize = 4;
const COL_NAME: usize = 5;
const COL_DEGREE: usize = 6;

/// 一条关节拓扑记录
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyRecord {
    /// 第 0 列
    pub id: String,
    pub name: String,
    /// 父关节索引 (-1 表示根)
    pub parent: i32,
    pub left_child: i32,
    pub mid_child: i32,
    pub right_child: i32,
    pub degree: i32,
}

impl TopologyRecord {
    /// 解析单条记录
    pub fn parse(record: usize, line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        Ok(Self {
            id: field(&fields, record, 0)?.to_string(),
            name: field(&fields, record, COL_NAME)?.to_string(),
            parent: required_int(&fields, record, COL_PARENT)?,
            left_child: optional_int(&fields, record, COL_LEFT)?,
            mid_child: optional_int(&fields, record, COL_MID)?,
            right_child: optional_int(&fields, record, COL_RIGHT)?,
            degree: required_int(&fields, record, COL_DEGREE)?,
        })
    }

    /// 子关节索引（左、中、右顺序，跳过 -1）
    pub fn children(&self) -> impl Iterator<Item = i32> + '_ {
        [self.left_child, self.mid_child, self.right_child]
            .into_iter()
            .filter(|&c| c >= 0)
    }
}

/// 解析全部记录，跳过空记录
///
/// 记录以 `\r`、`\n` 或 `\r\n` 分隔。错误中的记录序号是该记录在文件中的位置，
/// 空记录也计入序号。
pub fn parse_records(text: &str) -> Result<Vec<TopologyRecord>> {
    text.lines()
        .flat_map(|line| line.split('\r'))
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| TopologyRecord::parse(i, line))
        .collect()
}

fn field<'a>(fields: &[&'a str], record: usize, column: usize) -> Result<&'a str> {
    fields.get(column).copied().ok_or_else(|| RigError::CsvParse {
        record,
        column,
        value: String::new(),
    })
}

fn required_int(fields: &[&str], record: usize, column: usize) -> Result<i32> {
    let value = field(fields, record, column)?;
    value.parse::<i32>().map_err(|_| RigError::CsvParse {
        record,
        column,
        value: value.to_string(),
    })
}

/// 空字段表示 -1
fn optional_int(fields: &[&str], record: usize, column: usize) -> Result<i32> {
    if field(fields, record, column)?.is_empty() {
        Ok(-1)
    } else {
        required_int(fields, record, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let record = TopologyRecord::parse(0, "j1,0,2,,3,l_shoulder,21").unwrap();
        assert_eq!(record.id, "j1");
        assert_eq!(record.name, "l_shoulder");
        assert_eq!(record.parent, 0);
        assert_eq!(record.left_child, 2);
        assert_eq!(record.mid_child, -1);
        assert_eq!(record.right_child, 3);
        assert_eq!(record.degree, 21);
        assert_eq!(record.children().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_parse_records_separated_by_carriage_return() {
        let text = "j0,-1,1,,,head,0\rj1,0,,,,neck,10\r\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "head");
        assert_eq!(records[1].parent, 0);
        assert_eq!(records[1].left_child, -1);
    }

    #[test]
    fn test_non_numeric_field_is_error() {
        let err = parse_records("j0,-1,1,,,head,0\rj1,zero,,,,neck,10").unwrap_err();
        match err {
            RigError::CsvParse { record, column, value } => {
                assert_eq!(record, 1);
                assert_eq!(column, COL_PARENT);
                assert_eq!(value, "zero");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_reports_position_in_file() {
        let err = parse_records("j0,-1,1,,,head,0\r\rj1,zero,,,,neck,10").unwrap_err();
        assert!(matches!(err, RigError::CsvParse { record: 2, column: COL_PARENT, .. }));

        let err = parse_records("\r\nj0,-1,1,,,head,0\r\nj1,0,,,,neck,x\r\n").unwrap_err();
        assert!(matches!(err, RigError::CsvParse { record: 2, column: COL_DEGREE, .. }));
    }

    #[test]
    fn test_missing_column_is_error() {
        let err = TopologyRecord::parse(3, "j0,-1,1").unwrap_err();
        assert!(matches!(err, RigError::CsvParse { record: 3, .. }));
    }

    #[test]
    fn test_empty_degree_is_error() {
        assert!(TopologyRecord::parse(0, "j0,-1,,,,head,").is_err());
    }
}
