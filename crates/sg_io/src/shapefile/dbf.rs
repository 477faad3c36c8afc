// crates/sg_io/src/shapefile/dbf.rs

//! dBase III 属性表 (.dbf) 解析

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{IoError, IoResult};

/// 字段描述符长度
const DESCRIPTOR_LEN: usize = 32;
/// 字段描述区结束标记
const HEADER_TERMINATOR: u8 = 0x0D;
/// 删除标记
const DELETED: u8 = b'*';

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// C: 字符
    Character,
    /// N: 数值
    Numeric,
    /// F: 浮点
    Float,
    /// L: 逻辑
    Logical,
    /// D: 日期 YYYYMMDD
    Date,
    /// 其他类型，按文本读取
    Other(char),
}

impl FieldType {
    /// 由类型字符解析
    pub fn from_byte(b: u8) -> Self {
        match b {
            b'C' => Self::Character,
            b'N' => Self::Numeric,
            b'F' => Self::Float,
            b'L' => Self::Logical,
            b'D' => Self::Date,
            other => Self::Other(char::from(other)),
        }
    }

    /// 类型字符
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Float => b'F',
            Self::Logical => b'L',
            Self::Date => b'D',
            Self::Other(c) => u8::try_from(c).unwrap_or(b'C'),
        }
    }
}

/// 字段描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// 字段名
    pub name: String,
    /// 类型
    pub field_type: FieldType,
    /// 宽度（字节）
    pub length: u8,
    /// 小数位
    pub decimals: u8,
}

impl FieldDescriptor {
    /// 字符字段
    pub fn character(name: impl Into<String>, length: u8) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Character,
            length,
            decimals: 0,
        }
    }

    /// 数值字段
    pub fn numeric(name: impl Into<String>, length: u8, decimals: u8) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Numeric,
            length,
            decimals,
        }
    }
}

/// 属性值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 文本
    Text(String),
    /// 数值
    Number(f64),
    /// 逻辑值
    Logical(bool),
    /// 日期
    Date(NaiveDate),
    /// 空值
    Null,
}

impl FieldValue {
    /// 与字符串精确比较（去除首尾空白）
    ///
    /// 数值按数值比较，以便 `"19"` 匹配 `19.0`。
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::Text(s) => s.trim() == value,
            Self::Number(n) => value.parse::<f64>().map_or(false, |v| v == *n),
            Self::Logical(b) => match value.to_ascii_lowercase().as_str() {
                "true" | "t" | "y" | "yes" => *b,
                "false" | "f" | "n" | "no" => !*b,
                _ => false,
            },
            Self::Date(d) => d.format("%Y-%m-%d").to_string() == value
                || d.format("%Y%m%d").to_string() == value,
            Self::Null => value.is_empty(),
        }
    }

    /// 文本值
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 数值
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Logical(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Null => f.write_str(""),
        }
    }
}

/// 一条属性记录
#[derive(Debug, Clone, PartialEq)]
pub struct DbfRecord {
    /// 是否带删除标记
    pub deleted: bool,
    /// 字段名 → 值
    pub values: BTreeMap<String, FieldValue>,
}

/// .dbf 文件内容
#[derive(Debug, Clone)]
pub struct DbfTable {
    /// 字段描述
    pub fields: Vec<FieldDescriptor>,
    /// 记录（含删除记录，保持与 .shp 对齐）
    pub records: Vec<DbfRecord>,
}

/// 文本解码：UTF-8 优先，失败时按 Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    let trimmed: &[u8] = {
        let end = bytes
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(0, |i| i + 1);
        let start = bytes[..end]
            .iter()
            .position(|&b| b != b' ')
            .unwrap_or(end);
        &bytes[start..end]
    };
    match std::str::from_utf8(trimmed) {
        Ok(s) => s.to_string(),
        Err(_) => trimmed.iter().map(|&b| char::from(b)).collect(),
    }
}

fn parse_value(field: &FieldDescriptor, raw: &[u8]) -> FieldValue {
    let text = decode_text(raw);
    match field.field_type {
        FieldType::Character | FieldType::Other(_) => FieldValue::Text(text),
        FieldType::Numeric | FieldType::Float => {
            if text.is_empty() || text.chars().all(|c| c == '*' || c == '?') {
                FieldValue::Null
            } else {
                text.parse::<f64>()
                    .map_or(FieldValue::Text(text), FieldValue::Number)
            }
        }
        FieldType::Logical => match text.as_str() {
            "T" | "t" | "Y" | "y" => FieldValue::Logical(true),
            "F" | "f" | "N" | "n" => FieldValue::Logical(false),
            _ => FieldValue::Null,
        },
        FieldType::Date => NaiveDate::parse_from_str(&text, "%Y%m%d")
            .map_or(FieldValue::Null, FieldValue::Date),
    }
}

/// 读取 .dbf 文件
pub fn read_dbf(path: impl AsRef<Path>) -> IoResult<DbfTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let bytes = std::fs::read(path)?;
    parse_dbf(&bytes, &path.display().to_string())
}

/// 解析 .dbf 字节
pub fn parse_dbf(bytes: &[u8], name: &str) -> IoResult<DbfTable> {
    if bytes.len() < 32 {
        return Err(IoError::dbf(name, "文件头不足 32 字节"));
    }
    let n_records = LittleEndian::read_u32(&bytes[4..8]) as usize;
    let header_len = usize::from(LittleEndian::read_u16(&bytes[8..10]));
    let record_len = usize::from(LittleEndian::read_u16(&bytes[10..12]));
    if header_len > bytes.len() || header_len < 33 {
        return Err(IoError::dbf(name, format!("文件头长度无效: {header_len}")));
    }

    let mut fields = Vec::new();
    let mut pos = 32;
    while pos + DESCRIPTOR_LEN <= header_len && bytes[pos] != HEADER_TERMINATOR {
        let d = &bytes[pos..pos + DESCRIPTOR_LEN];
        let name_end = d[..11].iter().position(|&b| b == 0).unwrap_or(11);
        fields.push(FieldDescriptor {
            name: decode_text(&d[..name_end]),
            field_type: FieldType::from_byte(d[11]),
            length: d[16],
            decimals: d[17],
        });
        pos += DESCRIPTOR_LEN;
    }
    let field_total: usize = fields.iter().map(|f| usize::from(f.length)).sum();
    if field_total + 1 != record_len {
        return Err(IoError::dbf(
            name,
            format!("记录长度 {record_len} 与字段宽度之和 {} 不符", field_total + 1),
        ));
    }

    let mut records = Vec::with_capacity(n_records.min(bytes.len() / record_len.max(1)));
    for i in 0..n_records {
        let start = header_len + i * record_len;
        let end = start + record_len;
        if end > bytes.len() {
            return Err(IoError::dbf(
                name,
                format!("记录 {i} 截断 (声明 {n_records} 条)"),
            ));
        }
        let rec = &bytes[start..end];
        let mut values = BTreeMap::new();
        let mut off = 1;
        for f in &fields {
            let w = usize::from(f.length);
            values.insert(f.name.clone(), parse_value(f, &rec[off..off + w]));
            off += w;
        }
        records.push(DbfRecord {
            deleted: rec[0] == DELETED,
            values,
        });
    }

    tracing::debug!("{}: {} 个字段, {} 条记录", name, fields.len(), records.len());
    Ok(DbfTable { fields, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(fields: &[(&str, u8, u8)], rows: &[(u8, Vec<&str>)]) -> Vec<u8> {
        let header_len = 32 + fields.len() * 32 + 1;
        let record_len = 1 + fields.iter().map(|f| usize::from(f.2)).sum::<usize>();
        let mut buf = vec![0u8; 32];
        buf[0] = 3;
        LittleEndian::write_u32(&mut buf[4..8], rows.len() as u32);
        LittleEndian::write_u16(&mut buf[8..10], header_len as u16);
        LittleEndian::write_u16(&mut buf[10..12], record_len as u16);
        for (name, kind, len) in fields {
            let mut d = [0u8; 32];
            d[..name.len()].copy_from_slice(name.as_bytes());
            d[11] = *kind;
            d[16] = *len;
            buf.extend_from_slice(&d);
        }
        buf.push(HEADER_TERMINATOR);
        for (flag, values) in rows {
            buf.push(*flag);
            for ((_, _, len), v) in fields.iter().zip(values) {
                let mut cell = vec![b' '; usize::from(*len)];
                cell[..v.len()].copy_from_slice(v.as_bytes());
                buf.extend(cell);
            }
        }
        buf.push(0x1A);
        buf
    }

    #[test]
    fn test_parse_records() {
        let bytes = build(
            &[("N_PROF", b'C', 10), ("LEN", b'N', 8), ("OK", b'L', 1)],
            &[
                (b' ', vec!["PR_18", "1200.5", "T"]),
                (b'*', vec!["PR_19", "", "F"]),
                (b' ', vec!["PR_19", "980", "?"]),
            ],
        );
        let table = parse_dbf(&bytes, "mem.dbf").unwrap();
        assert_eq!(table.fields.len(), 3);
        assert_eq!(table.fields[0].name, "N_PROF");
        assert_eq!(table.records.len(), 3);
        assert!(table.records[1].deleted);
        assert_eq!(
            table.records[0].values["N_PROF"],
            FieldValue::Text("PR_18".into())
        );
        assert_eq!(table.records[0].values["LEN"], FieldValue::Number(1200.5));
        assert_eq!(table.records[1].values["LEN"], FieldValue::Null);
        assert_eq!(table.records[0].values["OK"], FieldValue::Logical(true));
        assert_eq!(table.records[2].values["OK"], FieldValue::Null);
    }

    #[test]
    fn test_record_length_mismatch() {
        let mut bytes = build(&[("A", b'C', 4)], &[(b' ', vec!["x"])]);
        LittleEndian::write_u16(&mut bytes[10..12], 9);
        assert!(matches!(
            parse_dbf(&bytes, "bad.dbf"),
            Err(IoError::DbfFormat { .. })
        ));
    }

    #[test]
    fn test_value_matching() {
        assert!(FieldValue::Text("PR_19".into()).matches(" PR_19 "));
        assert!(!FieldValue::Text("PR_19".into()).matches("PR_1"));
        assert!(FieldValue::Number(19.0).matches("19"));
        assert!(FieldValue::Logical(false).matches("F"));
        let d = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert!(FieldValue::Date(d).matches("2021-03-04"));
    }

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_text(b"  caf\xe9  "), "café");
        assert_eq!(decode_text("профиль".as_bytes()), "профиль");
        assert_eq!(decode_text(b"\0\0\0"), "");
    }
}
