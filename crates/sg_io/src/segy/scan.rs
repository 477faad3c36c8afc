// crates/sg_io/src/segy/scan.rs

//! 道头扫描统计
//!
//! 对每个标准道头字段统计 count/mean/std/min/25%/50%/75%/max，
//! `std > 0` 的字段即在各道间变化的字段。

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::format::Endianness;
use super::reader::SegyReader;
use super::trace_header::{TraceHeader, TRACE_HEADER_FIELDS};
use crate::error::IoResult;

/// 默认扫描的道数
pub const DEFAULT_SCAN_TRACES: usize = 1000;

/// 单个字段的统计量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    /// 字段名
    pub name: &'static str,
    /// 起始字节号
    pub byte: u16,
    /// 宽度
    pub len: u8,
    /// 样本数
    pub count: usize,
    /// 均值
    pub mean: f64,
    /// 样本标准差 (n - 1)
    pub std: f64,
    /// 最小值
    pub min: f64,
    /// 25% 分位数
    pub p25: f64,
    /// 中位数
    pub p50: f64,
    /// 75% 分位数
    pub p75: f64,
    /// 最大值
    pub max: f64,
}

impl FieldStats {
    fn compute(name: &'static str, byte: u16, len: u8, values: &mut [f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                name,
                byte,
                len,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                p50: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }
        values.sort_by(f64::total_cmp);
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Self {
            name,
            byte,
            len,
            count,
            mean,
            std,
            min: values[0],
            p25: quantile(values, 0.25),
            p50: quantile(values, 0.5),
            p75: quantile(values, 0.75),
            max: values[count - 1],
        }
    }

    /// 各道间是否变化
    pub fn is_varying(&self) -> bool {
        self.std > 0.0
    }
}

/// 已排序数据的线性插值分位数
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// 道头扫描结果
#[derive(Debug, Clone, Serialize)]
pub struct HeaderScan {
    /// 文件路径
    pub path: PathBuf,
    /// 文件总道数
    pub total_traces: usize,
    /// 参与统计的道数
    pub scanned_traces: usize,
    /// 全部标准字段统计
    pub fields: Vec<FieldStats>,
}

impl HeaderScan {
    /// 由内存中的道头计算
    pub fn from_headers(
        path: impl Into<PathBuf>,
        total_traces: usize,
        headers: &[TraceHeader],
        endian: Endianness,
    ) -> Self {
        let mut columns: Vec<Vec<f64>> = TRACE_HEADER_FIELDS
            .iter()
            .map(|_| Vec::with_capacity(headers.len()))
            .collect();
        for h in headers {
            for (col, f) in columns.iter_mut().zip(TRACE_HEADER_FIELDS) {
                col.push(f64::from(h.field(endian, f)));
            }
        }
        let fields = TRACE_HEADER_FIELDS
            .iter()
            .zip(columns.iter_mut())
            .map(|(f, col)| FieldStats::compute(f.name, f.byte, f.len, col))
            .collect();
        Self {
            path: path.into(),
            total_traces,
            scanned_traces: headers.len(),
            fields,
        }
    }

    /// `std > 0` 的字段
    pub fn varying(&self) -> Vec<&FieldStats> {
        self.fields.iter().filter(|f| f.is_varying()).collect()
    }

    /// 按起始字节号取字段统计
    pub fn field(&self, byte: u16) -> Option<&FieldStats> {
        self.fields.iter().find(|f| f.byte == byte)
    }

    /// 按字段名取统计（忽略大小写）
    pub fn field_by_name(&self, name: &str) -> Option<&FieldStats> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// 以表格形式输出指定字段
    pub fn write_table(&self, f: &mut impl fmt::Write, fields: &[&FieldStats]) -> fmt::Result {
        writeln!(
            f,
            "{:<40} {:>5} {:>6} {:>14} {:>14} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "field", "byte", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for s in fields {
            writeln!(
                f,
                "{:<40} {:>5} {:>6} {:>14.3} {:>14.3} {:>12} {:>12} {:>12} {:>12} {:>12}",
                s.name, s.byte, s.count, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for HeaderScan {
    /// 只显示变化字段
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: 扫描 {}/{} 道",
            self.path.display(),
            self.scanned_traces,
            self.total_traces
        )?;
        self.write_table(f, &self.varying())
    }
}

/// 扫描文件前 `max_traces` 道的道头（`None` 扫描全部）
pub fn scan_headers(path: impl AsRef<Path>, max_traces: Option<usize>) -> IoResult<HeaderScan> {
    let path = path.as_ref();
    let mut reader = SegyReader::open(path)?;
    let headers = reader.headers(max_traces)?;
    let scan = HeaderScan::from_headers(path, reader.n_traces(), &headers, reader.endian());
    info!(
        "道头扫描: {} 道, {} 个字段变化",
        scan.scanned_traces,
        scan.varying().len()
    );
    Ok(scan)
}
