// crates/sg_workflow/src/report.rs

//! 运行报告

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use sg_foundation::ValidationReport;
use sg_geo::Point2D;
use sg_io::segy::FieldStats;

use crate::error::{WorkflowError, WorkflowResult};

/// 变化字段摘要
#[derive(Debug, Clone, Serialize)]
pub struct VaryingField {
    /// 字段名
    pub name: String,
    /// 字节号
    pub byte: u16,
    /// 最小值
    pub min: f64,
    /// 最大值
    pub max: f64,
    /// 标准差
    pub std: f64,
}

impl From<&FieldStats> for VaryingField {
    fn from(s: &FieldStats) -> Self {
        Self {
            name: s.name.to_string(),
            byte: s.byte,
            min: s.min,
            max: s.max,
            std: s.std,
        }
    }
}

/// 坐标重赋值运行报告
#[derive(Debug, Clone, Serialize)]
pub struct ReassignReport {
    /// 开始时间
    pub started_at: DateTime<Local>,
    /// 耗时（秒）
    pub elapsed_secs: f64,
    /// 输入 SEG-Y
    pub input: PathBuf,
    /// 测线 Shapefile
    pub shapefile: PathBuf,
    /// 选择条件 `field == value`
    pub selection: (String, String),
    /// 输出 SEG-Y
    pub output: PathBuf,
    /// 道数
    pub n_traces: usize,
    /// 每道采样点数
    pub n_samples: usize,
    /// 首末 CDP 号
    pub cdp_range: (i32, i32),
    /// 测线长度
    pub line_length: f64,
    /// 测线部分数
    pub line_parts: usize,
    /// 相邻 CDP 间距
    pub cdp_spacing: f64,
    /// 第一个 CDP 坐标
    pub first_point: Point2D,
    /// 最后一个 CDP 坐标
    pub last_point: Point2D,
    /// 写入的坐标比例因子
    pub scalar: i16,
    /// 输出采样格式代码
    pub sample_format: u16,
    /// 输入中变化的道头字段
    pub varying_before: Vec<VaryingField>,
    /// 输出中变化的道头字段
    pub varying_after: Vec<VaryingField>,
    /// 输出校验
    pub validation: ValidationReport,
    /// 额外生成的文件
    pub extra_outputs: Vec<PathBuf>,
}

impl ReassignReport {
    /// 写出 JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> WorkflowResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| WorkflowError::Report(e.to_string()))?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| WorkflowError::Report(format!("{}: {e}", path.as_ref().display())))
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[VaryingField]) -> fmt::Result {
    for v in fields {
        writeln!(
            f,
            "    {:<28} 字节 {:>3}  [{} .. {}]  std {:.3}",
            v.name, v.byte, v.min, v.max, v.std
        )?;
    }
    Ok(())
}

impl fmt::Display for ReassignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "坐标重赋值完成 ({:.2}s)", self.elapsed_secs)?;
        writeln!(f, "  输入:     {}", self.input.display())?;
        writeln!(
            f,
            "  测线:     {} [{} == \"{}\"]",
            self.shapefile.display(),
            self.selection.0,
            self.selection.1
        )?;
        writeln!(f, "  输出:     {}", self.output.display())?;
        writeln!(
            f,
            "  道数:     {} (CDP {}..{}), {} 采样/道",
            self.n_traces, self.cdp_range.0, self.cdp_range.1, self.n_samples
        )?;
        writeln!(
            f,
            "  测线长度: {:.3} ({} 段), CDP 间距 {:.3}",
            self.line_length, self.line_parts, self.cdp_spacing
        )?;
        writeln!(
            f,
            "  首点:     ({:.3}, {:.3})",
            self.first_point.x, self.first_point.y
        )?;
        writeln!(
            f,
            "  末点:     ({:.3}, {:.3})",
            self.last_point.x, self.last_point.y
        )?;
        writeln!(f, "  比例因子: {}", self.scalar)?;
        writeln!(f, "  输入变化字段:")?;
        write_fields(f, &self.varying_before)?;
        writeln!(f, "  输出变化字段:")?;
        write_fields(f, &self.varying_after)?;
        for extra in &self.extra_outputs {
            writeln!(f, "  附加输出: {}", extra.display())?;
        }
        write!(f, "{}", self.validation)
    }
}
