// crates/sg_workflow/src/verify.rs

//! 输出校验
//!
//! 重新扫描写出的文件：赋值后在各道间变化的坐标，其道头字段必须
//! `std > 0`；回读值与赋值之差不超过比例因子分辨率的一半。
//! 变化小于比例因子分辨率的坐标写出后本就相同，只记警告。

use std::path::Path;

use sg_foundation::{ValidationError, ValidationReport, ValidationWarning};
use sg_io::segy::{
    field_at, scale_factor, scan_headers, unscale, HeaderScan, SegyReader, SeismicProfile,
    TraceHeaderMap, CDP_KEY,
};
use sg_io::IoResult;
use tracing::{debug, info, warn};

/// 单个字段最多记录的不一致条数
const MAX_MISMATCHES_PER_FIELD: usize = 10;

/// 校验结果
#[derive(Debug, Clone)]
pub struct Verification {
    /// 输出道头扫描
    pub scan: HeaderScan,
    /// 校验报告
    pub report: ValidationReport,
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

fn varies(values: &[f64]) -> bool {
    values.windows(2).any(|w| w[0] != w[1])
}

fn field_name(byte: u16, fallback: &str) -> String {
    field_at(byte).map_or_else(|| fallback.to_string(), |f| f.name.to_string())
}

/// 校验写出的 SEG-Y
///
/// `profile` 为写出时的剖面，`map` 为写出时的道头映射。
/// `max_traces` 为 `None` 时扫描全部道。
pub fn verify_output(
    path: impl AsRef<Path>,
    profile: &SeismicProfile,
    map: &TraceHeaderMap,
    max_traces: Option<usize>,
) -> IoResult<Verification> {
    let path = path.as_ref();
    let scan = scan_headers(path, max_traces)?;
    let mut report = ValidationReport::new();

    let mut reader = SegyReader::open(path)?;
    if reader.n_traces() != profile.n_traces() {
        report.add_error(ValidationError::ConsistencyError {
            message: format!(
                "输出道数 {} 与剖面道数 {} 不一致",
                reader.n_traces(),
                profile.n_traces()
            ),
        });
        return Ok(Verification { scan, report });
    }
    let endian = reader.endian();
    let headers = reader.headers(max_traces)?;
    let checked = headers.len();

    for (name, byte, width) in map.entries() {
        let field = field_name(byte, name);
        let is_cdp = name == CDP_KEY && !profile.has_coord(CDP_KEY);
        let expected: Vec<f64> = if is_cdp {
            profile.cdp()[..checked].iter().map(|&c| f64::from(c)).collect()
        } else {
            profile.coord(name)?[..checked].to_vec()
        };

        let mut actual = Vec::with_capacity(checked);
        // 按道头比例因子量化后的期望值，即应写入的整数
        let mut quantized = Vec::with_capacity(checked);
        let mut tolerance = 0.0;
        for (h, e) in headers.iter().zip(&expected) {
            let stored = h.get(endian, byte, width)?;
            if is_cdp {
                actual.push(f64::from(stored));
                quantized.push(*e);
            } else {
                let scalar = h.coordinate_scalar(endian);
                tolerance = 0.5 / scale_factor(scalar) + 1e-9;
                actual.push(unscale(stored, scalar));
                quantized.push((e * scale_factor(scalar)).round());
            }
        }

        let mut mismatches = 0usize;
        for (trace, (e, a)) in expected.iter().zip(&actual).enumerate() {
            if (e - a).abs() > tolerance {
                mismatches += 1;
                if mismatches <= MAX_MISMATCHES_PER_FIELD {
                    report.add_error(ValidationError::HeaderMismatch {
                        field: field.clone(),
                        byte,
                        trace,
                        expected: *e,
                        actual: *a,
                    });
                }
            }
        }
        if mismatches > MAX_MISMATCHES_PER_FIELD {
            report.add_error(ValidationError::Custom {
                message: format!(
                    "{field}(字节{byte}) 另有 {} 道不一致",
                    mismatches - MAX_MISMATCHES_PER_FIELD
                ),
            });
        }

        if varies(&quantized) {
            let std = scan
                .field(byte)
                .map_or_else(|| sample_std(&actual), |s| s.std);
            if std > 0.0 {
                debug!("{} (字节 {}) std = {:.3}", field, byte, std);
            } else {
                report.add_error(ValidationError::ConstantField {
                    field: field.clone(),
                    byte,
                });
            }
        } else if varies(&expected) {
            report.add_warning(ValidationWarning::QualityWarning {
                message: format!("{name} 的变化小于比例因子分辨率，写出后各道相同"),
                trace: None,
            });
        } else if !is_cdp {
            report.add_warning(ValidationWarning::QualityWarning {
                message: format!("{name} 在所有道上取值相同"),
                trace: None,
            });
        }
    }

    for (value, count) in profile.duplicate_cdps() {
        report.add_warning(ValidationWarning::DuplicateValue {
            field: CDP_KEY.to_string(),
            value: i64::from(value),
            count,
        });
    }

    if report.is_valid() {
        info!(
            "输出校验通过: {} 道, {} 个映射字段, {} 条警告",
            checked,
            map.len(),
            report.warning_count()
        );
    } else {
        warn!("输出校验发现 {} 个错误", report.error_count());
    }
    Ok(Verification { scan, report })
}
