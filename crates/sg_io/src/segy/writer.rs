// crates/sg_io/src/segy/writer.rs

//! SEG-Y 写出
//!
//! 保留输入的文本头、二进制头、扩展文本头和原始道头，只改写
//! [`TraceHeaderMap`] 中映射的字段以及字节 71 的坐标比例因子。
//! 比例因子改变时，未映射的坐标字段（73/77/81/85/181/185）按新比例因子重新编码，
//! 保持其实际值不变。
//!
//! 写入先落到同目录的临时文件，完成后原子重命名；失败时删除临时文件。

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::format::SampleFormat;
use super::profile::{SeismicProfile, CDP_X, CDP_Y};
use super::reader::unscale;
use super::trace_header::{
    field_at, field_width, COORDINATE_SCALAR_BYTE, SCALED_COORDINATE_BYTES, TRACE_HEADER_LEN,
};
use crate::error::{IoError, IoResult};

/// CDP 编号的映射名
pub const CDP_KEY: &str = "cdp";

/// 自动比例因子允许的最大除数
const MAX_AUTO_DIVISOR: i16 = 10_000;

/// 文本头中的来源说明行（C39）
const PROVENANCE_CARD: usize = 38;

/// 坐标数组名到道头字节号（从 1 开始）的映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceHeaderMap {
    entries: BTreeMap<String, u16>,
}

impl Default for TraceHeaderMap {
    /// `{cdp: 21, cdp_x: 73, cdp_y: 77}`
    fn default() -> Self {
        let entries = [(CDP_KEY, 21u16), (CDP_X, 73), (CDP_Y, 77)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self { entries }
    }
}

impl TraceHeaderMap {
    /// 由 (名称, 字节号) 构建并校验
    pub fn from_entries<I, S>(entries: I) -> IoResult<Self>
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        let map = Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        };
        map.validate()?;
        Ok(map)
    }

    /// 字段宽度：标准字段取表中宽度，其余按 4 字节
    pub fn width_of(byte: u16) -> u8 {
        field_width(byte)
    }

    /// 映射的字节号
    pub fn get(&self, name: &str) -> Option<u16> {
        self.entries.get(name).copied()
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (名称, 字节号, 宽度)
    pub fn entries(&self) -> impl Iterator<Item = (&str, u16, u8)> + '_ {
        self.entries
            .iter()
            .map(|(k, &b)| (k.as_str(), b, Self::width_of(b)))
    }

    /// 需要乘比例因子的坐标条目（除 `cdp` 以外）
    pub fn coordinates(&self) -> impl Iterator<Item = (&str, u16, u8)> + '_ {
        self.entries().filter(|(k, _, _)| *k != CDP_KEY)
    }

    /// 未被映射覆盖、需原样保留实际值的坐标字段字节号
    pub fn carried_coordinates(&self) -> Vec<u16> {
        let spans: Vec<(u16, u16)> = self
            .entries()
            .map(|(_, b, w)| (b, b.saturating_add(u16::from(w)) - 1))
            .collect();
        SCALED_COORDINATE_BYTES
            .iter()
            .copied()
            .filter(|&b| spans.iter().all(|&(s, e)| b + 3 < s || b > e))
            .collect()
    }

    /// 校验字节范围与字段重叠
    pub fn validate(&self) -> IoResult<()> {
        let mut spans: Vec<(&str, u16, u16)> = Vec::with_capacity(self.entries.len());
        for (name, byte, width) in self.entries() {
            let last = byte.saturating_add(u16::from(width)) - 1;
            if byte == 0 || usize::from(last) > TRACE_HEADER_LEN {
                return Err(IoError::InvalidHeaderByte {
                    name: name.to_string(),
                    byte,
                    reason: format!("须在 1..={} 且字段不越界", TRACE_HEADER_LEN),
                });
            }
            if byte <= COORDINATE_SCALAR_BYTE + 1 && last >= COORDINATE_SCALAR_BYTE {
                return Err(IoError::InvalidHeaderByte {
                    name: name.to_string(),
                    byte,
                    reason: "与坐标比例因子 (字节 71-72) 重叠".into(),
                });
            }
            if let Some((other, _, _)) = spans.iter().find(|(_, s, e)| byte <= *e && last >= *s) {
                return Err(IoError::InvalidHeaderByte {
                    name: name.to_string(),
                    byte,
                    reason: format!("与 {other} 重叠"),
                });
            }
            spans.push((name, byte, last));
        }
        Ok(())
    }
}

/// 坐标比例因子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateScalar {
    /// 自动选择
    #[default]
    Auto,
    /// 固定值（SEG-Y 约定：负值为除数）
    Fixed(i16),
}

/// 写入道头前乘的系数
pub fn scale_factor(scalar: i16) -> f64 {
    match scalar {
        0 | 1 => 1.0,
        s if s < 0 => f64::from(s).abs(),
        s => 1.0 / f64::from(s),
    }
}

fn fits(value: f64, width: u8) -> bool {
    let (lo, hi) = match width {
        2 => (f64::from(i16::MIN), f64::from(i16::MAX)),
        _ => (f64::from(i32::MIN), f64::from(i32::MAX)),
    };
    value.is_finite() && value.round() >= lo && value.round() <= hi
}

/// 自动选择比例因子
///
/// 先取不越界的最大 10 的幂除数（至多 10000），都不行再尝试正乘数。
pub fn choose_scalar(values: &[(&[f64], u8)]) -> IoResult<i16> {
    let fits_all = |scalar: i16| {
        let k = scale_factor(scalar);
        values
            .iter()
            .all(|(vs, w)| vs.iter().all(|&v| fits(v * k, *w)))
    };

    let mut divisor = MAX_AUTO_DIVISOR;
    while divisor > 1 {
        if fits_all(-divisor) {
            return Ok(-divisor);
        }
        divisor /= 10;
    }
    let mut multiplier = 1i16;
    while multiplier <= MAX_AUTO_DIVISOR {
        if fits_all(multiplier) {
            return Ok(multiplier);
        }
        multiplier = multiplier.saturating_mul(10);
    }

    let (worst, width) = values
        .iter()
        .flat_map(|(vs, w)| vs.iter().map(move |v| (*v, *w)))
        .find(|(v, w)| !fits(v / f64::from(MAX_AUTO_DIVISOR), *w))
        .unwrap_or((f64::NAN, 4));
    Err(IoError::HeaderValueOverflow {
        name: "auto scalar".into(),
        trace: 0,
        value: worst,
        width,
    })
}

/// 写出结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct WriteSummary {
    /// 输出路径
    pub path: PathBuf,
    /// 道数
    pub n_traces: usize,
    /// 写入的坐标比例因子
    pub scalar: i16,
    /// 输出采样格式
    pub format: SampleFormat,
    /// 文件字节数
    pub bytes_written: u64,
    /// 写入的道头字段 (名称, 字节号, 宽度)
    pub fields: Vec<(String, u16, u8)>,
}

/// SEG-Y 写出器
#[derive(Debug, Clone, Default)]
pub struct SegyWriter {
    map: TraceHeaderMap,
    scalar: CoordinateScalar,
    format: Option<SampleFormat>,
    provenance: Option<String>,
}

impl SegyWriter {
    /// 新建写出器
    pub fn new(map: TraceHeaderMap) -> Self {
        Self {
            map,
            ..Self::default()
        }
    }

    /// 设置坐标比例因子
    pub fn with_scalar(mut self, scalar: CoordinateScalar) -> Self {
        self.scalar = scalar;
        self
    }

    /// 设置输出采样格式（默认与输入相同）
    pub fn with_format(mut self, format: SampleFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// 在文本头 C39 行写入来源说明
    pub fn with_provenance(mut self, text: impl Into<String>) -> Self {
        self.provenance = Some(text.into());
        self
    }

    /// 道头映射
    pub fn map(&self) -> &TraceHeaderMap {
        &self.map
    }

    fn resolve_scalar(&self, profile: &SeismicProfile, carried: &[(u16, Vec<f64>)]) -> IoResult<i16> {
        match self.scalar {
            CoordinateScalar::Fixed(s) => Ok(s),
            CoordinateScalar::Auto => {
                let mut columns = Vec::new();
                for (name, _, width) in self.map.coordinates() {
                    columns.push((profile.coord(name)?, width));
                }
                if columns.is_empty() {
                    return Ok(1);
                }
                columns.extend(carried.iter().map(|(_, vs)| (vs.as_slice(), 4u8)));
                choose_scalar(&columns)
            }
        }
    }

    /// 未映射坐标字段按各道原比例因子解出的实际值
    fn carried_values(&self, profile: &SeismicProfile) -> IoResult<Vec<(u16, Vec<f64>)>> {
        let endian = profile.endian;
        self.map
            .carried_coordinates()
            .into_iter()
            .map(|byte| -> IoResult<(u16, Vec<f64>)> {
                let values = profile
                    .trace_headers
                    .iter()
                    .map(|h| {
                        h.get(endian, byte, 4)
                            .map(|v| unscale(v, h.coordinate_scalar(endian)))
                    })
                    .collect::<IoResult<Vec<f64>>>()?;
                Ok((byte, values))
            })
            .collect()
    }

    /// 写出剖面
    pub fn write(&self, profile: &SeismicProfile, path: impl AsRef<Path>) -> IoResult<WriteSummary> {
        self.map.validate()?;
        let path = path.as_ref();
        let endian = profile.endian;
        let format = self.format.unwrap_or(profile.format);
        let has_coords = self.map.coordinates().next().is_some();
        let carried = if has_coords {
            self.carried_values(profile)?
        } else {
            Vec::new()
        };
        let scalar = self.resolve_scalar(profile, &carried)?;
        let factor = scale_factor(scalar);

        // 先把所有道头算好，出错时不留下任何文件
        let mut headers = profile.trace_headers.clone();
        for (name, byte, width) in self.map.entries() {
            let values: Vec<f64> = if name == CDP_KEY && !profile.has_coord(CDP_KEY) {
                profile.cdp().iter().map(|&c| f64::from(c)).collect()
            } else {
                profile.coord(name)?.iter().map(|v| v * factor).collect()
            };
            for (trace, (header, value)) in headers.iter_mut().zip(values).enumerate() {
                if !fits(value, width) {
                    return Err(IoError::HeaderValueOverflow {
                        name: name.to_string(),
                        trace,
                        value,
                        width,
                    });
                }
                header.set(endian, byte, width, value.round() as i32)?;
            }
            debug!("写入 {} -> 字节 {} ({} 字节)", name, byte, width);
        }
        if has_coords {
            let mut reencoded = 0usize;
            for (trace, header) in headers.iter_mut().enumerate() {
                let old = header.coordinate_scalar(endian);
                if !carried.is_empty() && scale_factor(old) != factor {
                    reencoded += 1;
                    for (byte, values) in &carried {
                        let value = values[trace] * factor;
                        if !fits(value, 4) {
                            return Err(IoError::HeaderValueOverflow {
                                name: field_at(*byte).map_or("?", |f| f.name).to_string(),
                                trace,
                                value,
                                width: 4,
                            });
                        }
                        header.set(endian, *byte, 4, value.round() as i32)?;
                    }
                }
                header.set_coordinate_scalar(endian, scalar);
            }
            if reencoded > 0 {
                debug!("{} 道的未映射坐标字段按比例因子 {} 重新编码", reencoded, scalar);
            }
        }
        for name in profile.coord_names() {
            if self.map.get(name).is_none() {
                debug!("坐标 {} 未映射到道头，跳过", name);
            }
        }

        let mut textual = profile.textual.clone();
        if let Some(text) = &self.provenance {
            textual.set_line(PROVENANCE_CARD, &format!("C39 {text}"));
        }
        let mut binary = profile.binary.clone();
        if format != profile.format {
            binary.set_format(endian, format);
            info!("采样格式 {} -> {}", profile.format, format);
        }

        let tmp_path = path.with_extension("sgy.tmp");
        let write_tmp = || -> IoResult<u64> {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(textual.as_bytes())?;
            writer.write_all(binary.as_bytes())?;
            for block in &profile.extended {
                writer.write_all(block)?;
            }
            let mut buf = Vec::with_capacity(profile.n_samples() * format.bytes_per_sample());
            for (i, header) in headers.iter().enumerate() {
                writer.write_all(header.as_bytes())?;
                buf.clear();
                if let Some(samples) = profile.trace(i) {
                    format.encode(endian, samples, &mut buf);
                }
                writer.write_all(&buf)?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
            let len = writer.get_ref().metadata()?.len();
            drop(writer);
            fs::rename(&tmp_path, path)?;
            Ok(len)
        };
        let bytes_written = match write_tmp() {
            Ok(len) => len,
            Err(err) => {
                if tmp_path.exists() {
                    if let Err(e) = fs::remove_file(&tmp_path) {
                        warn!("无法删除临时文件 {}: {}", tmp_path.display(), e);
                    }
                }
                return Err(err);
            }
        };

        info!(
            "写出 SEG-Y: {} ({} 道, 比例因子 {}, {} 字节)",
            path.display(),
            profile.n_traces(),
            scalar,
            bytes_written
        );

        Ok(WriteSummary {
            path: path.to_path_buf(),
            n_traces: profile.n_traces(),
            scalar,
            format,
            bytes_written,
            fields: self
                .map
                .entries()
                .map(|(n, b, w)| (n.to_string(), b, w))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segy::reader::{unscale, ProfileLoader, SegyReader};

    #[test]
    fn test_default_map() {
        let map = TraceHeaderMap::default();
        assert_eq!(map.get("cdp"), Some(21));
        assert_eq!(map.get("cdp_x"), Some(73));
        assert_eq!(map.get("cdp_y"), Some(77));
        assert_eq!(map.coordinates().count(), 2);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_map_rejects_overlap_and_bounds() {
        assert!(TraceHeaderMap::from_entries([("cdp_x", 73u16), ("cdp_y", 75)]).is_err());
        assert!(TraceHeaderMap::from_entries([("cdp_x", 70u16)]).is_err());
        assert!(TraceHeaderMap::from_entries([("cdp_x", 239u16)]).is_err());
        assert!(TraceHeaderMap::from_entries([("cdp_x", 0u16)]).is_err());
        assert!(TraceHeaderMap::from_entries([("cdp_x", 181u16), ("cdp_y", 185)]).is_ok());
    }

    #[test]
    fn test_width_from_table() {
        assert_eq!(TraceHeaderMap::width_of(73), 4);
        assert_eq!(TraceHeaderMap::width_of(115), 2);
        assert_eq!(TraceHeaderMap::width_of(74), 4);
    }

    #[test]
    fn test_choose_scalar() {
        let small = [100.25, 200.5];
        assert_eq!(choose_scalar(&[(&small, 4)]).unwrap(), -10_000);

        let utm = [512_345.67, 6_543_210.12];
        assert_eq!(choose_scalar(&[(&utm, 4)]).unwrap(), -100);

        let huge = [5.0e12];
        assert_eq!(choose_scalar(&[(&huge, 4)]).unwrap(), 10_000);

        let impossible = [1.0e20];
        assert!(choose_scalar(&[(&impossible, 4)]).is_err());
    }

    #[test]
    fn test_scale_factor_inverts_unscale() {
        for s in [-1000i16, -10, 1, 10] {
            let stored = (123_456.0 * scale_factor(s)).round() as i32;
            let back = unscale(stored, s);
            assert!((back - 123_456.0).abs() <= 0.5 * f64::from(s).abs().max(1.0));
        }
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sgy");

        let n = 8;
        let cdp: Vec<i32> = (100..100 + n as i32).collect();
        let data: Vec<f64> = (0..n * 5).map(|i| i as f64 * 0.25).collect();
        let mut profile = SeismicProfile::new(cdp.clone(), 5, 4000, data.clone()).unwrap();
        let xs: Vec<f64> = (0..n).map(|i| 500_000.0 + i as f64 * 12.5).collect();
        let ys: Vec<f64> = (0..n).map(|i| 6_000_000.0 - i as f64 * 3.75).collect();
        profile.assign_xy(xs.clone(), ys.clone()).unwrap();

        let summary = SegyWriter::new(TraceHeaderMap::default())
            .with_provenance("COORDINATES FROM PR_19")
            .write(&profile, &path)
            .unwrap();
        assert_eq!(summary.n_traces, n);
        assert_eq!(summary.scalar, -100);
        assert!(!path.with_extension("sgy.tmp").exists());

        let reader = SegyReader::open(&path).unwrap();
        assert_eq!(reader.n_traces(), n);
        assert!(reader.textual().lines()[38].starts_with("C39 COORDINATES FROM PR_19"));

        let loaded = ProfileLoader::new()
            .with_coordinates(73, 77)
            .load(&path)
            .unwrap();
        assert_eq!(loaded.cdp(), cdp.as_slice());
        assert_eq!(loaded.data(), data.as_slice());
        for (a, b) in loaded.coord("cdp_x").unwrap().iter().zip(&xs) {
            assert!((a - b).abs() < 0.005 + 1e-9);
        }
        for (a, b) in loaded.coord("cdp_y").unwrap().iter().zip(&ys) {
            assert!((a - b).abs() < 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_missing_coordinate_errors_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sgy");
        let profile = SeismicProfile::new(vec![1, 2], 1, 1000, vec![0.0; 2]).unwrap();
        let err = SegyWriter::default().write(&profile, &path).unwrap_err();
        assert!(matches!(err, IoError::MissingCoordinate { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_fixed_scalar_overflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sgy");
        let mut profile = SeismicProfile::new(vec![1, 2], 1, 1000, vec![0.0; 2]).unwrap();
        profile
            .assign_xy(vec![5_000_000.0, 5_000_001.0], vec![0.0, 1.0])
            .unwrap();
        let err = SegyWriter::new(TraceHeaderMap::default())
            .with_scalar(CoordinateScalar::Fixed(-1000))
            .write(&profile, &path)
            .unwrap_err();
        assert!(matches!(err, IoError::HeaderValueOverflow { trace: 0, .. }));
    }
    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sgy");
        // 目标是目录，重命名失败
        fs::create_dir(&path).unwrap();
        let mut profile = SeismicProfile::new(vec![1, 2], 1, 1000, vec![0.0; 2]).unwrap();
        profile.assign_xy(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();

        let result = SegyWriter::new(TraceHeaderMap::default()).write(&profile, &path);
        assert!(matches!(result, Err(IoError::Io(_))));
        assert!(!path.with_extension("sgy.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_carried_coordinates_skip_mapped_bytes() {
        assert_eq!(TraceHeaderMap::default().carried_coordinates(), vec![81, 85, 181, 185]);
        let map = TraceHeaderMap::from_entries([("cdp", 21u16), ("cdp_x", 181), ("cdp_y", 187)])
            .unwrap();
        assert_eq!(map.carried_coordinates(), vec![73, 77, 81, 85]);
    }
}
