// crates/sg_io/src/segy/profile.rs

//! 内存中的地震剖面
//!
//! 以 CDP 为道索引，保存头信息、道头、采样矩阵以及按 CDP 排列的坐标数组。

use std::collections::{BTreeMap, HashMap};

use super::binary_header::BinaryHeader;
use super::format::{Endianness, SampleFormat};
use super::textual::TextualHeader;
use super::trace_header::TraceHeader;
use crate::error::{IoError, IoResult};

/// CDP 坐标数组名（与道头映射一致）
pub const CDP_X: &str = "cdp_x";
/// CDP 坐标数组名（与道头映射一致）
pub const CDP_Y: &str = "cdp_y";

/// 地震剖面
#[derive(Debug, Clone)]
pub struct SeismicProfile {
    /// 文本头
    pub textual: TextualHeader,
    /// 二进制头
    pub binary: BinaryHeader,
    /// 扩展文本头（原样保留）
    pub extended: Vec<Vec<u8>>,
    /// 每道原始道头
    pub trace_headers: Vec<TraceHeader>,
    /// 字节序
    pub endian: Endianness,
    /// 采样格式
    pub format: SampleFormat,
    /// 采样间隔（微秒）
    pub sample_interval_us: u16,
    /// 延迟记录时间（毫秒，道头字节 109）
    pub delay_ms: i32,
    n_samples: usize,
    cdp: Vec<i32>,
    data: Vec<f64>,
    coords: BTreeMap<String, Vec<f64>>,
}

impl SeismicProfile {
    /// 新建剖面（生成标准头）
    ///
    /// `data` 按道优先排列，长度须为 `cdp.len() * n_samples`。
    pub fn new(
        cdp: Vec<i32>,
        n_samples: usize,
        sample_interval_us: u16,
        data: Vec<f64>,
    ) -> IoResult<Self> {
        let endian = Endianness::Big;
        let format = SampleFormat::IeeeFloat32;
        let ns = u16::try_from(n_samples).map_err(|_| {
            IoError::segy("<memory>", 0, format!("每道采样点数 {n_samples} 超过 65535"))
        })?;
        if data.len() != cdp.len() * n_samples {
            return Err(IoError::CoordinateLength {
                name: "data".into(),
                expected: cdp.len() * n_samples,
                actual: data.len(),
            });
        }

        let mut trace_headers = Vec::with_capacity(cdp.len());
        for (i, &c) in cdp.iter().enumerate() {
            let seq = i32::try_from(i + 1).unwrap_or(i32::MAX);
            let mut h = TraceHeader::default();
            h.set(endian, 1, 4, seq)?;
            h.set(endian, 5, 4, seq)?;
            h.set(endian, 21, 4, c)?;
            h.set(endian, 29, 2, 1)?;
            h.set(endian, 115, 2, i32::from(ns as i16))?;
            h.set(endian, 117, 2, i32::from(sample_interval_us as i16))?;
            h.set_coordinate_scalar(endian, 1);
            trace_headers.push(h);
        }

        Ok(Self {
            textual: TextualHeader::standard("SEISGEO SEISMIC PROFILE"),
            binary: BinaryHeader::new(endian, sample_interval_us, ns, format),
            extended: Vec::new(),
            trace_headers,
            endian,
            format,
            sample_interval_us,
            delay_ms: 0,
            n_samples,
            cdp,
            data,
            coords: BTreeMap::new(),
        })
    }

    /// 由读取器组装
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        textual: TextualHeader,
        binary: BinaryHeader,
        extended: Vec<Vec<u8>>,
        trace_headers: Vec<TraceHeader>,
        endian: Endianness,
        format: SampleFormat,
        n_samples: usize,
        cdp: Vec<i32>,
        data: Vec<f64>,
    ) -> Self {
        let sample_interval_us = binary.sample_interval(endian);
        let delay_ms = trace_headers
            .first()
            .and_then(|h| h.get(endian, 109, 2).ok())
            .unwrap_or(0);
        Self {
            textual,
            binary,
            extended,
            trace_headers,
            endian,
            format,
            sample_interval_us,
            delay_ms,
            n_samples,
            cdp,
            data,
            coords: BTreeMap::new(),
        }
    }

    /// 道数（CDP 数）
    pub fn n_traces(&self) -> usize {
        self.cdp.len()
    }

    /// 每道采样点数
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// CDP 编号
    pub fn cdp(&self) -> &[i32] {
        &self.cdp
    }

    /// 全部采样（道优先）
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// 第 `index` 道采样
    pub fn trace(&self, index: usize) -> Option<&[f64]> {
        if index >= self.n_traces() {
            return None;
        }
        let start = index * self.n_samples;
        Some(&self.data[start..start + self.n_samples])
    }

    /// 采样时间轴（毫秒）
    pub fn sample_times(&self) -> Vec<f64> {
        let dt = f64::from(self.sample_interval_us) / 1000.0;
        (0..self.n_samples)
            .map(|i| f64::from(self.delay_ms) + i as f64 * dt)
            .collect()
    }

    /// 挂接按 CDP 排列的坐标数组
    ///
    /// 长度必须等于 CDP 数，同名数组会被替换。
    pub fn assign_coords(&mut self, name: &str, values: Vec<f64>) -> IoResult<()> {
        if values.len() != self.n_traces() {
            return Err(IoError::CoordinateLength {
                name: name.to_string(),
                expected: self.n_traces(),
                actual: values.len(),
            });
        }
        self.coords.insert(name.to_string(), values);
        Ok(())
    }

    /// 同时挂接 `cdp_x` / `cdp_y`
    pub fn assign_xy(&mut self, x: Vec<f64>, y: Vec<f64>) -> IoResult<()> {
        if y.len() != self.n_traces() {
            return Err(IoError::CoordinateLength {
                name: CDP_Y.to_string(),
                expected: self.n_traces(),
                actual: y.len(),
            });
        }
        self.assign_coords(CDP_X, x)?;
        self.assign_coords(CDP_Y, y)
    }

    /// 读取坐标数组
    pub fn coord(&self, name: &str) -> IoResult<&[f64]> {
        self.coords
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| IoError::MissingCoordinate {
                name: name.to_string(),
            })
    }

    /// 是否存在坐标数组
    pub fn has_coord(&self, name: &str) -> bool {
        self.coords.contains_key(name)
    }

    /// 坐标数组名
    pub fn coord_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.coords.keys().map(String::as_str)
    }

    /// 重复出现的 CDP 编号及次数
    pub fn duplicate_cdps(&self) -> Vec<(i32, usize)> {
        let mut counts: HashMap<i32, usize> = HashMap::new();
        for &c in &self.cdp {
            *counts.entry(c).or_default() += 1;
        }
        let mut dups: Vec<(i32, usize)> = counts.into_iter().filter(|&(_, n)| n > 1).collect();
        dups.sort_unstable();
        dups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile(n: usize) -> SeismicProfile {
        let cdp: Vec<i32> = (1..=n as i32).collect();
        let data = vec![0.5; n * 4];
        SeismicProfile::new(cdp, 4, 2000, data).unwrap()
    }

    #[test]
    fn test_new_profile_headers() {
        let p = sample_profile(3);
        assert_eq!(p.n_traces(), 3);
        assert_eq!(p.trace_headers[2].cdp(p.endian), 3);
        assert_eq!(p.trace_headers[0].sample_count(p.endian), 4);
        assert_eq!(p.sample_times(), vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(p.trace(1).map(<[f64]>::len), Some(4));
        assert!(p.trace(3).is_none());
    }

    #[test]
    fn test_assign_coords_length_checked() {
        let mut p = sample_profile(5);
        let err = p.assign_coords(CDP_X, vec![0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            IoError::CoordinateLength { expected: 5, actual: 4, .. }
        ));
        assert!(!p.has_coord(CDP_X));

        p.assign_xy(vec![1.0; 5], vec![2.0; 5]).unwrap();
        assert_eq!(p.coord(CDP_Y).unwrap()[4], 2.0);
        assert_eq!(p.coord_names().collect::<Vec<_>>(), vec![CDP_X, CDP_Y]);
    }

    #[test]
    fn test_assign_xy_rejects_before_mutation() {
        let mut p = sample_profile(3);
        assert!(p.assign_xy(vec![1.0; 3], vec![2.0; 2]).is_err());
        assert!(!p.has_coord(CDP_X));
    }

    #[test]
    fn test_missing_coord() {
        let p = sample_profile(2);
        assert!(matches!(
            p.coord("cdp_x"),
            Err(IoError::MissingCoordinate { .. })
        ));
    }

    #[test]
    fn test_data_length_checked() {
        assert!(SeismicProfile::new(vec![1, 2], 4, 1000, vec![0.0; 7]).is_err());
    }

    #[test]
    fn test_duplicate_cdps() {
        let p = SeismicProfile::new(vec![1, 2, 2, 3, 3, 3], 1, 1000, vec![0.0; 6]).unwrap();
        assert_eq!(p.duplicate_cdps(), vec![(2, 2), (3, 3)]);
    }
}
