// crates/sg_io/src/segy/format.rs

//! SEG-Y 字节序与采样格式
//!
//! - [`Endianness`]: 大端（标准）/小端，按字段宽度读写整数与浮点
//! - [`SampleFormat`]: 二进制头 3225 字节处的数据格式代码
//! - IBM System/360 浮点与 IEEE 浮点互转
//!
//! 采样值统一以 `f64` 保存，上述所有格式都能无损表示。

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IoError, IoResult};

/// 字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// 大端（SEG-Y 标准）
    #[default]
    Big,
    /// 小端
    Little,
}

impl Endianness {
    /// 读取 i8
    #[inline]
    pub fn read_i8(self, buf: &[u8]) -> i8 {
        buf[0] as i8
    }

    /// 读取 i16
    #[inline]
    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Self::Big => BigEndian::read_i16(buf),
            Self::Little => LittleEndian::read_i16(buf),
        }
    }

    /// 读取 u16
    #[inline]
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Self::Big => BigEndian::read_u16(buf),
            Self::Little => LittleEndian::read_u16(buf),
        }
    }

    /// 读取 i32
    #[inline]
    pub fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Self::Big => BigEndian::read_i32(buf),
            Self::Little => LittleEndian::read_i32(buf),
        }
    }

    /// 读取 u32
    #[inline]
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Big => BigEndian::read_u32(buf),
            Self::Little => LittleEndian::read_u32(buf),
        }
    }

    /// 读取 f32
    #[inline]
    pub fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Big => BigEndian::read_f32(buf),
            Self::Little => LittleEndian::read_f32(buf),
        }
    }

    /// 读取 f64
    #[inline]
    pub fn read_f64(self, buf: &[u8]) -> f64 {
        match self {
            Self::Big => BigEndian::read_f64(buf),
            Self::Little => LittleEndian::read_f64(buf),
        }
    }

    /// 写入 i16
    #[inline]
    pub fn write_i16(self, buf: &mut [u8], v: i16) {
        match self {
            Self::Big => BigEndian::write_i16(buf, v),
            Self::Little => LittleEndian::write_i16(buf, v),
        }
    }

    /// 写入 i32
    #[inline]
    pub fn write_i32(self, buf: &mut [u8], v: i32) {
        match self {
            Self::Big => BigEndian::write_i32(buf, v),
            Self::Little => LittleEndian::write_i32(buf, v),
        }
    }

    /// 写入 u32
    #[inline]
    pub fn write_u32(self, buf: &mut [u8], v: u32) {
        match self {
            Self::Big => BigEndian::write_u32(buf, v),
            Self::Little => LittleEndian::write_u32(buf, v),
        }
    }

    /// 写入 f32
    #[inline]
    pub fn write_f32(self, buf: &mut [u8], v: f32) {
        match self {
            Self::Big => BigEndian::write_f32(buf, v),
            Self::Little => LittleEndian::write_f32(buf, v),
        }
    }

    /// 写入 f64
    #[inline]
    pub fn write_f64(self, buf: &mut [u8], v: f64) {
        match self {
            Self::Big => BigEndian::write_f64(buf, v),
            Self::Little => LittleEndian::write_f64(buf, v),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// 数据采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 1: 4 字节 IBM 浮点
    IbmFloat32,
    /// 2: 4 字节有符号整数
    Int32,
    /// 3: 2 字节有符号整数
    Int16,
    /// 5: 4 字节 IEEE 浮点
    IeeeFloat32,
    /// 6: 8 字节 IEEE 浮点
    IeeeFloat64,
    /// 8: 1 字节有符号整数
    Int8,
}

impl SampleFormat {
    /// 由格式代码解析
    pub fn from_code(code: i32) -> IoResult<Self> {
        match code {
            1 => Ok(Self::IbmFloat32),
            2 => Ok(Self::Int32),
            3 => Ok(Self::Int16),
            5 => Ok(Self::IeeeFloat32),
            6 => Ok(Self::IeeeFloat64),
            8 => Ok(Self::Int8),
            _ => Err(IoError::UnsupportedSampleFormat { code }),
        }
    }

    /// 格式代码
    pub fn code(self) -> u16 {
        match self {
            Self::IbmFloat32 => 1,
            Self::Int32 => 2,
            Self::Int16 => 3,
            Self::IeeeFloat32 => 5,
            Self::IeeeFloat64 => 6,
            Self::Int8 => 8,
        }
    }

    /// 每个采样的字节数
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::IbmFloat32 | Self::Int32 | Self::IeeeFloat32 => 4,
            Self::Int16 => 2,
            Self::IeeeFloat64 => 8,
            Self::Int8 => 1,
        }
    }

    /// 格式名称
    pub fn name(self) -> &'static str {
        match self {
            Self::IbmFloat32 => "4-byte IBM float",
            Self::Int32 => "4-byte integer",
            Self::Int16 => "2-byte integer",
            Self::IeeeFloat32 => "4-byte IEEE float",
            Self::IeeeFloat64 => "8-byte IEEE float",
            Self::Int8 => "1-byte integer",
        }
    }

    /// 解码一道数据，追加到 `out`
    pub fn decode(self, endian: Endianness, bytes: &[u8], out: &mut Vec<f64>) {
        let step = self.bytes_per_sample();
        out.reserve(bytes.len() / step);
        for chunk in bytes.chunks_exact(step) {
            let v = match self {
                Self::IbmFloat32 => ibm_to_f64(endian.read_u32(chunk)),
                Self::Int32 => f64::from(endian.read_i32(chunk)),
                Self::Int16 => f64::from(endian.read_i16(chunk)),
                Self::IeeeFloat32 => f64::from(endian.read_f32(chunk)),
                Self::IeeeFloat64 => endian.read_f64(chunk),
                Self::Int8 => f64::from(endian.read_i8(chunk)),
            };
            out.push(v);
        }
    }

    /// 编码一道数据，追加到 `out`
    ///
    /// 整数格式四舍五入并饱和到类型范围。
    pub fn encode(self, endian: Endianness, samples: &[f64], out: &mut Vec<u8>) {
        let step = self.bytes_per_sample();
        let mut buf = [0u8; 8];
        out.reserve(samples.len() * step);
        for &v in samples {
            match self {
                Self::IbmFloat32 => endian.write_u32(&mut buf, f64_to_ibm(v)),
                Self::Int32 => endian.write_i32(&mut buf, v.round() as i32),
                Self::Int16 => endian.write_i16(&mut buf, v.round() as i16),
                Self::IeeeFloat32 => endian.write_f32(&mut buf, v as f32),
                Self::IeeeFloat64 => endian.write_f64(&mut buf, v),
                Self::Int8 => buf[0] = (v.round() as i8) as u8,
            }
            out.extend_from_slice(&buf[..step]);
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

/// IBM 浮点位模式转 f64
///
/// `value = (-1)^s * 0.mantissa * 16^(exp - 64)`，24 位尾数。
pub fn ibm_to_f64(bits: u32) -> f64 {
    let sign = if bits >> 31 == 1 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 24) & 0x7f) as i32;
    let mantissa = bits & 0x00ff_ffff;
    if mantissa == 0 {
        return 0.0;
    }
    sign * (f64::from(mantissa) / 16_777_216.0) * 16f64.powi(exponent - 64)
}

/// f64 转 IBM 浮点位模式
///
/// 超出 IBM 范围的值饱和到最大值，下溢为 0，NaN 写为 0。
pub fn f64_to_ibm(value: f64) -> u32 {
    if value == 0.0 || value.is_nan() {
        return 0;
    }
    let sign: u32 = if value < 0.0 { 0x8000_0000 } else { 0 };
    if value.is_infinite() {
        return sign | 0x7fff_ffff;
    }

    let mut frac = value.abs();
    let mut exponent: i32 = 64;
    while frac >= 1.0 {
        frac /= 16.0;
        exponent += 1;
    }
    while frac < 0.0625 {
        frac *= 16.0;
        exponent -= 1;
    }

    let mut mantissa = (frac * 16_777_216.0).round() as u32;
    if mantissa >= 0x0100_0000 {
        mantissa >>= 4;
        exponent += 1;
    }

    if exponent > 127 {
        return sign | 0x7fff_ffff;
    }
    if exponent < 0 {
        return 0;
    }
    sign | ((exponent as u32) << 24) | mantissa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ibm_known_patterns() {
        assert_eq!(ibm_to_f64(0xC276_A000), -118.625);
        assert_eq!(ibm_to_f64(0x4264_0000), 100.0);
        assert_eq!(ibm_to_f64(0x4110_0000), 1.0);
        assert_eq!(ibm_to_f64(0x0000_0000), 0.0);
        assert_eq!(ibm_to_f64(0x8000_0000), 0.0);
    }

    #[test]
    fn test_f64_to_ibm_known_patterns() {
        assert_eq!(f64_to_ibm(-118.625), 0xC276_A000);
        assert_eq!(f64_to_ibm(100.0), 0x4264_0000);
        assert_eq!(f64_to_ibm(1.0), 0x4110_0000);
        assert_eq!(f64_to_ibm(0.0), 0);
        assert_eq!(f64_to_ibm(f64::NAN), 0);
    }

    #[test]
    fn test_ibm_round_trip_exact_for_ibm_values() {
        for bits in [0x4110_0000u32, 0xC276_A000, 0x3F80_0001, 0x4A12_3456, 0xBE7F_FFFF] {
            assert_eq!(f64_to_ibm(ibm_to_f64(bits)), bits, "{bits:08x}");
        }
    }

    #[test]
    fn test_ibm_saturates() {
        assert_eq!(f64_to_ibm(1e300), 0x7fff_ffff);
        assert_eq!(f64_to_ibm(-1e300), 0xffff_ffff);
        assert_eq!(f64_to_ibm(1e-300), 0);
    }

    #[test]
    fn test_format_codes() {
        for code in [1, 2, 3, 5, 6, 8] {
            let fmt = SampleFormat::from_code(code).unwrap();
            assert_eq!(i32::from(fmt.code()), code);
        }
        assert!(matches!(
            SampleFormat::from_code(4),
            Err(IoError::UnsupportedSampleFormat { code: 4 })
        ));
    }

    #[test]
    fn test_encode_decode_each_format() {
        let samples = [0.0, 1.0, -2.0, 100.0, -118.625];
        for fmt in [
            SampleFormat::IbmFloat32,
            SampleFormat::Int32,
            SampleFormat::Int16,
            SampleFormat::IeeeFloat32,
            SampleFormat::IeeeFloat64,
            SampleFormat::Int8,
        ] {
            for endian in [Endianness::Big, Endianness::Little] {
                let mut bytes = Vec::new();
                fmt.encode(endian, &samples, &mut bytes);
                assert_eq!(bytes.len(), samples.len() * fmt.bytes_per_sample());

                let mut back = Vec::new();
                fmt.decode(endian, &bytes, &mut back);
                assert_eq!(back.len(), samples.len());
                assert_eq!(back[3], 100.0, "{fmt} {endian}");
            }
        }
    }

    #[test]
    fn test_int16_saturates() {
        let mut bytes = Vec::new();
        SampleFormat::Int16.encode(Endianness::Big, &[1e9], &mut bytes);
        assert_eq!(Endianness::Big.read_i16(&bytes), i16::MAX);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = [0u8; 4];
        Endianness::Big.write_i32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(Endianness::Little.read_i32(&buf), 0x0403_0201);
    }
}
