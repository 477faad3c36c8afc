// crates/sg_io/src/segy/trace_header.rs

//! SEG-Y 240 字节道头
//!
//! 字段表沿用 SEG-Y rev1 标准字段名（与常见开源读写库一致），
//! 字节号从 1 开始，与文档及 `trace_header_map` 配置一致。

use super::format::Endianness;
use crate::error::{IoError, IoResult};

/// 道头字节数
pub const TRACE_HEADER_LEN: usize = 240;

/// 道头字段定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderField {
    /// 标准字段名
    pub name: &'static str,
    /// 起始字节号（从 1 开始）
    pub byte: u16,
    /// 宽度（2 或 4）
    pub len: u8,
}

const fn hf(name: &'static str, byte: u16, len: u8) -> HeaderField {
    HeaderField { name, byte, len }
}

/// 标准道头字段表，按字节号排列，恰好覆盖 240 字节
pub const TRACE_HEADER_FIELDS: &[HeaderField] = &[
    hf("TRACE_SEQUENCE_LINE", 1, 4),
    hf("TRACE_SEQUENCE_FILE", 5, 4),
    hf("FieldRecord", 9, 4),
    hf("TraceNumber", 13, 4),
    hf("EnergySourcePoint", 17, 4),
    hf("CDP", 21, 4),
    hf("CDP_TRACE", 25, 4),
    hf("TraceIdentificationCode", 29, 2),
    hf("NSummedTraces", 31, 2),
    hf("NStackedTraces", 33, 2),
    hf("DataUse", 35, 2),
    hf("offset", 37, 4),
    hf("ReceiverGroupElevation", 41, 4),
    hf("SourceSurfaceElevation", 45, 4),
    hf("SourceDepth", 49, 4),
    hf("ReceiverDatumElevation", 53, 4),
    hf("SourceDatumElevation", 57, 4),
    hf("SourceWaterDepth", 61, 4),
    hf("GroupWaterDepth", 65, 4),
    hf("ElevationScalar", 69, 2),
    hf("SourceGroupScalar", 71, 2),
    hf("SourceX", 73, 4),
    hf("SourceY", 77, 4),
    hf("GroupX", 81, 4),
    hf("GroupY", 85, 4),
    hf("CoordinateUnits", 89, 2),
    hf("WeatheringVelocity", 91, 2),
    hf("SubWeatheringVelocity", 93, 2),
    hf("SourceUpholeTime", 95, 2),
    hf("GroupUpholeTime", 97, 2),
    hf("SourceStaticCorrection", 99, 2),
    hf("GroupStaticCorrection", 101, 2),
    hf("TotalStaticApplied", 103, 2),
    hf("LagTimeA", 105, 2),
    hf("LagTimeB", 107, 2),
    hf("DelayRecordingTime", 109, 2),
    hf("MuteTimeStart", 111, 2),
    hf("MuteTimeEND", 113, 2),
    hf("TRACE_SAMPLE_COUNT", 115, 2),
    hf("TRACE_SAMPLE_INTERVAL", 117, 2),
    hf("GainType", 119, 2),
    hf("InstrumentGainConstant", 121, 2),
    hf("InstrumentInitialGain", 123, 2),
    hf("Correlated", 125, 2),
    hf("SweepFrequencyStart", 127, 2),
    hf("SweepFrequencyEnd", 129, 2),
    hf("SweepLength", 131, 2),
    hf("SweepType", 133, 2),
    hf("SweepTraceTaperLengthStart", 135, 2),
    hf("SweepTraceTaperLengthEnd", 137, 2),
    hf("TaperType", 139, 2),
    hf("AliasFilterFrequency", 141, 2),
    hf("AliasFilterSlope", 143, 2),
    hf("NotchFilterFrequency", 145, 2),
    hf("NotchFilterSlope", 147, 2),
    hf("LowCutFrequency", 149, 2),
    hf("HighCutFrequency", 151, 2),
    hf("LowCutSlope", 153, 2),
    hf("HighCutSlope", 155, 2),
    hf("YearDataRecorded", 157, 2),
    hf("DayOfYear", 159, 2),
    hf("HourOfDay", 161, 2),
    hf("MinuteOfHour", 163, 2),
    hf("SecondOfMinute", 165, 2),
    hf("TimeBaseCode", 167, 2),
    hf("TraceWeightingFactor", 169, 2),
    hf("GeophoneGroupNumberRoll1", 171, 2),
    hf("GeophoneGroupNumberFirstTraceOrigField", 173, 2),
    hf("GeophoneGroupNumberLastTraceOrigField", 175, 2),
    hf("GapSize", 177, 2),
    hf("OverTravel", 179, 2),
    hf("CDP_X", 181, 4),
    hf("CDP_Y", 185, 4),
    hf("INLINE_3D", 189, 4),
    hf("CROSSLINE_3D", 193, 4),
    hf("ShotPoint", 197, 4),
    hf("ShotPointScalar", 201, 2),
    hf("TraceValueMeasurementUnit", 203, 2),
    hf("TransductionConstantMantissa", 205, 4),
    hf("TransductionConstantPower", 209, 2),
    hf("TransductionUnit", 211, 2),
    hf("TraceIdentifier", 213, 2),
    hf("ScalarTraceHeader", 215, 2),
    hf("SourceType", 217, 2),
    hf("SourceEnergyDirectionMantissa", 219, 4),
    hf("SourceEnergyDirectionExponent", 223, 2),
    hf("SourceMeasurementMantissa", 225, 4),
    hf("SourceMeasurementExponent", 229, 2),
    hf("SourceMeasurementUnit", 231, 2),
    hf("UnassignedInt1", 233, 4),
    hf("UnassignedInt2", 237, 4),
];

/// 坐标比例因子字段（字节 71）
pub const COORDINATE_SCALAR_BYTE: u16 = 71;
/// 受字节 71 比例因子约束的坐标字段（均为 4 字节）
pub const SCALED_COORDINATE_BYTES: [u16; 6] = [73, 77, 81, 85, 181, 185];
/// 道头中的每道采样点数（字节 115）
pub const SAMPLE_COUNT_BYTE: u16 = 115;
/// 道头中的采样间隔（字节 117）
pub const SAMPLE_INTERVAL_BYTE: u16 = 117;

/// 按起始字节号查找字段
pub fn field_at(byte: u16) -> Option<&'static HeaderField> {
    TRACE_HEADER_FIELDS
        .binary_search_by_key(&byte, |f| f.byte)
        .ok()
        .map(|i| &TRACE_HEADER_FIELDS[i])
}

/// 字段宽度：标准字段取表中宽度，其余按 4 字节
pub fn field_width(byte: u16) -> u8 {
    field_at(byte).map_or(4, |f| f.len)
}

/// 按字段名查找（忽略大小写）
pub fn field_by_name(name: &str) -> Option<&'static HeaderField> {
    TRACE_HEADER_FIELDS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

/// 单道道头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceHeader {
    bytes: [u8; TRACE_HEADER_LEN],
}

impl Default for TraceHeader {
    fn default() -> Self {
        Self {
            bytes: [0u8; TRACE_HEADER_LEN],
        }
    }
}

impl TraceHeader {
    /// 由原始 240 字节构建
    pub fn from_bytes(bytes: [u8; TRACE_HEADER_LEN]) -> Self {
        Self { bytes }
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8; TRACE_HEADER_LEN] {
        &self.bytes
    }

    fn span(byte: u16, len: u8) -> IoResult<std::ops::Range<usize>> {
        if byte == 0 || !matches!(len, 2 | 4) {
            return Err(IoError::InvalidHeaderByte {
                name: format!("{len} 字节字段"),
                byte,
                reason: "字节号从 1 开始，宽度须为 2 或 4".into(),
            });
        }
        let start = usize::from(byte - 1);
        let end = start + usize::from(len);
        if end > TRACE_HEADER_LEN {
            return Err(IoError::InvalidHeaderByte {
                name: format!("{len} 字节字段"),
                byte,
                reason: format!("超出 {TRACE_HEADER_LEN} 字节道头"),
            });
        }
        Ok(start..end)
    }

    /// 读取整数字段
    pub fn get(&self, endian: Endianness, byte: u16, len: u8) -> IoResult<i32> {
        let range = Self::span(byte, len)?;
        Ok(match len {
            2 => i32::from(endian.read_i16(&self.bytes[range])),
            _ => endian.read_i32(&self.bytes[range]),
        })
    }

    /// 写入整数字段
    ///
    /// 2 字节字段要求值在 i16 范围内。
    pub fn set(&mut self, endian: Endianness, byte: u16, len: u8, value: i32) -> IoResult<()> {
        let range = Self::span(byte, len)?;
        match len {
            2 => {
                let v = i16::try_from(value).map_err(|_| IoError::HeaderValueOverflow {
                    name: format!("字节 {byte}"),
                    trace: 0,
                    value: f64::from(value),
                    width: 2,
                })?;
                endian.write_i16(&mut self.bytes[range], v);
            }
            _ => endian.write_i32(&mut self.bytes[range], value),
        }
        Ok(())
    }

    /// 读取标准字段
    pub fn field(&self, endian: Endianness, field: &HeaderField) -> i32 {
        self.get(endian, field.byte, field.len).unwrap_or(0)
    }

    /// 所有标准字段的值
    pub fn values(&self, endian: Endianness) -> Vec<i32> {
        TRACE_HEADER_FIELDS
            .iter()
            .map(|f| self.field(endian, f))
            .collect()
    }

    /// CDP 编号（字节 21）
    pub fn cdp(&self, endian: Endianness) -> i32 {
        endian.read_i32(&self.bytes[20..24])
    }

    /// 坐标比例因子（字节 71）
    pub fn coordinate_scalar(&self, endian: Endianness) -> i16 {
        endian.read_i16(&self.bytes[70..72])
    }

    /// 设置坐标比例因子
    pub fn set_coordinate_scalar(&mut self, endian: Endianness, scalar: i16) {
        endian.write_i16(&mut self.bytes[70..72], scalar);
    }

    /// 本道采样点数（字节 115）
    pub fn sample_count(&self, endian: Endianness) -> u16 {
        endian.read_u16(&self.bytes[114..116])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_table_covers_header() {
        let mut next = 1u16;
        for f in TRACE_HEADER_FIELDS {
            assert_eq!(f.byte, next, "字段 {} 不连续", f.name);
            next += u16::from(f.len);
        }
        assert_eq!(usize::from(next - 1), TRACE_HEADER_LEN);
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(field_at(21).map(|f| f.name), Some("CDP"));
        assert_eq!(field_at(73).map(|f| f.name), Some("SourceX"));
        assert!(field_at(22).is_none());
        assert_eq!(field_by_name("cdp_x").map(|f| f.byte), Some(181));
    }

    #[test]
    fn test_get_set_roundtrip_big_endian() {
        let mut h = TraceHeader::default();
        h.set(Endianness::Big, 73, 4, 512_345_678).unwrap();
        h.set(Endianness::Big, 71, 2, -100).unwrap();
        assert_eq!(h.get(Endianness::Big, 73, 4).unwrap(), 512_345_678);
        assert_eq!(h.coordinate_scalar(Endianness::Big), -100);
        assert_eq!(&h.as_bytes()[70..72], &[0xFF, 0x9C]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut h = TraceHeader::default();
        assert!(h.set(Endianness::Big, 239, 4, 1).is_err());
        assert!(h.get(Endianness::Big, 0, 4).is_err());
        assert!(h.get(Endianness::Big, 1, 3).is_err());
    }

    #[test]
    fn test_two_byte_overflow() {
        let mut h = TraceHeader::default();
        let err = h.set(Endianness::Big, 115, 2, 40_000).unwrap_err();
        assert!(matches!(err, IoError::HeaderValueOverflow { width: 2, .. }));
    }
}
