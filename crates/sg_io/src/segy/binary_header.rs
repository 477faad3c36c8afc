// crates/sg_io/src/segy/binary_header.rs

//! SEG-Y 二进制文件头 (文件字节 3201-3600)
//!
//! 保留原始 400 字节，按需读写字段。字段位置以文件字节号（从 1 开始）给出。

use super::format::{Endianness, SampleFormat};

/// 二进制头字节数
pub const BINARY_HEADER_LEN: usize = 400;
/// 二进制头在文件中的起始字节号（从 1 开始）
pub const BINARY_HEADER_START: u16 = 3201;

/// 二进制头字段定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryField {
    /// 字段名
    pub name: &'static str,
    /// 文件字节号（从 1 开始）
    pub byte: u16,
    /// 宽度（2 或 4）
    pub len: u8,
}

const fn bf(name: &'static str, byte: u16, len: u8) -> BinaryField {
    BinaryField { name, byte, len }
}

/// 常用二进制头字段
pub const BINARY_HEADER_FIELDS: &[BinaryField] = &[
    bf("JobID", 3201, 4),
    bf("LineNumber", 3205, 4),
    bf("ReelNumber", 3209, 4),
    bf("DataTracesPerEnsemble", 3213, 2),
    bf("AuxTracesPerEnsemble", 3215, 2),
    bf("SampleInterval", 3217, 2),
    bf("SampleIntervalOriginal", 3219, 2),
    bf("SamplesPerTrace", 3221, 2),
    bf("SamplesPerTraceOriginal", 3223, 2),
    bf("DataSampleFormat", 3225, 2),
    bf("EnsembleFold", 3227, 2),
    bf("TraceSorting", 3229, 2),
    bf("VerticalSumCode", 3231, 2),
    bf("MeasurementSystem", 3255, 2),
    bf("ImpulseSignalPolarity", 3257, 2),
    bf("VibratoryPolarityCode", 3259, 2),
    bf("SEGYRevision", 3501, 2),
    bf("FixedLengthTraceFlag", 3503, 2),
    bf("ExtendedTextualHeaders", 3505, 2),
];

const SAMPLE_INTERVAL: u16 = 3217;
const SAMPLES_PER_TRACE: u16 = 3221;
const FORMAT_CODE: u16 = 3225;
const MEASUREMENT_SYSTEM: u16 = 3255;
const REVISION: u16 = 3501;
const FIXED_LENGTH: u16 = 3503;
const EXTENDED_HEADERS: u16 = 3505;

/// SEG-Y 二进制头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryHeader {
    bytes: [u8; BINARY_HEADER_LEN],
}

impl Default for BinaryHeader {
    fn default() -> Self {
        Self {
            bytes: [0u8; BINARY_HEADER_LEN],
        }
    }
}

impl BinaryHeader {
    /// 由原始 400 字节构建
    pub fn from_bytes(bytes: [u8; BINARY_HEADER_LEN]) -> Self {
        Self { bytes }
    }

    /// 新建二进制头（SEG-Y rev1，定长道）
    pub fn new(
        endian: Endianness,
        sample_interval_us: u16,
        n_samples: u16,
        format: SampleFormat,
    ) -> Self {
        let mut header = Self::default();
        header.set(endian, SAMPLE_INTERVAL, 2, i32::from(sample_interval_us));
        header.set(endian, SAMPLES_PER_TRACE, 2, i32::from(n_samples));
        header.set(endian, FORMAT_CODE, 2, i32::from(format.code()));
        header.set(endian, MEASUREMENT_SYSTEM, 2, 1);
        header.set(endian, REVISION, 2, 0x0100);
        header.set(endian, FIXED_LENGTH, 2, 1);
        header
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8; BINARY_HEADER_LEN] {
        &self.bytes
    }

    /// 读取字段（文件字节号，宽度 2 或 4）
    pub fn get(&self, endian: Endianness, byte: u16, len: u8) -> i32 {
        let off = usize::from(byte - BINARY_HEADER_START);
        match len {
            2 => i32::from(endian.read_i16(&self.bytes[off..off + 2])),
            _ => endian.read_i32(&self.bytes[off..off + 4]),
        }
    }

    /// 写入字段（2 字节字段截断为 i16）
    pub fn set(&mut self, endian: Endianness, byte: u16, len: u8, value: i32) {
        let off = usize::from(byte - BINARY_HEADER_START);
        match len {
            2 => endian.write_i16(&mut self.bytes[off..off + 2], value as i16),
            _ => endian.write_i32(&mut self.bytes[off..off + 4], value),
        }
    }

    /// 按大端解释的格式代码不合理而小端合理时判为小端
    pub fn detect_endianness(&self) -> Endianness {
        let big = self.get(Endianness::Big, FORMAT_CODE, 2);
        if SampleFormat::from_code(big).is_ok() {
            return Endianness::Big;
        }
        let little = self.get(Endianness::Little, FORMAT_CODE, 2);
        if SampleFormat::from_code(little).is_ok() {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// 采样间隔（微秒）
    pub fn sample_interval(&self, endian: Endianness) -> u16 {
        endian.read_u16(&self.bytes[16..18])
    }

    /// 每道采样点数
    ///
    /// 按无符号解释，兼容超过 32767 个采样点的文件。
    pub fn samples_per_trace(&self, endian: Endianness) -> u16 {
        endian.read_u16(&self.bytes[20..22])
    }

    /// 数据格式代码
    pub fn format_code(&self, endian: Endianness) -> i32 {
        self.get(endian, FORMAT_CODE, 2)
    }

    /// 测量系统 (1 = 米, 2 = 英尺)
    pub fn measurement_system(&self, endian: Endianness) -> i32 {
        self.get(endian, MEASUREMENT_SYSTEM, 2)
    }

    /// SEG-Y 修订号
    pub fn revision(&self, endian: Endianness) -> i32 {
        self.get(endian, REVISION, 2)
    }

    /// 扩展文本头数量（负值视为 0）
    pub fn extended_textual_headers(&self, endian: Endianness) -> usize {
        usize::try_from(self.get(endian, EXTENDED_HEADERS, 2)).unwrap_or(0)
    }

    /// 设置数据格式代码
    pub fn set_format(&mut self, endian: Endianness, format: SampleFormat) {
        self.set(endian, FORMAT_CODE, 2, i32::from(format.code()));
    }

    /// 所有已定义字段的 (字段, 值)
    pub fn fields(&self, endian: Endianness) -> Vec<(BinaryField, i32)> {
        BINARY_HEADER_FIELDS
            .iter()
            .map(|f| (*f, self.get(endian, f.byte, f.len)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header_fields() {
        let h = BinaryHeader::new(Endianness::Big, 2000, 1501, SampleFormat::IbmFloat32);
        assert_eq!(h.sample_interval(Endianness::Big), 2000);
        assert_eq!(h.samples_per_trace(Endianness::Big), 1501);
        assert_eq!(h.format_code(Endianness::Big), 1);
        assert_eq!(h.measurement_system(Endianness::Big), 1);
        assert_eq!(h.extended_textual_headers(Endianness::Big), 0);
        // 3217 -> 偏移 16
        assert_eq!(&h.as_bytes()[16..18], &[0x07, 0xD0]);
    }

    #[test]
    fn test_detect_endianness() {
        let big = BinaryHeader::new(Endianness::Big, 1000, 10, SampleFormat::IeeeFloat32);
        assert_eq!(big.detect_endianness(), Endianness::Big);

        let little = BinaryHeader::new(Endianness::Little, 1000, 10, SampleFormat::IeeeFloat32);
        assert_eq!(little.detect_endianness(), Endianness::Little);
    }

    #[test]
    fn test_field_table_within_header() {
        for f in BINARY_HEADER_FIELDS {
            let end = usize::from(f.byte - BINARY_HEADER_START) + usize::from(f.len);
            assert!(end <= BINARY_HEADER_LEN, "{}", f.name);
        }
    }

    #[test]
    fn test_set_format() {
        let mut h = BinaryHeader::new(Endianness::Big, 4000, 10, SampleFormat::IbmFloat32);
        h.set_format(Endianness::Big, SampleFormat::IeeeFloat32);
        assert_eq!(h.format_code(Endianness::Big), 5);
    }
}
