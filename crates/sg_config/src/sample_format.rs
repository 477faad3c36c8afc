// crates/sg_config/src/sample_format.rs

//! 输出采样格式选择
//!
//! 配置层不依赖 IO 层，这里只记录格式代码，由工作流转换为 IO 层类型。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 输出采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSampleFormat {
    /// 与输入相同
    #[default]
    Input,
    /// 1: IBM 浮点
    Ibm,
    /// 2: 4 字节整数
    Int32,
    /// 3: 2 字节整数
    Int16,
    /// 5: IEEE 单精度
    Ieee32,
    /// 6: IEEE 双精度
    Ieee64,
    /// 8: 1 字节整数
    Int8,
}

impl OutputSampleFormat {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Ibm => "ibm",
            Self::Int32 => "int32",
            Self::Int16 => "int16",
            Self::Ieee32 => "ieee32",
            Self::Ieee64 => "ieee64",
            Self::Int8 => "int8",
        }
    }

    /// SEG-Y 格式代码，`Input` 返回 `None`
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Input => None,
            Self::Ibm => Some(1),
            Self::Int32 => Some(2),
            Self::Int16 => Some(3),
            Self::Ieee32 => Some(5),
            Self::Ieee64 => Some(6),
            Self::Int8 => Some(8),
        }
    }
}

impl std::fmt::Display for OutputSampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 采样格式解析错误
#[derive(Debug, Clone)]
pub struct SampleFormatParseError(String);

impl FromStr for OutputSampleFormat {
    type Err = SampleFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" | "same" => Ok(Self::Input),
            "ibm" | "1" => Ok(Self::Ibm),
            "int32" | "i32" | "2" => Ok(Self::Int32),
            "int16" | "i16" | "3" => Ok(Self::Int16),
            "ieee32" | "ieee" | "f32" | "5" => Ok(Self::Ieee32),
            "ieee64" | "f64" | "6" => Ok(Self::Ieee64),
            "int8" | "i8" | "8" => Ok(Self::Int8),
            _ => Err(SampleFormatParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for SampleFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "无效的采样格式: '{}', 期望 input/ibm/int32/int16/ieee32/ieee64/int8",
            self.0
        )
    }
}

impl std::error::Error for SampleFormatParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_input() {
        assert_eq!(OutputSampleFormat::default(), OutputSampleFormat::Input);
        assert_eq!(OutputSampleFormat::Input.code(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("IBM".parse::<OutputSampleFormat>().unwrap(), OutputSampleFormat::Ibm);
        assert_eq!("5".parse::<OutputSampleFormat>().unwrap(), OutputSampleFormat::Ieee32);
        assert!("float128".parse::<OutputSampleFormat>().is_err());
    }

    #[test]
    fn test_codes() {
        assert_eq!(OutputSampleFormat::Ibm.code(), Some(1));
        assert_eq!(OutputSampleFormat::Int8.code(), Some(8));
    }
}
