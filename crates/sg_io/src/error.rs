// crates/sg_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 所有错误最终可转换为 SgError 以实现跨层错误传递。

use sg_foundation::SgError;
use sg_geo::GeoError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 路径
        path: String,
    },

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// SEG-Y 结构错误
    #[error("SEG-Y 格式错误: {path} 偏移 {offset}: {message}")]
    SegyFormat {
        /// 文件路径
        path: String,
        /// 字节偏移
        offset: u64,
        /// 错误信息
        message: String,
    },

    /// 不支持的数据采样格式
    #[error("不支持的采样格式代码: {code} (支持: 1, 2, 3, 5, 6, 8)")]
    UnsupportedSampleFormat {
        /// 二进制头中的格式代码
        code: i32,
    },

    /// Shapefile 主文件错误
    #[error("Shapefile 格式错误: {path}: {message}")]
    ShapefileFormat {
        /// 文件路径
        path: String,
        /// 错误信息
        message: String,
    },

    /// dBase 属性表错误
    #[error("DBF 格式错误: {path}: {message}")]
    DbfFormat {
        /// 文件路径
        path: String,
        /// 错误信息
        message: String,
    },

    /// 属性字段不存在
    #[error("属性字段不存在: {field} (可用字段: {available:?})")]
    FieldNotFound {
        /// 请求的字段
        field: String,
        /// 已有字段
        available: Vec<String>,
    },

    /// 没有要素满足选择条件
    #[error("未找到要素: {field} == \"{value}\"")]
    FeatureNotFound {
        /// 字段
        field: String,
        /// 值
        value: String,
    },

    /// 要素几何不是线
    #[error("要素 {index} 不是线要素: {shape_type}")]
    NotALine {
        /// 要素序号
        index: usize,
        /// 实际几何类型
        shape_type: String,
    },

    /// 坐标数组长度与 CDP 数不一致
    #[error("坐标数组长度不一致: {name} 期望 {expected} (CDP 数), 实际 {actual}")]
    CoordinateLength {
        /// 坐标名
        name: String,
        /// CDP 数
        expected: usize,
        /// 数组长度
        actual: usize,
    },

    /// 剖面上不存在的坐标
    #[error("坐标不存在: {name}")]
    MissingCoordinate {
        /// 坐标名
        name: String,
    },

    /// 道头字节位置无效
    #[error("道头字节位置无效: {name} -> 字节 {byte}: {reason}")]
    InvalidHeaderByte {
        /// 映射名
        name: String,
        /// 字节位置（从 1 开始）
        byte: u16,
        /// 原因
        reason: String,
    },

    /// 值无法写入道头字段
    #[error("道头值溢出: {name} 道 {trace} 值 {value} 超出 {width} 字节整数范围")]
    HeaderValueOverflow {
        /// 映射名
        name: String,
        /// 道序号
        trace: usize,
        /// 值（已乘比例因子）
        value: f64,
        /// 字段宽度
        width: u8,
    },

    /// 导出失败
    #[error("导出失败: {0}")]
    Export(String),

    /// 几何层错误
    #[error("几何错误: {0}")]
    Geo(#[from] GeoError),

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] SgError),
}

impl IoError {
    /// SEG-Y 结构错误
    pub fn segy(path: impl Into<String>, offset: u64, message: impl Into<String>) -> Self {
        Self::SegyFormat {
            path: path.into(),
            offset,
            message: message.into(),
        }
    }

    /// Shapefile 主文件错误
    pub fn shapefile(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShapefileFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// dBase 属性表错误
    pub fn dbf(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DbfFormat {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<IoError> for SgError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::FileNotFound { path } => SgError::file_not_found(path),
            IoError::Io(e) => SgError::io_with_source("文件读写失败", e),
            IoError::SegyFormat { path, offset, message } => SgError::parse(path, offset, message),
            IoError::UnsupportedSampleFormat { code } => SgError::unsupported_format(
                format!("SEG-Y 采样格式 {code}"),
                ["1", "2", "3", "5", "6", "8"].iter().map(|s| s.to_string()).collect(),
            ),
            IoError::ShapefileFormat { path, message } | IoError::DbfFormat { path, message } => {
                SgError::parse(path, 0, message)
            }
            IoError::FieldNotFound { field, .. } => SgError::not_found(format!("属性字段 {field}")),
            IoError::FeatureNotFound { field, value } => {
                SgError::not_found(format!("要素 {field} == \"{value}\""))
            }
            IoError::NotALine { index, shape_type } => {
                SgError::invalid_input(format!("要素 {index} 不是线要素: {shape_type}"))
            }
            IoError::CoordinateLength { name, expected, actual } => {
                SgError::size_mismatch(name, expected, actual)
            }
            IoError::MissingCoordinate { name } => SgError::not_found(format!("坐标 {name}")),
            IoError::InvalidHeaderByte { name, byte, reason } => {
                SgError::invalid_config(name, byte.to_string(), reason)
            }
            IoError::HeaderValueOverflow { name, trace, value, width } => SgError::invalid_input(
                format!("道头值溢出: {name} 道 {trace} 值 {value} ({width} 字节)"),
            ),
            IoError::Export(msg) => SgError::serialization(msg),
            IoError::Geo(e) => e.into(),
            IoError::Foundation(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_not_found_message() {
        let err = IoError::FeatureNotFound {
            field: "N_PROF".into(),
            value: "PR_99".into(),
        };
        assert!(err.to_string().contains("PR_99"));

        let sg: SgError = err.into();
        assert!(matches!(sg, SgError::NotFound { .. }));
    }

    #[test]
    fn test_coordinate_length_maps_to_size_mismatch() {
        let sg: SgError = IoError::CoordinateLength {
            name: "cdp_x".into(),
            expected: 100,
            actual: 99,
        }
        .into();
        assert!(matches!(
            sg,
            SgError::SizeMismatch { expected: 100, actual: 99, .. }
        ));
    }

    #[test]
    fn test_geo_error_passthrough() {
        let sg: SgError = IoError::Geo(GeoError::EmptyPolyline).into();
        assert!(matches!(sg, SgError::Geometry(_)));
    }
}
