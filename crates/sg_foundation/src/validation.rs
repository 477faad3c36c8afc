// crates/sg_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于输入数据检查和输出文件复核。
//!
//! # 示例
//!
//! ```
//! use sg_foundation::validation::{ValidationReport, ValidationError};
//!
//! let cdp_x = [430_000.0, 430_000.0, 430_000.0];
//! let mut report = ValidationReport::new();
//! if cdp_x.windows(2).all(|w| w[0] == w[1]) {
//!     report.add_error(ValidationError::ConstantField {
//!         field: "cdp_x".into(),
//!         byte: 73,
//!     });
//! }
//!
//! assert!(report.has_errors());
//! ```

use serde::Serialize;
use std::fmt;

/// 验证报告
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.warning_count() > 0 {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// 道头字段回读值与期望不一致
    HeaderMismatch {
        /// 字段名称
        field: String,
        /// 字节位置（从 1 开始）
        byte: u16,
        /// 道序号
        trace: usize,
        /// 期望值
        expected: f64,
        /// 实际值
        actual: f64,
    },
    /// 期望变化的道头字段在输出中为常数
    ConstantField {
        /// 字段名称
        field: String,
        /// 字节位置（从 1 开始）
        byte: u16,
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
    /// 自定义错误
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderMismatch {
                field,
                byte,
                trace,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "道{}: 字段{}(字节{}) 期望{} 实际{}",
                    trace, field, byte, expected, actual
                )
            }
            Self::ConstantField { field, byte } => {
                write!(f, "字段{}(字节{}) 在输出中无变化 (std = 0)", field, byte)
            }
            Self::ConsistencyError { message } => {
                write!(f, "一致性错误: {}", message)
            }
            Self::Custom { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// 重复的 CDP 号
    DuplicateValue {
        /// 字段名称
        field: String,
        /// 重复值
        value: i64,
        /// 出现次数
        count: usize,
    },
    /// 质量警告
    QualityWarning {
        /// 警告描述
        message: String,
        /// 可选的道序号
        trace: Option<usize>,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateValue { field, value, count } => {
                write!(f, "字段{}: 值{} 重复出现 {} 次", field, value, count)
            }
            Self::QualityWarning { message, trace } => {
                if let Some(id) = trace {
                    write!(f, "道{}: 质量警告: {}", id, message)
                } else {
                    write!(f, "质量警告: {}", message)
                }
            }
            Self::Custom { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
