// crates/sg_config/src/error.rs

//! 配置层错误类型

use sg_foundation::SgError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),
}

impl ConfigError {
    /// 无效值
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for SgError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => SgError::io_with_source("读取配置失败", e),
            ConfigError::Parse(msg) => SgError::config(msg),
            ConfigError::InvalidValue { key, value, reason } => {
                SgError::invalid_config(key, value, reason)
            }
            ConfigError::Missing(key) => SgError::config(format!("缺失配置: {key}")),
        }
    }
}
