// crates/sg_config/src/lib.rs

//! SeisGeo Config Layer (Layer 4)
//!
//! 作业配置：输入文件、测线选择、道头映射、输出格式与扫描参数。
//!
//! # 模块概览
//!
//! - [`reassign_config`]: ReassignConfig 坐标重赋值作业配置 (JSON)
//! - [`sample_format`]: OutputSampleFormat 输出采样格式选择
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: sg_cli       ─> uses ReassignConfig
//! Layer 4: sg_config    ─> ReassignConfig (本层), sg_workflow
//! Layer 3: sg_io
//! Layer 2: sg_geo
//! Layer 1: sg_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod reassign_config;
pub mod sample_format;

/// 层级标识
pub const LAYER: u8 = 4;

// 重导出核心类型
pub use error::ConfigError;
pub use reassign_config::{
    InputConfig, OutputConfig, ProfileSelection, ReassignConfig, ScanConfig,
};
pub use sample_format::OutputSampleFormat;
