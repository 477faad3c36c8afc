// crates/sg_foundation/src/lib.rs

//! SeisGeo Foundation Layer
//!
//! 基础层，提供整个项目共用的错误类型与验证报告。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`validation`]: 运行时验证工具
//!
//! # 示例
//!
//! ```
//! use sg_foundation::{SgError, SgResult};
//!
//! fn cdp_count(n: usize) -> SgResult<usize> {
//!     if n == 0 {
//!         return Err(SgError::invalid_input("剖面没有任何道"));
//!     }
//!     Ok(n)
//! }
//!
//! assert!(cdp_count(0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod validation;

// 重导出常用类型
pub use error::{SgError, SgResult};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{SgError, SgResult};
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
    pub use crate::ensure;
}
