// crates/sg_geo/src/lib.rs
//! SeisGeo 几何处理模块
//!
//! 提供平面几何类型与折线弧长插值，是把测线坐标映射到地震道的核心。
//!
//! # 模块
//!
//! - `geometry`: 几何类型 (Point2D, BoundingBox)
//! - `polyline`: 折线、弧长插值与等间距重采样
//! - `error`: 几何错误类型
//!
//! # 示例
//!
//! ```
//! use sg_geo::prelude::*;
//!
//! let line = Polyline::new(vec![Point2D::new(0.0, 0.0), Point2D::new(90.0, 0.0)]).unwrap();
//! let cdps = line.resample(10).unwrap();
//! assert!((cdps[1].x - 10.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod polyline;

/// 预导入模块
pub mod prelude {
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::{BoundingBox, Point2D};
    pub use crate::polyline::Polyline;
}

// 重导出常用类型
pub use error::{GeoError, GeoResult};
pub use geometry::{BoundingBox, Point2D};
pub use polyline::{linspace, Polyline};
