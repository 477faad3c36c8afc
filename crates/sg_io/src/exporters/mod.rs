// crates/sg_io/src/exporters/mod.rs

//! 数据导出模块
//!
//! 提供 GeoJSON 与 Shapefile 导出。

pub mod geojson;
pub mod shapefile;

// 重导出
pub use geojson::{export_cdp_geojson, write_feature_collection};
pub use shapefile::{ExportShape, ShapefileWriter};
