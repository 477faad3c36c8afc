// crates/sg_io/src/lib.rs

//! SeisGeo IO 模块
//!
//! 提供数据输入输出功能。
//!
//! # 模块
//!
//! - [`segy`]: SEG-Y 读写、道头映射与道头扫描
//! - [`shapefile`]: Shapefile 读取与按属性选取测线
//! - [`exporters`]: 数据导出 (GeoJSON, Shapefile)
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use sg_io::segy::{scan_headers, ProfileLoader, SegyWriter, TraceHeaderMap};
//! use sg_io::shapefile::FeatureCollection;
//!
//! let mut profile = ProfileLoader::new().with_cdp_byte(21).load("Profile_19.sgy")?;
//! let line = FeatureCollection::read("profiles.shp")?.select_polyline("N_PROF", "PR_19")?;
//! let points = line.resample(profile.n_traces())?;
//! profile.assign_xy(points.iter().map(|p| p.x).collect(), points.iter().map(|p| p.y).collect())?;
//! SegyWriter::new(TraceHeaderMap::default()).write(&profile, "seismic_with_coords.sgy")?;
//! println!("{}", scan_headers("seismic_with_coords.sgy", None)?);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod exporters;
pub mod segy;
pub mod shapefile;

// 重导出常用类型
pub use error::{IoError, IoResult};
pub use segy::{
    scan_headers, CoordinateScalar, HeaderScan, ProfileLoader, SeismicProfile, SegyReader,
    SegyWriter, TraceHeaderMap,
};
pub use shapefile::{Feature, FeatureCollection, FieldValue};

/// 类型别名简化
pub type Result<T> = IoResult<T>;
