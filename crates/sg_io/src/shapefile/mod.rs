// crates/sg_io/src/shapefile/mod.rs

//! ESRI Shapefile 读取
//!
//! - `shp`: 几何主文件
//! - `dbf`: dBase 属性表
//! - `feature`: 几何与属性对齐后的要素集合，按属性选取测线
//!
//! `.shx` 索引不是必需的，记录按顺序从 `.shp` 读取。

pub mod dbf;
pub mod feature;
pub mod shp;

pub use dbf::{read_dbf, DbfTable, FieldDescriptor, FieldType, FieldValue};
pub use feature::{Feature, FeatureCollection};
pub use shp::{read_shp, Shape, ShapeType, ShpFile};
