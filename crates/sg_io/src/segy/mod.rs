// crates/sg_io/src/segy/mod.rs

//! SEG-Y 读写
//!
//! 文件布局：3200 字节文本头 + 400 字节二进制头 + N×3200 字节扩展文本头，
//! 之后每道为 240 字节道头加定长采样。
//!
//! # 示例
//!
//! ```ignore
//! use sg_io::segy::{ProfileLoader, SegyWriter, TraceHeaderMap};
//!
//! let mut profile = ProfileLoader::new().load("Profile_19.sgy")?;
//! profile.assign_xy(xs, ys)?;
//! SegyWriter::new(TraceHeaderMap::default()).write(&profile, "seismic_with_coords.sgy")?;
//! ```

pub mod binary_header;
pub mod format;
pub mod profile;
pub mod reader;
pub mod scan;
pub mod textual;
pub mod trace_header;
pub mod writer;

pub use binary_header::{BinaryHeader, BINARY_HEADER_FIELDS};
pub use format::{Endianness, SampleFormat};
pub use profile::{SeismicProfile, CDP_X, CDP_Y};
pub use reader::{unscale, ProfileLoader, SegyReader};
pub use scan::{scan_headers, FieldStats, HeaderScan, DEFAULT_SCAN_TRACES};
pub use textual::{TextEncoding, TextualHeader};
pub use trace_header::{field_at, field_by_name, HeaderField, TraceHeader, TRACE_HEADER_FIELDS};
pub use writer::{
    choose_scalar, scale_factor, CoordinateScalar, SegyWriter, TraceHeaderMap, WriteSummary,
    CDP_KEY,
};
