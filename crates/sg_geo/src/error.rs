// crates/sg_geo/src/error.rs
//! 几何处理错误类型
//!
//! 包含折线构建、插值和重采样相关的错误。
//! 所有错误可转换为 `sg_foundation::SgError` 向上传播。
//!
//! # 错误分类
//!
//! - **输入错误**：空折线、非有限坐标、无效采样点数
//! - **基础错误**：来自 Foundation 层

use sg_foundation::SgError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 几何处理错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// 折线没有任何顶点
    #[error("折线为空: 至少需要 1 个顶点")]
    EmptyPolyline,

    /// 顶点坐标非有限
    #[error("顶点 {index} 坐标非有限: ({x}, {y})")]
    NonFiniteVertex {
        /// 顶点序号（跨所有部件）
        index: usize,
        /// X
        x: f64,
        /// Y
        y: f64,
    },

    /// 无效的采样点数
    #[error("无效的采样点数: {count} (至少为 1)")]
    InvalidSampleCount {
        /// 请求的点数
        count: usize,
    },

    /// 插值距离非有限
    #[error("插值距离非有限: {distance}")]
    NonFiniteDistance {
        /// 距离
        distance: f64,
    },

    /// 基础层错误（向下聚合）
    #[error("基础层错误: {0}")]
    Foundation(#[from] SgError),
}

impl From<GeoError> for SgError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::EmptyPolyline => SgError::geometry("折线为空"),
            GeoError::NonFiniteVertex { index, x, y } => {
                SgError::invalid_input(format!("顶点 {index} 坐标非有限: ({x}, {y})"))
            }
            GeoError::InvalidSampleCount { count } => {
                SgError::invalid_input(format!("无效的采样点数: {count}"))
            }
            GeoError::NonFiniteDistance { distance } => {
                SgError::geometry(format!("插值距离非有限: {distance}"))
            }
            GeoError::Foundation(err) => err,
        }
    }
}
