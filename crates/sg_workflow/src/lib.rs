// crates/sg_workflow/src/lib.rs

//! SeisGeo Workflow Layer (Layer 4)
//!
//! 把测线坐标重新赋给 SEG-Y 剖面各道：扫描输入、加载剖面、选取测线、
//! 等弧长重采样、写出带坐标的 SEG-Y 并重新扫描校验。
//!
//! # 模块概览
//!
//! - [`reassign`]: 分阶段执行的 CoordinateReassignment 作业
//! - [`verify`]: 输出文件回读校验
//! - [`report`]: 运行报告
//! - [`error`]: 带阶段信息的工作流错误
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use sg_config::ReassignConfig;
//! use sg_workflow::CoordinateReassignment;
//!
//! let job = CoordinateReassignment::new(ReassignConfig::default())?;
//! let report = job.run()?;
//! println!("{report}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod reassign;
pub mod report;
pub mod verify;

/// 层级标识
pub const LAYER: u8 = 4;

pub use error::{WorkflowError, WorkflowResult};
pub use reassign::{assign_line_coordinates, CoordinateReassignment, ReassignStage, ResampledLine};
pub use report::{ReassignReport, VaryingField};
pub use verify::{verify_output, Verification};
