// crates/sg_workflow/src/error.rs

//! 工作流错误类型

use sg_config::ConfigError;
use sg_foundation::SgError;
use sg_geo::GeoError;
use sg_io::IoError;
use thiserror::Error;

use crate::reassign::ReassignStage;

/// 工作流结果类型
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// 工作流错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// IO 错误
    #[error("{0}")]
    Io(#[from] IoError),

    /// 几何错误
    #[error("几何错误: {0}")]
    Geo(#[from] GeoError),

    /// 基础层错误
    #[error("{0}")]
    Foundation(#[from] SgError),

    /// 输出校验未通过
    #[error("输出校验失败: {errors} 个错误 ({first})")]
    Verification {
        /// 错误数
        errors: usize,
        /// 第一个错误
        first: String,
    },

    /// 报告序列化失败
    #[error("报告写出失败: {0}")]
    Report(String),

    /// 带阶段信息的错误
    #[error("阶段 {stage} 失败: {source}")]
    Stage {
        /// 失败阶段
        stage: ReassignStage,
        /// 原因
        #[source]
        source: Box<WorkflowError>,
    },
}

impl WorkflowError {
    /// 附加阶段信息
    pub fn at(self, stage: ReassignStage) -> Self {
        match self {
            already @ Self::Stage { .. } => already,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// 失败阶段
    pub fn stage(&self) -> Option<ReassignStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// 去掉阶段包装后的原因
    pub fn root(&self) -> &WorkflowError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<WorkflowError> for SgError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Config(e) => e.into(),
            WorkflowError::Io(e) => e.into(),
            WorkflowError::Geo(e) => e.into(),
            WorkflowError::Foundation(e) => e,
            WorkflowError::Verification { errors, first } => {
                SgError::validation(format!("{errors} 个错误: {first}"))
            }
            WorkflowError::Report(msg) => SgError::serialization(msg),
            WorkflowError::Stage { source, .. } => (*source).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping() {
        let err = WorkflowError::from(IoError::FeatureNotFound {
            field: "N_PROF".into(),
            value: "PR_99".into(),
        })
        .at(ReassignStage::SelectProfile)
        .at(ReassignStage::Resample);
        assert_eq!(err.stage(), Some(ReassignStage::SelectProfile));
        assert!(matches!(
            err.root(),
            WorkflowError::Io(IoError::FeatureNotFound { .. })
        ));
        assert!(err.to_string().contains("PR_99"));
    }

    #[test]
    fn test_into_sg_error() {
        let sg: SgError = WorkflowError::Verification {
            errors: 2,
            first: "字段 SourceX 无变化".into(),
        }
        .into();
        assert!(matches!(sg, SgError::Validation(_)));
    }
}
