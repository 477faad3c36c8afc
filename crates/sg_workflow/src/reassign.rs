// crates/sg_workflow/src/reassign.rs

//! 坐标重赋值流程
//!
//! ```text
//! ScanInput → LoadProfile → ReadShapefile → SelectProfile → Resample
//!   → AssignCoordinates → WriteOutput → VerifyOutput
//! ```
//!
//! 测线按弧长等间距重采样为 N 个点（N = CDP 数），依次作为
//! `cdp_x` / `cdp_y` 写入道头。

use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use sg_config::ReassignConfig;
use sg_foundation::ensure;
use sg_geo::{Point2D, Polyline};
use sg_io::exporters::{export_cdp_geojson, ExportShape, ShapefileWriter};
use sg_io::segy::{
    scan_headers, CoordinateScalar, ProfileLoader, SampleFormat, SegyWriter, SeismicProfile,
    TraceHeaderMap, WriteSummary,
};
use sg_io::shapefile::{FeatureCollection, FieldDescriptor, FieldValue, ShapeType};
use tracing::{debug, info};

use crate::error::{WorkflowError, WorkflowResult};
use crate::report::{ReassignReport, VaryingField};
use crate::verify::verify_output;

/// 流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReassignStage {
    /// 扫描输入道头
    ScanInput,
    /// 加载剖面
    LoadProfile,
    /// 读取 Shapefile
    ReadShapefile,
    /// 选取测线
    SelectProfile,
    /// 等弧长重采样
    Resample,
    /// 挂接坐标
    AssignCoordinates,
    /// 写出 SEG-Y
    WriteOutput,
    /// 校验输出
    VerifyOutput,
}

impl ReassignStage {
    /// 全部阶段（按执行顺序）
    pub const ALL: [ReassignStage; 8] = [
        Self::ScanInput,
        Self::LoadProfile,
        Self::ReadShapefile,
        Self::SelectProfile,
        Self::Resample,
        Self::AssignCoordinates,
        Self::WriteOutput,
        Self::VerifyOutput,
    ];

    /// 阶段名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScanInput => "scan-input",
            Self::LoadProfile => "load-profile",
            Self::ReadShapefile => "read-shapefile",
            Self::SelectProfile => "select-profile",
            Self::Resample => "resample",
            Self::AssignCoordinates => "assign-coordinates",
            Self::WriteOutput => "write-output",
            Self::VerifyOutput => "verify-output",
        }
    }

    /// 从 1 开始的序号
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).map_or(0, |i| i + 1)
    }
}

impl fmt::Display for ReassignStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 为结果附加阶段信息
trait StageExt<T> {
    fn stage(self, stage: ReassignStage) -> WorkflowResult<T>;
}

impl<T, E: Into<WorkflowError>> StageExt<T> for Result<T, E> {
    fn stage(self, stage: ReassignStage) -> WorkflowResult<T> {
        self.map_err(|e| e.into().at(stage))
    }
}

fn enter(stage: ReassignStage) {
    info!(
        "[{}/{}] {}",
        stage.number(),
        ReassignStage::ALL.len(),
        stage
    );
}

/// 重采样结果
#[derive(Debug, Clone)]
pub struct ResampledLine {
    /// 每个 CDP 的坐标
    pub points: Vec<Point2D>,
    /// 每个 CDP 沿测线的弧长
    pub distances: Vec<f64>,
    /// 测线长度
    pub length: f64,
}

impl ResampledLine {
    /// 把测线等弧长重采样为 `n` 个点
    pub fn from_line(line: &Polyline, n: usize) -> WorkflowResult<Self> {
        Ok(Self {
            points: line.resample(n)?,
            distances: line.resample_distances(n)?,
            length: line.length(),
        })
    }

    /// 相邻 CDP 间距
    pub fn spacing(&self) -> f64 {
        if self.points.len() < 2 {
            0.0
        } else {
            self.length / (self.points.len() - 1) as f64
        }
    }
}

/// 把测线等弧长重采样为剖面道数个点，挂接为 `cdp_x` / `cdp_y`
pub fn assign_line_coordinates(
    profile: &mut SeismicProfile,
    line: &Polyline,
) -> WorkflowResult<ResampledLine> {
    let resampled = ResampledLine::from_line(line, profile.n_traces())?;
    profile.assign_xy(
        resampled.points.iter().map(|p| p.x).collect(),
        resampled.points.iter().map(|p| p.y).collect(),
    )?;
    Ok(resampled)
}

/// 由配置得到输出采样格式
fn output_format(config: &ReassignConfig) -> WorkflowResult<Option<SampleFormat>> {
    match config.output.sample_format.code() {
        Some(code) => Ok(Some(SampleFormat::from_code(code)?)),
        None => Ok(None),
    }
}

/// 坐标重赋值作业
#[derive(Debug, Clone)]
pub struct CoordinateReassignment {
    config: ReassignConfig,
}

impl CoordinateReassignment {
    /// 创建作业（校验配置）
    pub fn new(config: ReassignConfig) -> WorkflowResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 作业配置
    pub fn config(&self) -> &ReassignConfig {
        &self.config
    }

    /// 执行全部阶段
    pub fn run(&self) -> WorkflowResult<ReassignReport> {
        let cfg = &self.config;
        let started_at = Local::now();
        let timer = Instant::now();
        let map = TraceHeaderMap::from_entries(
            cfg.output
                .trace_header_map
                .iter()
                .map(|(k, &v)| (k.clone(), v)),
        )?;

        enter(ReassignStage::ScanInput);
        let before = scan_headers(&cfg.input.segy, Some(cfg.scan.max_traces))
            .stage(ReassignStage::ScanInput)?;
        debug!("输入道头:\n{}", before);

        enter(ReassignStage::LoadProfile);
        let mut profile = ProfileLoader::new()
            .with_cdp_byte(cfg.input.cdp_byte)
            .load(&cfg.input.segy)
            .stage(ReassignStage::LoadProfile)?;
        ensure!(
            profile.n_traces() > 0,
            WorkflowError::from(sg_foundation::SgError::invalid_input(format!(
                "{} 不含任何道",
                cfg.input.segy.display()
            )))
            .at(ReassignStage::LoadProfile)
        );

        enter(ReassignStage::ReadShapefile);
        let features =
            FeatureCollection::read(&cfg.input.shapefile).stage(ReassignStage::ReadShapefile)?;

        enter(ReassignStage::SelectProfile);
        let line = features
            .select_polyline(&cfg.profile.field, &cfg.profile.value)
            .stage(ReassignStage::SelectProfile)?;
        info!(
            "测线 {}: {} 个顶点, {} 段, 长度 {:.3}",
            cfg.profile.value,
            line.num_vertices(),
            line.num_parts(),
            line.length()
        );

        enter(ReassignStage::Resample);
        let resampled =
            ResampledLine::from_line(&line, profile.n_traces()).stage(ReassignStage::Resample)?;

        enter(ReassignStage::AssignCoordinates);
        profile
            .assign_xy(
                resampled.points.iter().map(|p| p.x).collect(),
                resampled.points.iter().map(|p| p.y).collect(),
            )
            .stage(ReassignStage::AssignCoordinates)?;
        info!(
            "{} 个 CDP, 间距 {:.3}",
            resampled.points.len(),
            resampled.spacing()
        );

        enter(ReassignStage::WriteOutput);
        let summary = self
            .write_output(&profile, &map)
            .stage(ReassignStage::WriteOutput)?;
        let extra_outputs = self
            .write_extras(&profile, &line, &resampled)
            .stage(ReassignStage::WriteOutput)?;

        enter(ReassignStage::VerifyOutput);
        let max = if cfg.scan.verify_all_traces {
            None
        } else {
            Some(cfg.scan.max_traces)
        };
        let verification = verify_output(&cfg.output.segy, &profile, &map, max)
            .stage(ReassignStage::VerifyOutput)?;
        info!("输出道头:\n{}", verification.scan);

        let report = ReassignReport {
            started_at,
            elapsed_secs: timer.elapsed().as_secs_f64(),
            input: cfg.input.segy.clone(),
            shapefile: cfg.input.shapefile.clone(),
            selection: (cfg.profile.field.clone(), cfg.profile.value.clone()),
            output: cfg.output.segy.clone(),
            n_traces: profile.n_traces(),
            n_samples: profile.n_samples(),
            cdp_range: (
                profile.cdp().first().copied().unwrap_or_default(),
                profile.cdp().last().copied().unwrap_or_default(),
            ),
            line_length: resampled.length,
            line_parts: line.num_parts(),
            cdp_spacing: resampled.spacing(),
            first_point: resampled.points.first().copied().unwrap_or(Point2D::ZERO),
            last_point: resampled.points.last().copied().unwrap_or(Point2D::ZERO),
            scalar: summary.scalar,
            sample_format: summary.format.code(),
            varying_before: before.varying().into_iter().map(VaryingField::from).collect(),
            varying_after: verification
                .scan
                .varying()
                .into_iter()
                .map(VaryingField::from)
                .collect(),
            validation: verification.report,
            extra_outputs,
        };

        if let Some(path) = &cfg.output.report {
            report.save_json(path)?;
            info!("运行报告: {}", path.display());
        }

        if report.validation.has_errors() {
            let first = report
                .validation
                .errors
                .first()
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(WorkflowError::Verification {
                errors: report.validation.error_count(),
                first,
            }
            .at(ReassignStage::VerifyOutput));
        }
        Ok(report)
    }

    fn write_output(
        &self,
        profile: &SeismicProfile,
        map: &TraceHeaderMap,
    ) -> WorkflowResult<WriteSummary> {
        let cfg = &self.config;
        let scalar = cfg
            .output
            .coord_scalar
            .map_or(CoordinateScalar::Auto, CoordinateScalar::Fixed);
        let mut writer = SegyWriter::new(map.clone()).with_scalar(scalar);
        if let Some(format) = output_format(cfg)? {
            writer = writer.with_format(format);
        }
        if cfg.output.stamp_textual_header {
            let source = cfg
                .input
                .shapefile
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writer = writer.with_provenance(format!(
                "CDP XY FROM {source} {}={} {}",
                cfg.profile.field,
                cfg.profile.value,
                Local::now().format("%Y-%m-%d")
            ));
        }
        Ok(writer.write(profile, &cfg.output.segy)?)
    }

    fn write_extras(
        &self,
        profile: &SeismicProfile,
        line: &Polyline,
        resampled: &ResampledLine,
    ) -> WorkflowResult<Vec<PathBuf>> {
        let cfg = &self.config;
        let mut written = Vec::new();

        if let Some(path) = &cfg.output.geojson {
            export_cdp_geojson(
                path,
                line,
                &cfg.profile.value,
                &resampled.points,
                profile.cdp(),
                &resampled.distances,
            )?;
            written.push(path.clone());
        }

        if let Some(path) = &cfg.output.cdp_shapefile {
            let mut shp = ShapefileWriter::new(
                ShapeType::Point,
                vec![
                    FieldDescriptor::numeric("CDP", 10, 0),
                    FieldDescriptor::numeric("TRACE", 10, 0),
                    FieldDescriptor::numeric("DIST", 16, 3),
                ],
            )?;
            for (trace, ((p, &cdp), &d)) in resampled
                .points
                .iter()
                .zip(profile.cdp())
                .zip(&resampled.distances)
                .enumerate()
            {
                shp.add(
                    ExportShape::Point(*p),
                    vec![
                        FieldValue::Number(f64::from(cdp)),
                        FieldValue::Number(trace as f64),
                        FieldValue::Number(d),
                    ],
                )?;
            }
            shp.write(path)?;
            written.push(path.with_extension("shp"));
        }
        Ok(written)
    }
}
