// apps/sg_cli/src/commands/assign.rs

//! 坐标重赋值命令
//!
//! 先加载配置文件（缺省为内置默认值），再用命令行参数覆盖。

use anyhow::{Context, Result};
use clap::Args;
use sg_config::{OutputSampleFormat, ReassignConfig};
use sg_io::segy::{CDP_X, CDP_Y};
use sg_workflow::CoordinateReassignment;
use std::path::PathBuf;
use tracing::info;

/// 坐标重赋值参数
#[derive(Args)]
pub struct AssignArgs {
    /// 配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输入 SEG-Y
    #[arg(short, long)]
    pub segy: Option<PathBuf>,

    /// 测线 Shapefile
    #[arg(long)]
    pub shapefile: Option<PathBuf>,

    /// 测线名称字段
    #[arg(short, long)]
    pub field: Option<String>,

    /// 测线名称
    #[arg(short, long)]
    pub profile: Option<String>,

    /// 输出 SEG-Y
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// CDP 编号所在字节
    #[arg(long)]
    pub cdp_byte: Option<u16>,

    /// cdp_x 写入字节
    #[arg(long)]
    pub x_byte: Option<u16>,

    /// cdp_y 写入字节
    #[arg(long)]
    pub y_byte: Option<u16>,

    /// 坐标比例因子（负值为除数），缺省自动选择
    #[arg(long, allow_hyphen_values = true)]
    pub scalar: Option<i16>,

    /// 输出采样格式 (input, ibm, int32, int16, ieee32, ieee64, int8)
    #[arg(long)]
    pub format: Option<OutputSampleFormat>,

    /// 导出 CDP 位置 GeoJSON
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// 导出 CDP 位置点 Shapefile
    #[arg(long)]
    pub cdp_shapefile: Option<PathBuf>,

    /// 运行报告 (JSON)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// 不在文本头记录来源
    #[arg(long)]
    pub no_stamp: bool,

    /// 把最终配置保存到文件
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl AssignArgs {
    /// 合并配置文件与命令行参数
    fn resolve(self) -> Result<(ReassignConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => ReassignConfig::from_file(path)
                .with_context(|| format!("无法加载配置 {}", path.display()))?,
            None => ReassignConfig::default(),
        };

        if let Some(v) = self.segy {
            config.input.segy = v;
        }
        if let Some(v) = self.shapefile {
            config.input.shapefile = v;
        }
        if let Some(v) = self.cdp_byte {
            config.input.cdp_byte = v;
        }
        if let Some(v) = self.field {
            config.profile.field = v;
        }
        if let Some(v) = self.profile {
            config.profile.value = v;
        }
        if let Some(v) = self.output {
            config.output.segy = v;
        }
        if let Some(v) = self.x_byte {
            config.output.trace_header_map.insert(CDP_X.to_string(), v);
        }
        if let Some(v) = self.y_byte {
            config.output.trace_header_map.insert(CDP_Y.to_string(), v);
        }
        if self.scalar.is_some() {
            config.output.coord_scalar = self.scalar;
        }
        if let Some(v) = self.format {
            config.output.sample_format = v;
        }
        if self.geojson.is_some() {
            config.output.geojson = self.geojson;
        }
        if self.cdp_shapefile.is_some() {
            config.output.cdp_shapefile = self.cdp_shapefile;
        }
        if self.report.is_some() {
            config.output.report = self.report;
        }
        if self.no_stamp {
            config.output.stamp_textual_header = false;
        }
        Ok((config, self.save_config))
    }
}

/// 执行坐标重赋值命令
pub fn execute(args: AssignArgs) -> Result<()> {
    info!("=== SeisGeo 坐标重赋值 ===");

    let (config, save_to) = args.resolve()?;
    config.validate().context("配置无效")?;

    if let Some(path) = &save_to {
        config
            .save_to_file(path)
            .with_context(|| format!("无法保存配置 {}", path.display()))?;
        info!("配置已保存: {}", path.display());
    }

    info!(
        "输入 {} / {} [{} == \"{}\"] -> {}",
        config.input.segy.display(),
        config.input.shapefile.display(),
        config.profile.field,
        config.profile.value,
        config.output.segy.display()
    );

    let job = CoordinateReassignment::new(config)?;
    let report = job.run().context("坐标重赋值失败")?;
    println!("{report}");
    Ok(())
}
