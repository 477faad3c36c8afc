// apps/sg_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证作业配置，并检查所引用的输入文件。

use anyhow::{bail, Result};
use clap::Args;
use sg_config::ReassignConfig;
use sg_io::segy::SegyReader;
use sg_io::shapefile::FeatureCollection;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 同时检查输入文件
    #[arg(long)]
    pub inputs: bool,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== SeisGeo 配置验证 ===");

    let mut result = ValidationResult::default();
    println!("\n检查配置文件: {}", args.config.display());

    match ReassignConfig::from_file(&args.config) {
        Ok(config) => {
            println!("  ✓ 配置有效");
            check_config(&config, &mut result);
            if args.inputs {
                check_inputs(&config, &mut result);
            }
        }
        Err(e) => result.add_error(e.to_string()),
    }

    print_validation_result(&result, args.strict)
}

fn check_config(config: &ReassignConfig, result: &mut ValidationResult) {
    for (name, &byte) in &config.output.trace_header_map {
        if sg_io::segy::field_at(byte).is_none() {
            result.add_warning(format!(
                "{name} 映射到字节 {byte}, 不是标准字段起点, 按 4 字节写入"
            ));
        }
    }
    if let Some(scalar) = config.output.coord_scalar {
        if scalar.unsigned_abs() > 10000 {
            result.add_warning(format!("比例因子 {scalar} 超出 SEG-Y 常用范围 ±10000"));
        }
    }
}

fn check_inputs(config: &ReassignConfig, result: &mut ValidationResult) {
    println!("\n检查 SEG-Y: {}", config.input.segy.display());
    match SegyReader::open(&config.input.segy) {
        Ok(reader) => println!(
            "  ✓ {} 道, {} 采样/道, 格式 {}",
            reader.n_traces(),
            reader.n_samples(),
            reader.format().name()
        ),
        Err(e) => result.add_error(e.to_string()),
    }

    println!("\n检查 Shapefile: {}", config.input.shapefile.display());
    match FeatureCollection::read(&config.input.shapefile) {
        Ok(fc) => match fc.select_polyline(&config.profile.field, &config.profile.value) {
            Ok(line) => println!(
                "  ✓ 测线 {}: {} 个顶点, 长度 {:.3}",
                config.profile.value,
                line.num_vertices(),
                line.length()
            ),
            Err(e) => result.add_error(e.to_string()),
        },
        Err(e) => result.add_error(e.to_string()),
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
