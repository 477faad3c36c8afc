// apps/sg_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示 SEG-Y 文本头、二进制头与道数，或默认作业配置。

use anyhow::{Context, Result};
use clap::Args;
use sg_config::ReassignConfig;
use sg_io::segy::SegyReader;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// SEG-Y 文件
    pub segy: Option<PathBuf>,

    /// 不显示文本头
    #[arg(long)]
    pub no_textual: bool,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== SeisGeo 信息 ===");

    if let Some(path) = &args.segy {
        print_segy_info(path, !args.no_textual)?;
    }

    if args.defaults || args.segy.is_none() {
        print_default_config()?;
    }

    Ok(())
}

fn print_segy_info(path: &PathBuf, textual: bool) -> Result<()> {
    let reader =
        SegyReader::open(path).with_context(|| format!("无法打开 {}", path.display()))?;
    let endian = reader.endian();

    println!("=== {} ===", path.display());
    if textual {
        println!("文本头 ({:?}):", reader.textual().encoding());
        for line in reader.textual().lines() {
            println!("  {}", line.trim_end());
        }
    }

    println!("\n二进制头:");
    for (field, value) in reader.binary().fields(endian) {
        println!("  {:<36} {:>5}  {}", field.name, field.byte, value);
    }

    println!("\n字节序: {:?}", endian);
    println!("采样格式: {} ({})", reader.format().name(), reader.format().code());
    println!("扩展文本头: {}", reader.extended_count());
    println!("道数: {}", reader.n_traces());
    println!("每道采样点数: {}", reader.n_samples());
    println!(
        "采样间隔: {} µs",
        reader.binary().sample_interval(endian)
    );
    Ok(())
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let config = ReassignConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
