// apps/sg_cli/src/commands/scan.rs

//! 道头扫描命令
//!
//! 统计各标准道头字段，默认只显示各道间变化的字段。

use anyhow::{Context, Result};
use clap::Args;
use sg_io::segy::{scan_headers, DEFAULT_SCAN_TRACES};
use std::path::PathBuf;
use tracing::info;

/// 扫描参数
#[derive(Args)]
pub struct ScanArgs {
    /// SEG-Y 文件
    pub segy: PathBuf,

    /// 显示全部字段（含不变字段）
    #[arg(long)]
    pub all: bool,

    /// 扫描道数
    #[arg(short = 'n', long, default_value_t = DEFAULT_SCAN_TRACES)]
    pub max_traces: usize,

    /// 扫描全部道
    #[arg(long, conflicts_with = "max_traces")]
    pub every_trace: bool,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 执行扫描命令
pub fn execute(args: ScanArgs) -> Result<()> {
    let max = if args.every_trace {
        None
    } else {
        Some(args.max_traces)
    };
    let scan = scan_headers(&args.segy, max)
        .with_context(|| format!("扫描失败: {}", args.segy.display()))?;
    info!(
        "{}: {} 道, 扫描 {} 道, {} 个变化字段",
        args.segy.display(),
        scan.total_traces,
        scan.scanned_traces,
        scan.varying().len()
    );

    let fields = if args.all {
        scan.fields.iter().collect()
    } else {
        scan.varying()
    };

    if args.json {
        let json = serde_json::json!({
            "path": scan.path,
            "total_traces": scan.total_traces,
            "scanned_traces": scan.scanned_traces,
            "fields": fields,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let mut table = String::new();
    scan.write_table(&mut table, &fields)?;
    println!(
        "{}: 扫描 {}/{} 道",
        scan.path.display(),
        scan.scanned_traces,
        scan.total_traces
    );
    print!("{table}");
    if fields.is_empty() {
        println!("（没有变化的字段）");
    }
    Ok(())
}
