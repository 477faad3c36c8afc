// apps/sg_cli/src/main.rs

//! SeisGeo 命令行界面
//!
//! 把 Shapefile 测线坐标赋给 SEG-Y 剖面各道。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：
//! - 作业参数全部落在 `ReassignConfig`，命令行参数覆盖配置文件
//! - 流程由 `sg_workflow::CoordinateReassignment` 执行

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// SeisGeo SEG-Y 坐标重赋值工具
#[derive(Parser)]
#[command(name = "sg_cli")]
#[command(author = "SeisGeo Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assign shapefile profile coordinates to SEG-Y traces", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 扫描道头
    Scan(commands::scan::ScanArgs),
    /// 列出 Shapefile 中的测线
    Profiles(commands::profiles::ProfilesArgs),
    /// 执行坐标重赋值
    Assign(commands::assign::AssignArgs),
    /// 验证作业配置
    Validate(commands::validate::ValidateArgs),
    /// 显示 SEG-Y 文件信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args),
        Commands::Profiles(args) => commands::profiles::execute(args),
        Commands::Assign(args) => commands::assign::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
