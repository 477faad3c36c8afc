// apps/sg_cli/src/commands/profiles.rs

//! 测线列表命令

use anyhow::{Context, Result};
use clap::Args;
use sg_io::shapefile::FeatureCollection;
use std::path::PathBuf;
use tracing::{info, warn};

/// 测线列表参数
#[derive(Args)]
pub struct ProfilesArgs {
    /// Shapefile (.shp)
    pub shapefile: PathBuf,

    /// 作为测线名称的属性字段
    #[arg(short, long, default_value = "N_PROF")]
    pub field: String,
}

/// 执行测线列表命令
pub fn execute(args: ProfilesArgs) -> Result<()> {
    let fc = FeatureCollection::read(&args.shapefile)
        .with_context(|| format!("无法读取 {}", args.shapefile.display()))?;
    info!(
        "{}: {} 个要素, 类型 {}",
        args.shapefile.display(),
        fc.len(),
        fc.shape_type
    );

    let names = fc.field_names();
    if !names.iter().any(|n| n == &args.field) {
        warn!("字段 {} 不存在, 可用字段: {}", args.field, names.join(", "));
    }

    println!(
        "范围: x [{:.3}, {:.3}], y [{:.3}, {:.3}]",
        fc.bbox.min_x, fc.bbox.max_x, fc.bbox.min_y, fc.bbox.max_y
    );
    println!(
        "{:>5}  {:<20} {:>6} {:>8} {:>14}",
        "#", args.field, "parts", "vertices", "length"
    );
    for feature in &fc.features {
        let name = feature
            .attribute(&args.field)
            .map(ToString::to_string)
            .unwrap_or_default();
        match feature.polyline() {
            Ok(line) => println!(
                "{:>5}  {:<20} {:>6} {:>8} {:>14.3}",
                feature.index,
                name,
                line.num_parts(),
                line.num_vertices(),
                line.length()
            ),
            Err(_) => println!(
                "{:>5}  {:<20} {:>6} {:>8} {:>14}",
                feature.index,
                name,
                "-",
                feature.shape.num_points(),
                feature.shape.kind()
            ),
        }
    }
    Ok(())
}
