//! DrawKit 命令行入口
//! 后台线程解析 JSON 图纸，写入数据库后输出范围并绘制到记录渲染器

mod cli;
mod config;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use drawkit_exchange::prelude::*;
use drawkit_model::prelude::*;

use crate::cli::CliArgs;
use crate::config::CliConfig;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // 初始化日志
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())?;

    let config = CliConfig::load(args.config.as_deref())?;
    debug!("config: {:?}", config);

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let worker = Worker::spawn(JsonParseTask)?;
    let drawing = worker.run(text)?.into_result()?;
    info!(
        "Parsed {}: {} layers, {} blocks, {} entities",
        args.input.display(),
        drawing.layers.len(),
        drawing.blocks.len(),
        drawing.entities.len()
    );

    let db = Database::new();
    let entities = ObjectConverter::with_sampling(config.sampling).populate(&db, drawing)?;

    let mut extents = BoundingBox3::empty();
    for entity in &entities {
        let bounds = entity.geometric_extents();
        if args.list {
            println!(
                "{:<8} {:<10} {}",
                entity.type_name(),
                entity.base().object_id,
                format_bounds(&bounds)
            );
        }
        extents = extents.union(&bounds);
    }
    println!("extents: {}", format_bounds(&extents));

    let cache = RenderingCache::new();
    let mut renderer = RecordingRenderer::new();
    for entity in &entities {
        let layer = &entity.base().layer;
        if db
            .tables
            .layer_table
            .get_at(layer)
            .is_some_and(|layer| !layer.should_display())
        {
            debug!("skipping {} on hidden layer {}", entity.type_name(), layer);
            continue;
        }

        let mut ctx = DrawContext::new(&mut renderer, &cache);
        entity.draw(&mut ctx);
        if !config.use_block_cache {
            cache.clear();
        }
    }

    let stats = renderer.stats();
    println!(
        "rendered: {} lines, {} images, {} groups ({} cached blocks)",
        stats.lines,
        stats.images,
        stats.groups,
        cache.len()
    );

    Ok(())
}

fn format_bounds(bounds: &BoundingBox3) -> String {
    if bounds.is_empty() {
        return "(empty)".to_string();
    }
    format!(
        "({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    )
}
