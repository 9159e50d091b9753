//! Image statistics command

use crate::AnalyzeArgs;
use super::load_image;
use anyhow::Result;
use grade_ops::{ImageStats, analyze};
use grade_pipeline::PipelineConfig;
use serde_json::json;
use tracing::trace;

pub fn run(args: AnalyzeArgs, config: PipelineConfig) -> Result<()> {
    trace!(files = args.input.len(), "analyze::run");

    let mut reports = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let image = load_image(path)?;
        let stats = ImageStats::analyze(&image);
        let (class, stddev) = analyze::classify_with_threshold(&image, config.log_threshold);

        if args.json {
            reports.push(json!({
                "path": path.display().to_string(),
                "width": image.width(),
                "height": image.height(),
                "class": class,
                "luma_stddev": stddev,
                "stats": stats,
            }));
            continue;
        }

        let tone = if stats.wb_ratio > 1.0 { "warm" } else { "cool" };
        println!("{}", path.display());
        println!("  size:       {}x{}", image.width(), image.height());
        println!("  brightness: {:.1}", stats.brightness);
        println!("  contrast:   {:.1}", stats.contrast);
        println!("  wb ratio:   {:.3} ({})", stats.wb_ratio, tone);
        println!("  saturation: {:.1}", stats.saturation);
        println!("  profile:    {} (luma stddev {:.2})", class, stddev);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}
