//! Batch grading command

use crate::BatchArgs;
use super::{build_plan, open_pipeline};
use anyhow::{Result, bail};
use grade_pipeline::{ItemResult, PipelineConfig};
use std::path::PathBuf;
use tracing::{info, trace};

pub fn run(args: BatchArgs, mut config: PipelineConfig, verbose: u8) -> Result<()> {
    trace!(pattern = %args.input, "batch::run");

    let files: Vec<PathBuf> = glob::glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        bail!("No files match pattern: {}", args.input);
    }

    info!(files = files.len(), pattern = %args.input, "Starting batch grading");
    if verbose > 0 {
        println!("Found {} files matching '{}'", files.len(), args.input);
    }

    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(prefix) = args.prefix {
        config.output_prefix = prefix;
    }
    let plan = build_plan(&args.plan)?;
    let pipeline = open_pipeline(config)?;

    let report = pipeline.process_batch(&files, &plan);

    for item in &report.items {
        match (item.result, &item.output) {
            (ItemResult::Failed, _) | (_, None) => {
                eprintln!("Error: {}: {}", item.input.display(), item.message)
            }
            (ItemResult::Degraded, Some(out)) => {
                eprintln!("Warning: {} -> {} ({})", item.input.display(), out.display(), item.message)
            }
            (ItemResult::Graded, Some(out)) if verbose > 0 => {
                println!("{} -> {}", item.input.display(), out.display())
            }
            _ => {}
        }
    }

    let stats = pipeline.cache().stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        hit_rate = format!("{:.1}%", stats.hit_rate()),
        "LUT cache"
    );
    println!(
        "Processed: {} graded, {} degraded, {} failed",
        report.graded(),
        report.degraded(),
        report.failed()
    );

    if !report.all_written() {
        bail!("{} files failed", report.failed());
    }

    Ok(())
}
