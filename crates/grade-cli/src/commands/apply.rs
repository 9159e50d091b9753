//! Single-image grading command

use crate::ApplyArgs;
use super::{build_plan, open_pipeline, save_image};
use anyhow::{Context, Result, bail};
use grade_pipeline::{GradeStatus, PipelineConfig};
use tracing::{info, trace};

pub fn run(args: ApplyArgs, config: PipelineConfig, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), "apply::run");

    let plan = build_plan(&args.plan)?;
    if args.strict {
        plan.validate().context("Invalid color plan")?;
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path(&args.input));
    let pipeline = open_pipeline(config)?;

    let outcome = pipeline.process_file(&args.input, &plan);
    if verbose > 0 {
        for step in &outcome.tone.steps {
            println!("  tone: {:?}", step);
        }
        for warning in &outcome.warnings {
            println!("  warning: {}", warning);
        }
    }

    let message = outcome.message();
    let Some(image) = outcome.image else {
        bail!("{}: {}", args.input.display(), message);
    };
    save_image(&output, &image)?;

    info!(input = %args.input.display(), output = %output.display(), status = %message, "graded");
    println!("{} -> {} ({})", args.input.display(), output.display(), message);
    if let GradeStatus::LutNotFound(name) = &outcome.status {
        eprintln!("Warning: LUT '{}' not found, saved without it", name);
    }
    Ok(())
}
