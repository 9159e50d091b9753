//! CLI command implementations

pub mod analyze;
pub mod apply;
pub mod batch;
pub mod classify;
pub mod luts;

use crate::PlanArgs;
use anyhow::{Context, Result, bail};
use grade_pipeline::{ColorPlan, CurveSpec, Pipeline, PipelineConfig};
use image::RgbImage;
use std::path::Path;

/// Build the pipeline, indexing the LUT library
pub fn open_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    let root = config.lut_root.clone();
    Pipeline::new(config)
        .with_context(|| format!("Failed to initialize pipeline (LUT root: {})", root.display()))
}

/// Load image from path
pub fn load_image(path: &Path) -> Result<RgbImage> {
    grade_pipeline::io::load_rgb(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &RgbImage) -> Result<()> {
    grade_pipeline::io::save_rgb(image, path)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Color plan from `--plan` with command-line overrides on top.
pub fn build_plan(args: &PlanArgs) -> Result<ColorPlan> {
    let mut plan = match &args.plan {
        Some(path) => ColorPlan::load(path)
            .with_context(|| format!("Failed to load plan: {}", path.display()))?,
        None => ColorPlan::default(),
    };

    if let Some(lut) = &args.lut {
        plan.primary_lut = Some(lut.clone());
    }
    if let Some(lut) = &args.secondary {
        plan.secondary_lut = Some(lut.clone());
    }
    let overrides = [
        (&mut plan.mix, args.mix),
        (&mut plan.intensity, args.intensity),
        (&mut plan.brightness, args.brightness),
        (&mut plan.contrast, args.contrast),
        (&mut plan.saturation, args.saturation),
        (&mut plan.temperature, args.temperature),
        (&mut plan.tint, args.tint),
        (&mut plan.curve_intensity, args.curve_intensity),
        (&mut plan.sharpness, args.sharpness),
    ];
    for (field, value) in overrides {
        if let Some(v) = value {
            *field = v;
        }
    }
    if let Some(name) = &args.curve {
        plan.tone_curve = Some(CurveSpec::Named(name.clone()));
    }
    if let Some(points) = &args.curve_points {
        plan.tone_curve = Some(CurveSpec::Points(parse_points(points)?));
    }
    if args.log_sim {
        plan.log_simulation = true;
    }
    Ok(plan)
}

/// Parse "x:y,x:y,..." control points
pub fn parse_points(s: &str) -> Result<Vec<[f32; 2]>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let Some((x, y)) = pair.split_once(':') else {
                bail!("Invalid curve point '{}', expected x:y", pair);
            };
            let x: f32 = x.trim().parse().with_context(|| format!("Invalid x in '{}'", pair))?;
            let y: f32 = y.trim().parse().with_context(|| format!("Invalid y in '{}'", pair))?;
            Ok([x, y])
        })
        .collect()
}
