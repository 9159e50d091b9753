//! LUT library inspection commands

use crate::LutsCommand;
use super::{load_image, open_pipeline};
use anyhow::{Context, Result, bail};
use grade_lut::{Lut3D, MatchKind, cube};
use grade_ops::{ImageClass, safety};
use grade_pipeline::{Candidates, PipelineConfig};
use std::path::Path;
use tracing::{info, trace};

pub fn run(command: LutsCommand, config: PipelineConfig, verbose: u8) -> Result<()> {
    match command {
        LutsCommand::List { paths } => list(config, paths),
        LutsCommand::Resolve { name } => resolve(config, &name),
        LutsCommand::Filter { image, class, names } => {
            filter(config, image.as_deref(), class.as_deref(), names, verbose)
        }
        LutsCommand::Identity { output, size, title } => {
            identity(&output, size as usize, title.as_deref())
        }
    }
}

fn list(config: PipelineConfig, paths: bool) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let catalog = pipeline.catalog();
    if paths {
        for path in catalog.list_paths() {
            println!("{}", path.display());
        }
    } else {
        for name in catalog.list_names() {
            println!("{}", name);
        }
    }
    eprintln!("{} LUTs in {}", catalog.len(), catalog.root().display());
    Ok(())
}

fn resolve(config: PipelineConfig, name: &str) -> Result<()> {
    trace!(name, "luts::resolve");
    let pipeline = open_pipeline(config)?;
    let resolved = pipeline
        .resolve(name)
        .with_context(|| format!("Cannot resolve '{}'", name))?;

    let how = match &resolved.matched {
        MatchKind::Path => "path".to_string(),
        MatchKind::Exact => "exact".to_string(),
        MatchKind::Fuzzy { key, score } => format!("fuzzy: {} ({:.2})", key, score),
    };
    println!("{} [{}]", resolved.path.display(), how);
    Ok(())
}

fn parse_class(name: &str) -> Result<ImageClass> {
    match name.to_ascii_lowercase().as_str() {
        "log" => Ok(ImageClass::Log),
        "standard" | "std" => Ok(ImageClass::Standard),
        other => bail!("Unknown class '{}', expected log or standard", other),
    }
}

fn filter(
    config: PipelineConfig,
    image: Option<&Path>,
    class: Option<&str>,
    names: Vec<String>,
    verbose: u8,
) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let names = if names.is_empty() { pipeline.list_names() } else { names };

    let (safe, rejected) = match (image, class) {
        (Some(path), _) => {
            let image = load_image(path)?;
            match pipeline.safe_candidates(&image, &names) {
                Candidates::Available(safe) => {
                    let rejected = names.iter().filter(|n| !safe.contains(n)).cloned().collect();
                    (safe, rejected)
                }
                Candidates::Exhausted { rejected } => (Vec::new(), rejected),
            }
        }
        (None, Some(class)) => safety::partition(&names, parse_class(class)?),
        (None, None) => bail!("Either --image or --class is required"),
    };

    info!(kept = safe.len(), rejected = rejected.len(), "LUT filter");
    for name in &safe {
        println!("{}", name);
    }
    if verbose > 0 {
        for name in &rejected {
            eprintln!("rejected: {}", name);
        }
    }

    if safe.is_empty() && !names.is_empty() {
        bail!("No safe LUT available ({} rejected)", rejected.len());
    }
    Ok(())
}

fn identity(output: &Path, size: usize, title: Option<&str>) -> Result<()> {
    let lut = Lut3D::identity(size)?.with_title(title.unwrap_or("Identity"));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create: {}", parent.display()))?;
    }
    cube::write_3d(output, &lut).with_context(|| format!("Failed to write: {}", output.display()))?;
    println!("Wrote {}^3 identity LUT to {}", size, output.display());
    Ok(())
}
