//! Log/standard profile classification command

use crate::ClassifyArgs;
use super::open_pipeline;
use anyhow::Result;
use grade_pipeline::PipelineConfig;
use serde_json::json;
use tracing::trace;

pub fn run(args: ClassifyArgs, config: PipelineConfig) -> Result<()> {
    trace!(files = args.input.len(), "classify::run");
    let threshold = config.log_threshold;
    let pipeline = open_pipeline(config)?;

    let results: Vec<_> = args
        .input
        .iter()
        .map(|path| {
            let (class, stddev) = pipeline.classify_file(path);
            (path, class, stddev)
        })
        .collect();

    if args.json {
        let list: Vec<_> = results
            .iter()
            .map(|(path, class, stddev)| {
                json!({
                    "path": path.display().to_string(),
                    "class": class,
                    "stddev": stddev,
                    "threshold": threshold,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for (path, class, stddev) in results {
        println!("{}: {} (luma stddev {:.2})", path.display(), class, stddev);
    }
    Ok(())
}
