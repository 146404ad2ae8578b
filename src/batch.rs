//! Batch orchestration: enumerate the input set, run the pipeline per file
//! with fault isolation, and accumulate run statistics.

use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::FatalError;
use crate::format::is_supported_input;
use crate::pipeline::process_file;
use crate::stats::RunStatistics;
use crate::watermark::Watermark;

/// Process every supported image in `input_dir`, writing results to
/// `output_dir` (created if absent).
///
/// Files are processed strictly sequentially, in name order. Per-file
/// failures are counted and logged; only a failure to list the input
/// directory aborts the run.
pub fn run_batch(
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<RunStatistics, FatalError> {
    // Snapshot the entry list before the output directory exists, so an
    // output directory nested inside the input directory never shows up in
    // its own run's scan.
    let entries = std::fs::read_dir(input_dir).map_err(|e| {
        FatalError::new(format!(
            "Cannot list input directory {}: {}",
            input_dir.display(),
            e
        ))
    })?;
    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    std::fs::create_dir_all(output_dir).map_err(|e| {
        FatalError::new(format!(
            "Cannot create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let watermark = Watermark::from_config(&config.watermark);

    let mut stats = RunStatistics::new();
    let mut found_any = false;

    for path in paths {
        if path.is_dir() {
            stats.record_skipped();
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !is_supported_input(&ext) {
            warn!(file = %path.display(), "Skipping unsupported file");
            stats.record_skipped();
            continue;
        }

        found_any = true;

        match process_file(config, watermark.as_ref(), &path, output_dir) {
            Ok(result) => {
                println!(
                    "{} -> {} [{} {}x{}] {} -> {}",
                    path.display(),
                    result.output_path.display(),
                    result.output_format.as_str(),
                    result.width,
                    result.height,
                    result.bytes_in,
                    result.bytes_out,
                );
                stats.record_success(&result);
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Processing failed");
                stats.record_error();
            }
        }
    }

    if !found_any {
        info!(dir = %input_dir.display(), "No image files found in input directory");
    }

    Ok(stats)
}
