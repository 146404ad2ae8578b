//! Run statistics accumulation and the end-of-run report.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::format::OutputFormat;
use crate::pipeline::ProcessedFile;

/// Accumulator for one batch run. Created at run start, updated after each
/// file's terminal outcome, rendered exactly once at run end.
pub struct RunStatistics {
    started: Instant,
    pub succeeded: u64,
    pub errored: u64,
    pub skipped: u64,
    pub watermarked: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    per_format: HashMap<OutputFormat, u64>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            succeeded: 0,
            errored: 0,
            skipped: 0,
            watermarked: 0,
            bytes_in: 0,
            bytes_out: 0,
            per_format: HashMap::new(),
        }
    }

    /// Files that went through the pipeline, successfully or not.
    pub fn processed(&self) -> u64 {
        self.succeeded + self.errored
    }

    pub fn record_success(&mut self, result: &ProcessedFile) {
        self.succeeded += 1;
        self.bytes_in += result.bytes_in;
        self.bytes_out += result.bytes_out;
        *self.per_format.entry(result.output_format).or_insert(0) += 1;
        if result.watermarked {
            self.watermarked += 1;
        }
    }

    pub fn record_error(&mut self) {
        self.errored += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Render the aggregate report for stdout.
    ///
    /// `watermark_enabled` controls whether the watermark line appears at
    /// all; a run without watermarking never mentions it.
    pub fn render_report(&self, watermark_enabled: bool) -> String {
        let mut out = String::new();

        out.push_str("\nBatch summary\n");
        out.push_str(&format!("  processed:  {}\n", self.processed()));
        out.push_str(&format!("  succeeded:  {}\n", self.succeeded));
        out.push_str(&format!("  errored:    {}\n", self.errored));
        out.push_str(&format!("  skipped:    {}\n", self.skipped));
        if watermark_enabled {
            out.push_str(&format!("  watermarked: {}\n", self.watermarked));
        }

        if !self.per_format.is_empty() {
            out.push_str("\nOutput formats\n");
            let mut formats: Vec<_> = self.per_format.iter().collect();
            formats.sort_by_key(|(format, _)| format.as_str());
            for (format, count) in formats {
                let pct = percentage(*count, self.succeeded);
                out.push_str(&format!("  {:<5} {} ({:.1}%)\n", format.as_str(), count, pct));
            }
        }

        if self.succeeded > 0 {
            let reduction = if self.bytes_in > 0 {
                100.0 - percentage(self.bytes_out, self.bytes_in)
            } else {
                0.0
            };
            out.push_str(&format!(
                "\nBytes: {} in, {} out ({:.1}% reduction)\n",
                format_bytes(self.bytes_in),
                format_bytes(self.bytes_out),
                reduction,
            ));
        }

        let elapsed = self.elapsed();
        out.push_str(&format!("\nElapsed: {:.2}s", elapsed.as_secs_f64()));
        if self.processed() > 0 {
            out.push_str(&format!(
                " ({:.2}s per file)",
                elapsed.as_secs_f64() / self.processed() as f64
            ));
        }
        out.push('\n');

        out
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn processed(format: OutputFormat, bytes_in: u64, bytes_out: u64, marked: bool) -> ProcessedFile {
        ProcessedFile {
            output_path: PathBuf::from("/tmp/out.jpeg"),
            output_format: format,
            bytes_in,
            bytes_out,
            width: 100,
            height: 100,
            watermarked: marked,
        }
    }

    #[test]
    fn test_counts_accumulate() {
        let mut stats = RunStatistics::new();
        stats.record_success(&processed(OutputFormat::Jpeg, 1000, 400, true));
        stats.record_success(&processed(OutputFormat::WebP, 2000, 600, false));
        stats.record_error();
        stats.record_skipped();

        assert_eq!(stats.processed(), 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.errored, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.watermarked, 1);
        assert_eq!(stats.bytes_in, 3000);
        assert_eq!(stats.bytes_out, 1000);
    }

    #[test]
    fn test_empty_run_report_has_no_division_artifacts() {
        let stats = RunStatistics::new();
        let report = stats.render_report(false);
        assert!(report.contains("processed:  0"));
        assert!(!report.contains("NaN"));
        assert!(!report.contains("watermarked"));
        assert!(!report.contains("per file"));
    }

    #[test]
    fn test_watermark_line_only_when_enabled() {
        let mut stats = RunStatistics::new();
        stats.record_success(&processed(OutputFormat::Jpeg, 100, 50, true));
        assert!(stats.render_report(true).contains("watermarked: 1"));
        assert!(!stats.render_report(false).contains("watermarked"));
    }

    #[test]
    fn test_format_breakdown_percentages() {
        let mut stats = RunStatistics::new();
        stats.record_success(&processed(OutputFormat::Jpeg, 100, 50, false));
        stats.record_success(&processed(OutputFormat::Jpeg, 100, 50, false));
        stats.record_success(&processed(OutputFormat::Png, 100, 50, false));
        stats.record_error();

        let report = stats.render_report(false);
        assert!(report.contains("jpeg  2 (66.7%)"));
        assert!(report.contains("png   1 (33.3%)"));
    }

    #[test]
    fn test_byte_reduction() {
        let mut stats = RunStatistics::new();
        stats.record_success(&processed(OutputFormat::Jpeg, 1000, 250, false));
        let report = stats.render_report(false);
        assert!(report.contains("75.0% reduction"));
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
