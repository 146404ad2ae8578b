// Logging module for structured logging using the tracing crate

use std::error::Error;

/// Initialize the tracing subscriber for structured logging.
///
/// Diagnostics go to stderr so the per-file lines and the end-of-run report
/// (program output) stay clean on stdout. The `RUST_LOG` environment
/// variable controls filtering; the default level is `info`.
pub fn init_subscriber() -> Result<(), Box<dyn Error + Send + Sync>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()?;

    Ok(())
}
