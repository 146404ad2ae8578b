use clap::Parser;
use std::path::PathBuf;

use karasu::batch::run_batch;
use karasu::config::Config;

/// Karasu - batch image transformation pipeline
#[derive(Parser, Debug)]
#[command(name = "karasu")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "Accepted inputs: jpg, jpeg, png, webp, gif, avif, tiff, svg.\n\
                  AVIF is accepted for output only; AVIF inputs cannot be decoded\n\
                  by this build and are counted as per-file errors."
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Input directory of images to process
    #[arg(short, long, default_value = "input")]
    input: PathBuf,

    /// Output directory for processed images (created if absent)
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

fn main() {
    karasu::logging::init_subscriber().expect("Failed to initialize logging subsystem");

    let args = Args::parse();

    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    tracing::info!(
        config_file = %args.config.display(),
        input = %args.input.display(),
        output = %args.output.display(),
        format = %config.format,
        quality = config.quality,
        resize_enabled = config.resize.enabled,
        watermark_enabled = config.watermark.enabled,
        "Configuration loaded successfully"
    );

    match run_batch(&config, &args.input, &args.output) {
        Ok(stats) => {
            print!("{}", stats.render_report(config.watermark.enabled));
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
