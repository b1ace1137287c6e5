use clap::Parser;
use std::path::PathBuf;

use audiocutter_lib::{ShellOptions, DEFAULT_NUM_PEAKS};

/// Interactive audio cutter: load a file, pick a range, save it as WAV
#[derive(Parser, Debug)]
#[command(name = "audiocutter")]
#[command(about = "Cut a range out of an audio file and save it as WAV", long_about = None)]
struct Args {
    /// Directory `save` writes trimmed-audio.wav into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of waveform peaks `peaks` prints by default
    #[arg(short, long, default_value_t = DEFAULT_NUM_PEAKS)]
    peaks: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't mix with shell output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("audiocutter_lib=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    audiocutter_lib::run(ShellOptions {
        output_dir: args.output_dir,
        num_peaks: args.peaks,
    })
    .await?;

    Ok(())
}
