// src/bin/audio_trim.rs

use clap::Parser;
use audiocutter_lib::audio::{
    decode_audio_file, get_audio_info, trim_audio, write_wav_file, TrimRange, WavHeader,
};

/// Command-line tool for trimming audio files
#[derive(Parser, Debug)]
#[command(name = "audio-trim")]
#[command(about = "Trim audio files to a specific time range", long_about = None)]
struct Args {
    /// Input audio file (MP3, FLAC, WAV, OGG, etc.)
    #[arg(short, long)]
    input: String,

    /// Output WAV file
    #[arg(short, long, default_value = audiocutter_lib::audio::DEFAULT_OUTPUT_NAME)]
    output: String,

    /// Start time in seconds
    #[arg(short, long)]
    start: f64,

    /// End time in seconds
    #[arg(short, long)]
    end: f64,

    /// Show detailed information
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("audiocutter_lib=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("🎵 Audio Trimmer");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Step 1: Get audio info
    let info = get_audio_info(&args.input)?;

    println!("\n📊 Input File: {}", args.input);
    println!("   Duration: {:.2} seconds ({:.2} minutes)",
        info.duration_seconds, info.duration_seconds / 60.0);
    println!("   Sample Rate: {} Hz", info.sample_rate);
    println!("   Channels: {}", info.channels);
    println!("   Format: {}", info.format);

    // Step 2: Validate the range
    let range = TrimRange::new(args.start, args.end);

    if range.is_degenerate() {
        anyhow::bail!("End time ({:.2}s) must be after start time ({:.2}s)", range.end, range.start);
    }

    // Containers don't always report a duration; 0.0 means unknown
    if info.duration_seconds > 0.0 && range.end > info.duration_seconds {
        anyhow::bail!("Trim end time ({:.2}s) exceeds audio duration ({:.2}s)",
            range.end, info.duration_seconds);
    }

    println!("\n✂️  Trim Range:");
    println!("   Start: {:.2}s", range.start);
    println!("   End: {:.2}s", range.end);
    println!("   Duration: {:.2}s", range.duration());

    // Step 3: Decode audio
    println!("\n🔊 Decoding audio...");
    let start_time = std::time::Instant::now();
    let audio = decode_audio_file(&args.input)?;

    if args.verbose {
        let samples = audio.frame_count() * audio.channel_count();
        println!("   Loaded {} samples ({:.2} MB)",
            samples, (samples * 4) as f64 / 1_048_576.0);
        println!("   Decode time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    // Step 4: Trim audio
    println!("\n✂️  Trimming audio...");
    let trimmed = trim_audio(&audio, &range)?;

    if args.verbose {
        println!("   Trimmed to {} frames", trimmed.frame_count());
        println!("   New duration: {:.2}s", trimmed.duration_seconds());
    }

    // Step 5: Encode to WAV
    println!("\n💾 Encoding to WAV...");
    let encode_start = std::time::Instant::now();
    write_wav_file(&trimmed, &args.output)?;

    if args.verbose {
        println!("   Wrote {} bytes", WavHeader::for_buffer(&trimmed)?.file_len());
        println!("   Encode time: {:.2}s", encode_start.elapsed().as_secs_f64());
    }

    println!("\n✅ Done! Output saved to: {}", args.output);
    println!("   Total time: {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}
