// src/audio/mod.rs

pub mod decoder;
pub mod encoder;
pub mod trim;
pub mod types;
pub mod waveform;

// Re-export commonly used items
pub use decoder::{decode_audio_file, get_audio_info, AudioDecoder, SymphoniaDecoder};
pub use encoder::{
    encode_wav, quantize_sample, write_wav_file, WavHeader, DEFAULT_OUTPUT_NAME, WAV_HEADER_LEN,
};
pub use trim::trim_audio;
pub use types::{AudioInfo, SampleBuffer, TrimRange, WaveformPeaks};
pub use waveform::{compute_peaks, DEFAULT_NUM_PEAKS};
