// src/audio/decoder.rs

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

use crate::audio::types::{AudioInfo, SampleBuffer};
use crate::error::{AudioError, Result};

/// Turns encoded bytes into a [`SampleBuffer`]
///
/// Codec support belongs to the implementation; the rest of the crate only
/// sees decoded samples. Tests swap in fakes that return synthetic buffers.
pub trait AudioDecoder: Send + Sync {
    /// Decode a complete in-memory file
    ///
    /// `hint` is a file extension (e.g. "mp3") used to speed up format
    /// detection. It is never enforced.
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<SampleBuffer>;
}

/// Decoder backed by symphonia
///
/// Supports: MP3, FLAC, WAV, OGG Vorbis, AAC, and more
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<SampleBuffer> {
        if bytes.is_empty() {
            return Err(AudioError::Decode("Input is empty".to_string()));
        }

        let source = Cursor::new(bytes.to_vec());
        decode_source(Box::new(source), hint)
    }
}

/// Decodes an audio file to PCM samples in memory
///
/// # Example
/// ```no_run
/// use audiocutter_lib::audio::decode_audio_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = decode_audio_file("interview.mp3")?;
/// println!("Loaded {} seconds of audio", audio.duration_seconds());
/// println!("Sample rate: {} Hz", audio.sample_rate());
/// println!("Channels: {}", audio.channel_count());
/// # Ok(())
/// # }
/// ```
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|e| AudioError::FileOpen {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    SymphoniaDecoder.decode(&bytes, extension_hint(path))
}

/// Get audio file metadata without decoding all samples
///
/// Much faster than decode_audio_file() for just getting duration/info
pub fn get_audio_info<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| AudioError::FileOpen {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let format = probe(Box::new(file), extension_hint(path))?;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("No audio track".to_string()))?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    // Calculate duration from frame count
    let duration_seconds = match (params.n_frames, params.sample_rate) {
        (Some(n_frames), Some(sr)) if sr > 0 => n_frames as f64 / sr as f64,
        _ => 0.0,
    };

    Ok(AudioInfo {
        duration_seconds,
        sample_rate,
        channels,
        format: format!("{:?}", params.codec),
        bit_depth: params.bits_per_sample.map(|b| b as u16),
    })
}

pub(crate) fn extension_hint(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn probe(source: Box<dyn MediaSource>, hint: Option<&str>) -> Result<Box<dyn FormatReader>> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut probe_hint = Hint::new();
    if let Some(extension) = hint {
        probe_hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&probe_hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::Decode(format!("Failed to probe format: {}", e)))?;

    Ok(probed.format)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Option<&str>) -> Result<SampleBuffer> {
    let mut format = probe(source, hint)?;

    // Find the default audio track (skip video/subtitle tracks)
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("No audio track found".to_string()))?;

    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("Sample rate not found".to_string()))?;

    // Some MP3s don't carry a channel layout; the first decoded packet does
    let declared_channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut channels: Vec<Vec<f32>> = declared_channels
        .map(|count| vec![Vec::new(); count])
        .unwrap_or_default();
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(format!("Failed to read packet: {}", e))),
        };

        // Skip packets from other tracks (e.g., video, album art)
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                // A corrupt frame; the rest of the stream is still usable
                warn!(error = msg, "skipping undecodable packet");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(AudioError::Decode(format!("Decode error: {}", e))),
        };

        let count = decoded.spec().channels.count();
        if channels.is_empty() {
            channels = vec![Vec::new(); count];
        } else if channels.len() != count {
            return Err(AudioError::Decode(format!(
                "Channel count changed mid-stream: {} -> {}",
                channels.len(),
                count
            )));
        }

        append_decoded(&decoded, &mut channels);
    }

    if channels.is_empty() {
        return Err(AudioError::Decode(
            "Could not determine channel count".to_string(),
        ));
    }

    debug!(
        sample_rate,
        channels = channels.len(),
        frames = channels[0].len(),
        skipped,
        "decoded audio"
    );

    SampleBuffer::new(sample_rate, channels)
}

/// Append symphonia's planar buffer onto our per-channel vectors
///
/// Handles all sample formats (u8, i16, i32, f32, f64) and converts to f32
fn append_decoded(buffer: &AudioBufferRef, channels: &mut [Vec<f32>]) {
    match buffer {
        AudioBufferRef::F32(buf) => append_planes(&**buf, channels, |s| s),
        AudioBufferRef::F64(buf) => append_planes(&**buf, channels, |s| s as f32),

        // Signed integers to f32 in range [-1.0, 1.0]
        AudioBufferRef::S8(buf) => append_planes(&**buf, channels, |s| s as f32 / 128.0),
        AudioBufferRef::S16(buf) => append_planes(&**buf, channels, |s| s as f32 / 32768.0),
        AudioBufferRef::S24(buf) => {
            append_planes(&**buf, channels, |s| s.inner() as f32 / 8388608.0)
        }
        AudioBufferRef::S32(buf) => {
            append_planes(&**buf, channels, |s| s as f32 / 2147483648.0)
        }

        // Unsigned integers are offset by half their range
        AudioBufferRef::U8(buf) => {
            append_planes(&**buf, channels, |s| (s as f32 - 128.0) / 128.0)
        }
        AudioBufferRef::U16(buf) => {
            append_planes(&**buf, channels, |s| (s as f32 - 32768.0) / 32768.0)
        }
        AudioBufferRef::U24(buf) => append_planes(&**buf, channels, |s| {
            (s.inner() as f32 - 8388608.0) / 8388608.0
        }),
        AudioBufferRef::U32(buf) => append_planes(&**buf, channels, |s| {
            (s as f64 - 2147483648.0) as f32 / 2147483648.0
        }),
    }
}

fn append_planes<S, F>(buffer: &AudioBuffer<S>, channels: &mut [Vec<f32>], convert: F)
where
    S: Sample,
    F: Fn(S) -> f32,
{
    for (plane, out) in buffer.planes().planes().iter().zip(channels.iter_mut()) {
        out.extend(plane.iter().map(|&s| convert(s)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    /// Build an in-memory 16-bit WAV with hound, interleaving `frames`
    fn wav_bytes(sample_rate: u32, frames: &[Vec<i16>]) -> Vec<u8> {
        let channels = frames.first().map_or(1, |f| f.len()) as u16;
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for frame in frames {
                for &s in frame {
                    writer.write_sample(s).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let result = SymphoniaDecoder.decode(&[], Some("wav"));
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let garbage = vec![0x42u8; 512];
        let result = SymphoniaDecoder.decode(&garbage, None);
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }

    #[test]
    fn test_decode_stereo_wav_deinterleaves() {
        let frames: Vec<Vec<i16>> = (0..1000)
            .map(|i| vec![(i * 10) as i16, -((i * 10) as i16)])
            .collect();
        let bytes = wav_bytes(22050, &frames);

        let buffer = SymphoniaDecoder.decode(&bytes, Some("wav")).unwrap();

        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 1000);

        let left = buffer.channel(0).unwrap();
        let right = buffer.channel(1).unwrap();
        assert_eq!(left[0], 0.0);
        assert!((left[100] - 1000.0 / 32768.0).abs() < 1e-6);
        assert!((right[100] + 1000.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_without_hint() {
        let frames = vec![vec![0i16]; 800];
        let bytes = wav_bytes(8000, &frames);

        let buffer = SymphoniaDecoder.decode(&bytes, None).unwrap();
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.frame_count(), 800);
        assert!((buffer.duration_seconds() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_decode_file_and_info() {
        let frames = vec![vec![100i16, 200i16]; 44100];
        let path = std::env::temp_dir().join("audiocutter_test_decoder_info.wav");
        std::fs::write(&path, wav_bytes(44100, &frames)).unwrap();

        let info = get_audio_info(&path).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bit_depth, Some(16));
        assert!((info.duration_seconds - 1.0).abs() < 0.01);

        let buffer = decode_audio_file(&path).unwrap();
        assert_eq!(buffer.frame_count(), 44100);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_file_not_found() {
        let result = decode_audio_file("/nonexistent/audiocutter.wav");
        assert!(matches!(result, Err(AudioError::FileOpen { .. })));
    }
}
