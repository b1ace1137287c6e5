// src/audio/encoder.rs

use std::path::Path;

use crate::audio::types::SampleBuffer;
use crate::error::{AudioError, Result};

/// Size of the canonical RIFF/WAVE header we emit
pub const WAV_HEADER_LEN: usize = 44;

/// Suggested file name for a saved clip
pub const DEFAULT_OUTPUT_NAME: &str = "trimmed-audio.wav";

const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = 2;

/// The fields of a 16-bit PCM WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    /// Length of the `data` chunk payload in bytes
    pub data_len: u32,
}

impl WavHeader {
    /// Header describing `buffer` once interleaved as 16-bit PCM
    pub fn for_buffer(buffer: &SampleBuffer) -> Result<Self> {
        if buffer.channel_count() < 1 {
            return Err(AudioError::Encode("At least one channel is required".to_string()));
        }
        if buffer.sample_rate() < 1 {
            return Err(AudioError::Encode("Sample rate must be at least 1 Hz".to_string()));
        }

        // block_align (channels * 2) has to fit in a u16 as well
        let channels = u16::try_from(buffer.channel_count())
            .ok()
            .filter(|c| *c <= u16::MAX / 2)
            .ok_or_else(|| {
                AudioError::Encode(format!("Too many channels: {}", buffer.channel_count()))
            })?;

        let data_len = (buffer.frame_count() as u64)
            .checked_mul(channels as u64 * BYTES_PER_SAMPLE as u64)
            .filter(|len| *len + WAV_HEADER_LEN as u64 - 8 <= u32::MAX as u64)
            .ok_or_else(|| AudioError::Encode("Audio is too long for a WAV file".to_string()))?;

        let header = Self {
            channels,
            sample_rate: buffer.sample_rate(),
            data_len: data_len as u32,
        };

        if header.sample_rate as u64 * header.block_align() as u64 > u32::MAX as u64 {
            return Err(AudioError::Encode(format!(
                "Byte rate overflows for {} Hz x {} channels",
                header.sample_rate, header.channels
            )));
        }

        Ok(header)
    }

    pub fn block_align(&self) -> u16 {
        self.channels * BYTES_PER_SAMPLE as u16
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Frames in the data chunk
    pub fn frame_count(&self) -> usize {
        match self.block_align() {
            0 => 0,
            align => self.data_len as usize / align as usize,
        }
    }

    /// Total file length, header included
    pub fn file_len(&self) -> usize {
        WAV_HEADER_LEN + self.data_len as usize
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];
        let riff_len = self.data_len + (WAV_HEADER_LEN as u32 - 8);

        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&riff_len.to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");

        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&16u32.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());

        out
    }

    /// Read back a header in exactly the layout [`WavHeader::to_bytes`] writes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(AudioError::Decode(format!(
                "WAV header needs {} bytes, got {}",
                WAV_HEADER_LEN,
                bytes.len()
            )));
        }

        let tag = |at: usize| &bytes[at..at + 4];
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        if tag(0) != b"RIFF" || tag(8) != b"WAVE" {
            return Err(AudioError::Decode("Not a RIFF/WAVE file".to_string()));
        }
        if tag(12) != b"fmt " || u32_at(16) != 16 {
            return Err(AudioError::Decode("Missing 16-byte fmt chunk".to_string()));
        }
        if u16_at(20) != FORMAT_PCM || u16_at(34) != BITS_PER_SAMPLE {
            return Err(AudioError::Decode(format!(
                "Expected 16-bit PCM, got format {} at {} bits",
                u16_at(20),
                u16_at(34)
            )));
        }
        if tag(36) != b"data" {
            return Err(AudioError::Decode("Missing data chunk".to_string()));
        }

        Ok(Self {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            data_len: u32_at(40),
        })
    }
}

/// Quantize one float sample to signed 16-bit
///
/// Clamped to [-1.0, 1.0], then negatives scale by 32768 and the rest by
/// 32767, truncating toward zero. NaN becomes 0.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = (sample as f64).clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode PCM audio data to WAV bytes
///
/// Always 16-bit signed little-endian PCM: a 44-byte header followed by
/// frame-interleaved samples, nothing else. The same buffer always produces
/// the same bytes.
///
/// # Example
/// ```
/// use audiocutter_lib::audio::{encode_wav, SampleBuffer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = SampleBuffer::new(44100, vec![vec![0.0, 0.5, -0.5, 1.0, -1.0]])?;
///
/// let bytes = encode_wav(&audio)?;
/// assert_eq!(bytes.len(), 44 + 5 * 2);
/// # Ok(())
/// # }
/// ```
pub fn encode_wav(audio: &SampleBuffer) -> Result<Vec<u8>> {
    let header = WavHeader::for_buffer(audio)?;

    let mut out = Vec::with_capacity(header.file_len());
    out.extend_from_slice(&header.to_bytes());

    let channels = audio.channels();
    for frame in 0..audio.frame_count() {
        for channel in channels {
            let sample = channel.get(frame).copied().ok_or_else(|| {
                AudioError::Encode(format!("Channel is missing frame {}", frame))
            })?;
            out.extend_from_slice(&quantize_sample(sample).to_le_bytes());
        }
    }

    Ok(out)
}

/// Encode and write the result to `output_path`
pub fn write_wav_file<P: AsRef<Path>>(audio: &SampleBuffer, output_path: P) -> Result<()> {
    let bytes = encode_wav(audio)?;
    std::fs::write(output_path, bytes)?;
    Ok(())
}
