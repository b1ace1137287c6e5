use serde::{Deserialize, Serialize};

use crate::error::{AudioError, Result};

/// Decoded audio held in memory as planar PCM
///
/// Each channel is its own `Vec<f32>` of exactly `frame_count` samples,
/// nominally in [-1.0, 1.0]. Out-of-range values are kept as decoded and
/// only clamped when encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Create a buffer from per-channel sample data
    ///
    /// Fails if the sample rate is zero, there are no channels, or the
    /// channels differ in length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::Decode("Sample rate must be at least 1 Hz".to_string()));
        }

        let frames = match channels.first() {
            Some(first) => first.len(),
            None => {
                return Err(AudioError::Decode(
                    "Audio must have at least one channel".to_string(),
                ))
            }
        };

        if let Some((index, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(AudioError::Decode(format!(
                "Channel {} has {} frames, expected {}",
                index,
                ch.len(),
                frames
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// A zero-length buffer with the given layout
    pub fn empty(sample_rate: u32, channel_count: usize) -> Result<Self> {
        Self::new(sample_rate, vec![Vec::new(); channel_count])
    }

    /// Build a buffer without validating its layout
    ///
    /// Only useful for exercising the encoder's own metadata checks.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Sample rate in Hz (e.g., 44100, 48000)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Total duration in seconds
    ///
    /// Duration = frame_count / sample_rate
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

/// A [start, end) selection in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,
}

impl TrimRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The whole of `buffer`, [0, duration)
    pub fn full(buffer: &SampleBuffer) -> Self {
        Self::new(0.0, buffer.duration_seconds())
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// True when the range selects nothing (`start >= end`)
    pub fn is_degenerate(&self) -> bool {
        !(self.start < self.end)
    }
}

/// Metadata about an audio file without loading all samples
///
/// Use this for quick info queries without decoding the entire file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Total duration in seconds (0.0 when the container doesn't say)
    pub duration_seconds: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,

    /// Audio format/codec name (e.g., "MP3", "FLAC", "Vorbis")
    pub format: String,

    /// Bit depth if available (e.g., 16, 24)
    pub bit_depth: Option<u16>,
}

/// Min/max amplitude pairs for drawing a waveform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformPeaks {
    pub min_peaks: Vec<f32>,
    pub max_peaks: Vec<f32>,
    pub num_peaks: usize,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_ragged_channels() {
        let result = SampleBuffer::new(44100, vec![vec![0.0; 10], vec![0.0; 9]]);
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }

    #[test]
    fn test_short_second_channel_is_rejected() {
        let result = SampleBuffer::new(10, vec![vec![0.0; 100], vec![0.0; 5]]);
        match result {
            Err(AudioError::Decode(msg)) => assert!(msg.contains("Channel 1 has 5 frames")),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_bad_layout() {
        assert!(SampleBuffer::new(0, vec![vec![0.0; 4]]).is_err());
        assert!(SampleBuffer::new(8000, Vec::new()).is_err());
    }

    #[test]
    fn test_duration_and_frames() {
        let buffer = SampleBuffer::new(8000, vec![vec![0.0; 16000], vec![0.0; 16000]]).unwrap();

        assert_eq!(buffer.frame_count(), 16000);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.duration_seconds(), 2.0);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_range_degenerate() {
        assert!(TrimRange::new(5.0, 5.0).is_degenerate());
        assert!(TrimRange::new(6.0, 5.0).is_degenerate());
        assert!(TrimRange::new(f64::NAN, 5.0).is_degenerate());
        assert!(!TrimRange::new(0.0, 0.1).is_degenerate());
        assert_eq!(TrimRange::new(6.0, 5.0).duration(), 0.0);
    }
}
