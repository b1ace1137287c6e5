// src/audio/trim.rs

use crate::audio::types::{SampleBuffer, TrimRange};
use crate::error::{AudioError, Result};

/// Trim audio data to a specific time range
///
/// Frames `[floor(start * rate), floor(end * rate))`, clamped to the buffer,
/// are copied into a fresh buffer with the same rate and channel count. The
/// source is left untouched so it can be trimmed again with another range.
///
/// An inverted or zero-width range yields an empty buffer, not an error.
///
/// # Example
/// ```
/// use audiocutter_lib::audio::{trim_audio, SampleBuffer, TrimRange};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // 10 seconds of stereo at 44.1kHz
/// let original = SampleBuffer::new(44100, vec![vec![0.5; 441000]; 2])?;
///
/// let trimmed = trim_audio(&original, &TrimRange::new(5.0, 10.0))?;
///
/// assert_eq!(trimmed.duration_seconds(), 5.0);
/// assert_eq!(trimmed.sample_rate(), 44100);
/// assert_eq!(trimmed.channel_count(), 2);
/// # Ok(())
/// # }
/// ```
pub fn trim_audio(audio: &SampleBuffer, range: &TrimRange) -> Result<SampleBuffer> {
    if !(range.start >= 0.0) {
        return Err(AudioError::InvalidRange(format!(
            "Start time cannot be negative: {}",
            range.start
        )));
    }

    if !range.end.is_finite() {
        return Err(AudioError::InvalidRange(format!(
            "End time must be finite: {}",
            range.end
        )));
    }

    let total_frames = audio.frame_count();
    if total_frames == 0 {
        return Err(AudioError::InvalidRange(
            "Audio has no frames to trim".to_string(),
        ));
    }

    let start_frame = frame_index(range.start, audio.sample_rate(), total_frames);
    let end_frame = frame_index(range.end, audio.sample_rate(), total_frames);

    if end_frame <= start_frame {
        return SampleBuffer::empty(audio.sample_rate(), audio.channel_count());
    }

    let channels = audio
        .channels()
        .iter()
        .map(|ch| ch[start_frame..end_frame].to_vec())
        .collect();

    SampleBuffer::new(audio.sample_rate(), channels)
}

/// floor(seconds * sample_rate), clamped into [0, total_frames]
fn frame_index(seconds: f64, sample_rate: u32, total_frames: usize) -> usize {
    let frame = (seconds * sample_rate as f64).floor();
    if frame <= 0.0 {
        0
    } else {
        // Float -> usize saturates, so a huge `end` lands on total_frames
        (frame as usize).min(total_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create test audio data
    fn create_test_audio(duration_seconds: f64, sample_rate: u32, channels: usize) -> SampleBuffer {
        let frames = (duration_seconds * sample_rate as f64) as usize;
        SampleBuffer::new(sample_rate, vec![vec![0.5f32; frames]; channels]).unwrap()
    }

    /// A ramp so slices can be checked by value
    fn create_ramp(frames: usize, sample_rate: u32) -> SampleBuffer {
        let left: Vec<f32> = (0..frames).map(|i| i as f32).collect();
        let right: Vec<f32> = (0..frames).map(|i| -(i as f32)).collect();
        SampleBuffer::new(sample_rate, vec![left, right]).unwrap()
    }

    #[test]
    fn test_trim_middle_section() {
        let audio = create_test_audio(10.0, 44100, 2);

        // Trim from 3s to 7s (should give 4 seconds)
        let trimmed = trim_audio(&audio, &TrimRange::new(3.0, 7.0)).unwrap();

        assert_eq!(trimmed.duration_seconds(), 4.0);
        assert_eq!(trimmed.channel_count(), 2);
    }

    #[test]
    fn test_trim_copies_the_right_frames() {
        let audio = create_ramp(100, 10);

        let trimmed = trim_audio(&audio, &TrimRange::new(2.55, 4.0)).unwrap();

        // floor(25.5) = 25, floor(40) = 40
        assert_eq!(trimmed.frame_count(), 15);
        assert_eq!(trimmed.channel(0).unwrap()[0], 25.0);
        assert_eq!(trimmed.channel(0).unwrap()[14], 39.0);
        assert_eq!(trimmed.channel(1).unwrap()[0], -25.0);
    }

    #[test]
    fn test_trim_full_range_is_identity() {
        let audio = create_ramp(4410, 44100);

        let trimmed = trim_audio(&audio, &TrimRange::full(&audio)).unwrap();

        assert_eq!(trimmed, audio);
    }

    #[test]
    fn test_trim_does_not_mutate_source() {
        let audio = create_ramp(1000, 1000);
        let before = audio.clone();

        let first = trim_audio(&audio, &TrimRange::new(0.1, 0.2)).unwrap();
        let second = trim_audio(&audio, &TrimRange::new(0.5, 0.9)).unwrap();

        assert_eq!(audio, before);
        assert_eq!(first.frame_count(), 100);
        assert_eq!(second.frame_count(), 400);
    }

    #[test]
    fn test_trim_length_law() {
        let audio = create_test_audio(3.0, 44100, 1);
        let ranges = [(0.0, 3.0), (0.1234, 2.9876), (1.0, 1.00001), (2.5, 3.0)];

        for (s, e) in ranges {
            let trimmed = trim_audio(&audio, &TrimRange::new(s, e)).unwrap();
            let expected = (e * 44100.0).floor() as usize - (s * 44100.0).floor() as usize;
            assert_eq!(trimmed.frame_count(), expected, "range [{}, {})", s, e);
        }
    }

    #[test]
    fn test_degenerate_range_is_empty() {
        let audio = create_test_audio(10.0, 8000, 2);

        let same = trim_audio(&audio, &TrimRange::new(5.0, 5.0)).unwrap();
        assert_eq!(same.frame_count(), 0);
        assert_eq!(same.channel_count(), 2);
        assert_eq!(same.sample_rate(), 8000);

        let inverted = trim_audio(&audio, &TrimRange::new(7.0, 3.0)).unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_end_past_duration_is_clamped() {
        let audio = create_test_audio(2.0, 8000, 1);

        let trimmed = trim_audio(&audio, &TrimRange::new(1.0, 1e12)).unwrap();
        assert_eq!(trimmed.frame_count(), 8000);

        let beyond = trim_audio(&audio, &TrimRange::new(5.0, 6.0)).unwrap();
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_invalid_ranges() {
        let audio = create_test_audio(1.0, 8000, 1);

        for range in [
            TrimRange::new(-1.0, 0.5),
            TrimRange::new(f64::NAN, 0.5),
            TrimRange::new(0.0, f64::INFINITY),
            TrimRange::new(0.0, f64::NAN),
        ] {
            match trim_audio(&audio, &range) {
                Err(AudioError::InvalidRange(_)) => (),
                other => panic!("Expected InvalidRange for {:?}, got {:?}", range, other),
            }
        }
    }

    #[test]
    fn test_empty_source_is_invalid() {
        let empty = SampleBuffer::empty(44100, 2).unwrap();
        let result = trim_audio(&empty, &TrimRange::new(0.0, 1.0));
        assert!(matches!(result, Err(AudioError::InvalidRange(_))));
    }

    #[test]
    fn test_mono_silence_scenario() {
        let audio = SampleBuffer::new(8000, vec![vec![0.0; 16000]]).unwrap();

        let trimmed = trim_audio(&audio, &TrimRange::new(0.5, 1.5)).unwrap();

        assert_eq!(trimmed.frame_count(), 8000);
        assert!(trimmed.channel(0).unwrap().iter().all(|&s| s == 0.0));
    }
}
