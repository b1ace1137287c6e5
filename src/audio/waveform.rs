// src/audio/waveform.rs

use crate::audio::types::{SampleBuffer, WaveformPeaks};
use crate::error::{AudioError, Result};

/// Peak pairs produced when the caller doesn't ask for a count
pub const DEFAULT_NUM_PEAKS: usize = 2000;

/// Reduce a loaded buffer to min/max peaks for a waveform view
///
/// Frames are split into `num_peaks` equal segments (2000 if None). Each
/// segment's min and max are taken across every channel. Segments that
/// receive no frames (more peaks than frames) report 0.0.
///
/// # Example
/// ```
/// use audiocutter_lib::audio::{compute_peaks, SampleBuffer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = SampleBuffer::new(8000, vec![vec![0.25; 8000]])?;
/// let peaks = compute_peaks(&audio, Some(100))?;
/// assert_eq!(peaks.max_peaks.len(), 100);
/// # Ok(())
/// # }
/// ```
pub fn compute_peaks(audio: &SampleBuffer, num_peaks: Option<usize>) -> Result<WaveformPeaks> {
    let num_peaks = num_peaks.unwrap_or(DEFAULT_NUM_PEAKS);

    if num_peaks == 0 {
        return Err(AudioError::InvalidPeakCount);
    }

    let mut min_peaks = vec![f32::MAX; num_peaks];
    let mut max_peaks = vec![f32::MIN; num_peaks];

    let total_frames = audio.frame_count();
    let frames_per_peak = total_frames as f64 / num_peaks as f64;

    for frame in 0..total_frames {
        let peak_idx = ((frame as f64 / frames_per_peak) as usize).min(num_peaks - 1);

        for channel in audio.channels() {
            let sample = channel[frame];
            min_peaks[peak_idx] = min_peaks[peak_idx].min(sample);
            max_peaks[peak_idx] = max_peaks[peak_idx].max(sample);
        }
    }

    // Segments no frame landed in
    for (min, max) in min_peaks.iter_mut().zip(max_peaks.iter_mut()) {
        if *min == f32::MAX {
            *min = 0.0;
        }
        if *max == f32::MIN {
            *max = 0.0;
        }
    }

    Ok(WaveformPeaks {
        min_peaks,
        max_peaks,
        num_peaks,
        duration_seconds: audio.duration_seconds(),
        sample_rate: audio.sample_rate(),
        channels: audio.channel_count() as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create synthetic audio data for testing
    fn create_test_audio(duration_seconds: f64, sample_rate: u32, channels: usize) -> SampleBuffer {
        let frames = (duration_seconds * sample_rate as f64) as usize;
        let tone: Vec<f32> = (0..frames)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.5
            })
            .collect();

        SampleBuffer::new(sample_rate, vec![tone; channels]).unwrap()
    }

    #[test]
    fn test_peaks_validates_num_peaks() {
        let audio = create_test_audio(0.1, 8000, 1);
        let result = compute_peaks(&audio, Some(0));
        assert!(matches!(result, Err(AudioError::InvalidPeakCount)));
        assert!(result.unwrap_err().to_string().contains("greater than 0"));
    }

    #[test]
    fn test_peaks_basic() {
        let audio = create_test_audio(1.0, 44100, 2);

        let peaks = compute_peaks(&audio, Some(100)).unwrap();

        assert_eq!(peaks.num_peaks, 100);
        assert_eq!(peaks.min_peaks.len(), 100);
        assert_eq!(peaks.max_peaks.len(), 100);
        assert_eq!(peaks.channels, 2);
        assert_eq!(peaks.sample_rate, 44100);
        assert!((peaks.duration_seconds - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_min_always_less_than_or_equal_max() {
        let audio = create_test_audio(2.0, 22050, 2);
        let peaks = compute_peaks(&audio, None).unwrap();

        assert_eq!(peaks.num_peaks, DEFAULT_NUM_PEAKS);
        for (min, max) in peaks.min_peaks.iter().zip(&peaks.max_peaks) {
            assert!(min <= max);
            assert!(*min >= -0.5 && *max <= 0.5);
        }
    }

    #[test]
    fn test_more_peaks_than_frames() {
        let audio = SampleBuffer::new(8000, vec![vec![0.9; 10]]).unwrap();
        let peaks = compute_peaks(&audio, Some(40)).unwrap();

        // Every fourth segment holds a frame; the rest stay flat
        assert_eq!(peaks.max_peaks.iter().filter(|&&p| p == 0.9).count(), 10);
        assert_eq!(peaks.max_peaks.iter().filter(|&&p| p == 0.0).count(), 30);
    }

    #[test]
    fn test_peaks_capture_amplitude_variation() {
        // silence -> loud -> silence
        let mut samples = vec![0.0f32; 3 * 8000];
        for s in &mut samples[8000..16000] {
            *s = 0.8;
        }
        let audio = SampleBuffer::new(8000, vec![samples]).unwrap();

        let peaks = compute_peaks(&audio, Some(30)).unwrap();

        for i in 0..10 {
            assert_eq!(peaks.max_peaks[i], 0.0, "expected silence at peak {}", i);
        }
        for i in 10..20 {
            assert_eq!(peaks.max_peaks[i], 0.8, "expected loud signal at peak {}", i);
        }
        for i in 20..30 {
            assert_eq!(peaks.max_peaks[i], 0.0, "expected silence at peak {}", i);
        }
    }

    #[test]
    fn test_peaks_serialize() {
        let audio = SampleBuffer::new(8000, vec![vec![0.5, -0.5]]).unwrap();
        let peaks = compute_peaks(&audio, Some(1)).unwrap();

        let json = serde_json::to_value(&peaks).unwrap();
        assert_eq!(json["num_peaks"], 1);
        assert_eq!(json["max_peaks"][0], 0.5);
        assert_eq!(json["min_peaks"][0], -0.5);
    }
}
