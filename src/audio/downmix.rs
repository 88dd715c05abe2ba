//! Stereo-to-mono fold-down for transcription input.

use crate::error::{Error, Result};
use super::decode::DecodedPcm;

/// Equal-power gain applied when folding two partially correlated
/// channels into one. The exact factor matters for output parity, so this
/// is not a plain average.
const FOLD_DOWN_GAIN: f32 = std::f32::consts::SQRT_2;

/// Convert decoded PCM into the canonical mono stream.
///
/// Mono input passes through unchanged; stereo is folded as
/// `sqrt(2) * (left + right) / 2`. Wider layouts are rejected, never
/// silently truncated.
pub fn downmix(pcm: DecodedPcm) -> Result<Vec<f32>> {
    match pcm.channels {
        1 => Ok(pcm.samples),
        2 => {
            let mut mono = Vec::with_capacity(pcm.samples.len() / 2);
            for frame in pcm.samples.chunks_exact(2) {
                let (left, right) = (frame[0], frame[1]);
                mono.push(FOLD_DOWN_GAIN * (left + right) / 2.0);
            }
            Ok(mono)
        }
        n => Err(Error::UnsupportedChannelLayout {
            channels: usize::from(n),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: Vec<f32>, channels: u16) -> DecodedPcm {
        DecodedPcm {
            samples,
            sample_rate: 16000,
            channels,
        }
    }

    #[test]
    fn mono_passes_through_bit_identical() {
        let samples = vec![0.25, -0.5, 1.0, -1.0, 0.0];
        let mono = downmix(pcm(samples.clone(), 1)).unwrap();
        assert_eq!(mono, samples);
    }

    #[test]
    fn stereo_fold_down_is_equal_power() {
        // left = [1, 0], right = [0, 1], interleaved
        let mono = downmix(pcm(vec![1.0, 0.0, 0.0, 1.0], 2)).unwrap();
        let expected = std::f32::consts::SQRT_2 * 0.5;
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - expected).abs() < 1e-6, "mono[0] = {}", mono[0]);
        assert!((mono[1] - expected).abs() < 1e-6, "mono[1] = {}", mono[1]);
    }

    #[test]
    fn stereo_fold_down_is_not_a_plain_average() {
        let mono = downmix(pcm(vec![0.5, 0.5], 2)).unwrap();
        assert!((mono[0] - 0.5 * std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!(mono[0] > 0.5);
    }

    #[test]
    fn wide_layouts_are_rejected() {
        for channels in [3u16, 4, 6] {
            let frames = vec![0.1; channels as usize * 4];
            let result = downmix(pcm(frames, channels));
            assert!(matches!(
                result,
                Err(Error::UnsupportedChannelLayout { channels: c }) if c == channels as usize
            ));
        }
    }

    #[test]
    fn empty_stereo_folds_to_empty() {
        let mono = downmix(pcm(Vec::new(), 2)).unwrap();
        assert!(mono.is_empty());
    }
}
