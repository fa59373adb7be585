//! Short-time magnitude spectrum over non-overlapping analysis windows.

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::FingerprintConfig;

/// One-sided magnitude spectra of a zero-padded signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Window (and FFT) length in samples.
    pub window_size: usize,
    pub sample_rate: u32,
    /// One magnitude vector of `window_size / 2 + 1` bins per window.
    pub frames: Vec<Vec<f32>>,
}

impl Spectrogram {
    /// Frequency in Hz of spectrum bin `bin`.
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * f64::from(self.sample_rate) / self.window_size as f64
    }

    pub fn bin_count(&self) -> usize {
        self.window_size / 2 + 1
    }
}

/// Number of zeros appended so the length becomes a multiple of `window_size`.
///
/// A length that is already a multiple still receives one full pad window.
pub fn padding_len(len: usize, window_size: usize) -> usize {
    window_size - len % window_size
}

/// Compute the magnitude spectrogram with hop = window = FFT length.
///
/// Callers are expected to have validated `sample_rate` and the samples.
pub(crate) fn compute(samples: &[f32], sample_rate: u32, cfg: &FingerprintConfig) -> Spectrogram {
    let window_size = cfg.window_size(sample_rate);
    let padded_len = samples.len() + padding_len(samples.len(), window_size);
    let frame_count = padded_len / window_size;
    let bins = window_size / 2 + 1;

    let window = hann_window(window_size);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(window_size);

    let mut frames = Vec::with_capacity(frame_count);
    let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; window_size];
    for frame_idx in 0..frame_count {
        let start = frame_idx * window_size;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = samples.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex {
                re: sample * window[i],
                im: 0.0,
            };
        }

        fft.process(&mut buffer);

        frames.push(buffer[..bins].iter().map(|c| c.norm()).collect());
    }

    Spectrogram {
        window_size,
        sample_rate,
        frames,
    }
}

/// Periodic Hann window, the usual choice for spectral analysis.
fn hann_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn padding_always_adds_at_least_one_window() {
        assert_eq!(padding_len(0, 4), 4);
        assert_eq!(padding_len(8, 4), 4);
        assert_eq!(padding_len(9, 4), 3);
        assert_eq!(padding_len(11, 4), 1);
    }

    #[test]
    fn frame_count_includes_pad_window() {
        let cfg = FingerprintConfig::default();
        let samples = vec![0.0; 44_100 * 2];
        let spec = compute(&samples, 44_100, &cfg);
        assert_eq!(spec.window_size, 22_050);
        // 4 full windows plus the mandatory pad window.
        assert_eq!(spec.frames.len(), 5);
        assert!(spec.frames.iter().all(|f| f.len() == spec.bin_count()));
    }

    #[test]
    fn empty_input_yields_single_silent_frame() {
        let cfg = FingerprintConfig::default();
        let spec = compute(&[], 8_000, &cfg);
        assert_eq!(spec.frames.len(), 1);
        assert!(spec.frames[0].iter().all(|&m| m == 0.0));
    }

    #[test]
    fn tone_energy_lands_in_expected_bin() {
        let cfg = FingerprintConfig::default();
        let samples = tone(1_000.0, 8_000, 0.5);
        let spec = compute(&samples, 8_000, &cfg);
        let frame = &spec.frames[0];
        let (max_bin, _) = frame
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        assert_eq!(spec.bin_frequency(max_bin), 1_000.0);
    }

    #[test]
    fn hann_window_is_zero_at_start() {
        let w = hann_window(8);
        assert_eq!(w[0], 0.0);
        assert!((w[4] - 1.0).abs() < 1e-6);
    }
}
