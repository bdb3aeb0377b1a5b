//! Magnitude spectrum computation
//!
//! Hosts that only have PCM can use this to build the decibel spectrum a frame
//! needs. Scaling follows the usual browser analyser convention: Blackman
//! window, `20·log10(|X[k]| / N)` with `N` the window length, so a full-scale
//! sine peaks around −13.5 dB and sidelobes stay near −70 dB.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::features::spectrum::MIN_DB;

/// Reusable FFT state for one FFT size
pub struct SpectrumAnalyzer {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    window: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Plan a forward FFT of `fft_size` points
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size.max(1));
        Self {
            fft_size,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size.max(1)],
            window: Vec::new(),
        }
    }

    /// FFT size this analyzer was planned for
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Decibel magnitudes (`fft_size / 2` bins) of `samples`
    ///
    /// At most `fft_size` samples are used; shorter input is zero-padded.
    pub fn magnitudes_db(&mut self, samples: &[f32]) -> Vec<f32> {
        let half = self.fft_size / 2;
        let len = samples.len().min(self.fft_size);
        if len == 0 || half == 0 {
            return vec![MIN_DB; half];
        }

        if self.window.len() != len {
            self.window = blackman_window(len);
        }

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = if i < len && samples[i].is_finite() {
                Complex::new(samples[i] * self.window[i], 0.0)
            } else {
                Complex::new(0.0, 0.0)
            };
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / len as f32;
        self.buffer[..half]
            .iter()
            .map(|c| {
                let magnitude = c.norm() * scale;
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(MIN_DB)
                } else {
                    MIN_DB
                }
            })
            .collect()
    }
}

/// One-shot helper: decibel spectrum of `samples` with an `fft_size`-point FFT
pub fn magnitude_spectrum_db(samples: &[f32], fft_size: usize) -> Vec<f32> {
    SpectrumAnalyzer::new(fft_size).magnitudes_db(samples)
}

fn blackman_window(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / denom;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_peak_lands_on_tone() {
        let db = magnitude_spectrum_db(&sine(440.0, 1.0, 2048), 4096);
        assert_eq!(db.len(), 2048);

        let (peak_bin, peak_db) = db
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
        let bin_hz = 44100.0 / 4096.0;
        assert!((peak_bin as f32 * bin_hz - 440.0).abs() < bin_hz);
        assert!((peak_db + 13.5).abs() < 1.5, "peak at {:.2} dB", peak_db);
    }

    #[test]
    fn test_far_bins_are_quiet() {
        let db = magnitude_spectrum_db(&sine(440.0, 1.0, 2048), 4096);
        // 2 kHz is far outside the main lobe
        let bin = (2000.0 / (44100.0 / 4096.0)) as usize;
        assert!(db[bin] < -60.0, "leakage {:.1} dB", db[bin]);
    }

    #[test]
    fn test_silence_and_empty() {
        let db = magnitude_spectrum_db(&vec![0.0; 2048], 4096);
        assert!(db.iter().all(|&v| v == MIN_DB));
        assert_eq!(magnitude_spectrum_db(&[], 4096).len(), 2048);
    }

    #[test]
    fn test_analyzer_reuse() {
        let mut analyzer = SpectrumAnalyzer::new(1024);
        let a = analyzer.magnitudes_db(&sine(440.0, 0.5, 1024));
        let b = analyzer.magnitudes_db(&sine(440.0, 0.5, 1024));
        assert_eq!(a, b);
        assert_eq!(analyzer.fft_size(), 1024);
    }
}
