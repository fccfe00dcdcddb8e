use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps the `rustfft` planner for reuse.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());
        self.fft.process(&mut buffer);
        buffer
    }
}

pub struct SpectrumHelper;

impl SpectrumHelper {
    /// Strongest non-DC component below `max_hz`, in Hz.
    ///
    /// The mean is removed first so the pulse train's DC offset does not mask
    /// the modulated fundamental.
    pub fn dominant_frequency(samples: &[f64], sample_rate: f64, max_hz: f64) -> Option<f64> {
        if samples.len() < 2 || sample_rate <= 0.0 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let centered: Vec<f64> = samples.iter().map(|&v| v - mean).collect();

        let helper = FftHelper::new(centered.len());
        let spectrum = helper.forward(&centered);
        let resolution = sample_rate / spectrum.len() as f64;

        spectrum
            .iter()
            .enumerate()
            .take(spectrum.len() / 2 + 1)
            .skip(1)
            .take_while(|(bin, _)| *bin as f64 * resolution <= max_hz)
            .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
            .map(|(bin, _)| bin as f64 * resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn fft_helper_returns_same_length() {
        let helper = FftHelper::new(4);
        let output = helper.forward(&[1.0, 0.0, -1.0, 0.0]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn dominant_frequency_finds_pure_tone() {
        let sample_rate = 1_000.0;
        let samples: Vec<f64> = (0..1_000)
            .map(|i| 3.0 + (2.0 * PI * 50.0 * i as f64 / sample_rate).sin())
            .collect();
        let peak = SpectrumHelper::dominant_frequency(&samples, sample_rate, 200.0).unwrap();
        assert!((peak - 50.0).abs() < 1e-9);
    }

    #[test]
    fn pulse_train_baseband_follows_reference() {
        use crate::modulation::generate;
        use crate::prelude::PwmConfig;

        let config = PwmConfig {
            duration: 0.02,
            ..Default::default()
        };
        let waveform = generate(&config).unwrap();
        let samples: Vec<f64> = waveform.levels().iter().map(|l| l.amplitude()).collect();
        let peak =
            SpectrumHelper::dominant_frequency(&samples, 1.0 / config.timestep, 5_000.0).unwrap();
        assert!((peak - config.sine_frequency).abs() < 1.0);
    }

    #[test]
    fn dominant_frequency_rejects_short_input() {
        assert!(SpectrumHelper::dominant_frequency(&[1.0], 10.0, 5.0).is_none());
    }
}
