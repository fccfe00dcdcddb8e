use pwmcore::Waveform;
use serde::{Deserialize, Serialize};

/// Plot payload served to the visualizer: a leading window of the generated signal.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VisualizationModel {
    pub time: Vec<f64>,
    pub reference: Vec<f64>,
    pub pwm: Vec<f64>,
    pub total_samples: usize,
    pub pwm_frequency: f64,
    pub sine_frequency: f64,
    pub sine_amplitude: f64,
    pub output: String,
}

impl VisualizationModel {
    pub fn from_waveform(waveform: &Waveform, max_points: usize, output: &str) -> Self {
        let window = waveform.len().min(max_points);
        let config = waveform.config();

        let mut reference = waveform.normalized_reference();
        reference.truncate(window);
        let mut pwm = waveform.normalized_pwm();
        pwm.truncate(window);

        Self {
            time: waveform.time().iter().take(window).copied().collect(),
            reference,
            pwm,
            total_samples: waveform.len(),
            pwm_frequency: config.pwm_frequency,
            sine_frequency: config.sine_frequency,
            sine_amplitude: config.sine_amplitude,
            output: output.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmcore::{generate, PwmConfig};

    #[test]
    fn model_keeps_leading_window() {
        let config = PwmConfig {
            duration: 1e-3,
            ..Default::default()
        };
        let waveform = generate(&config).unwrap();
        let model = VisualizationModel::from_waveform(&waveform, 250, "out.txt");
        assert_eq!(model.time.len(), 250);
        assert_eq!(model.reference.len(), 250);
        assert_eq!(model.pwm.len(), 250);
        assert_eq!(model.total_samples, 1_000);
        assert_eq!(model.time[1], 1e-6);
        assert_eq!(model.pwm[0], 1.0);
        assert_eq!(model.reference[0], 0.5);
    }
}
