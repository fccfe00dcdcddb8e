use anyhow::Context;
use pwmcore::PwmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "pwm_sine_wave.txt";
pub const DEFAULT_PLOT_POINTS: usize = 20_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub output: PathBuf,
    pub pwm_frequency: f64,
    pub sine_amplitude: f64,
    pub sine_frequency: f64,
    pub duration: f64,
    pub timestep: f64,
    pub plot_points: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let signal = PwmConfig::default();
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            pwm_frequency: signal.pwm_frequency,
            sine_amplitude: signal.sine_amplitude,
            sine_frequency: signal.sine_frequency,
            duration: signal.duration,
            timestep: signal.timestep,
            plot_points: DEFAULT_PLOT_POINTS,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(output: PathBuf, signal: PwmConfig, plot_points: usize) -> Self {
        Self {
            output,
            pwm_frequency: signal.pwm_frequency,
            sine_amplitude: signal.sine_amplitude,
            sine_frequency: signal.sine_frequency,
            duration: signal.duration,
            timestep: signal.timestep,
            plot_points,
        }
    }

    pub fn to_pwm_config(&self) -> PwmConfig {
        PwmConfig {
            pwm_frequency: self.pwm_frequency,
            sine_amplitude: self.sine_amplitude,
            sine_frequency: self.sine_frequency,
            duration: self.duration,
            timestep: self.timestep,
        }
    }
}
