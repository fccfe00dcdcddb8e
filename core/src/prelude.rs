use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rounding slack, in ULPs, allowed when deciding whether `duration / timestep` is an integer.
const SAMPLE_COUNT_ULPS: f64 = 4.0;

/// Numeric parameters for one PWM generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmConfig {
    pub pwm_frequency: f64,
    pub sine_amplitude: f64,
    pub sine_frequency: f64,
    pub duration: f64,
    pub timestep: f64,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            pwm_frequency: 10_000.0,
            sine_amplitude: 24.0,
            sine_frequency: 100.0,
            duration: 0.1,
            timestep: 1e-6,
        }
    }
}

impl PwmConfig {
    /// Rejects parameter sets that cannot produce a meaningful pulse train.
    pub fn validate(&self) -> PwmResult<()> {
        let fields = [
            ("pwm_frequency", self.pwm_frequency),
            ("sine_amplitude", self.sine_amplitude),
            ("sine_frequency", self.sine_frequency),
            ("duration", self.duration),
            ("timestep", self.timestep),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PwmError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        if self.pwm_frequency <= 0.0 {
            return Err(PwmError::InvalidConfig(format!(
                "pwm_frequency must be positive, got {}",
                self.pwm_frequency
            )));
        }
        if self.sine_frequency < 0.0 {
            return Err(PwmError::InvalidConfig(format!(
                "sine_frequency must not be negative, got {}",
                self.sine_frequency
            )));
        }
        if self.duration <= 0.0 {
            return Err(PwmError::InvalidConfig(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.timestep <= 0.0 {
            return Err(PwmError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.timestep >= self.pwm_period() {
            return Err(PwmError::InvalidConfig(format!(
                "timestep {} must be smaller than the carrier period {}",
                self.timestep,
                self.pwm_period()
            )));
        }
        if self.sample_count() == 0 {
            return Err(PwmError::InvalidConfig(format!(
                "duration {} is shorter than one timestep {}",
                self.duration, self.timestep
            )));
        }
        Ok(())
    }

    pub fn pwm_period(&self) -> f64 {
        1.0 / self.pwm_frequency
    }

    /// Number of samples in `[0, duration)`; a trailing partial step is dropped.
    pub fn sample_count(&self) -> usize {
        let ratio = self.duration / self.timestep;
        if !ratio.is_finite() || ratio <= 0.0 {
            return 0;
        }
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= SAMPLE_COUNT_ULPS * f64::EPSILON * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.floor() as usize
        }
    }

    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.timestep
    }

    pub fn samples_per_period(&self) -> f64 {
        self.pwm_period() / self.timestep
    }
}

/// One `(time, value)` breakpoint of the PWL output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PwlRecord {
    pub time: f64,
    pub value: PwmLevel,
}

/// Output state of the pulse train at one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PwmLevel {
    High(f64),
    Low,
}

impl PwmLevel {
    pub fn amplitude(&self) -> f64 {
        match self {
            PwmLevel::High(amplitude) => *amplitude,
            PwmLevel::Low => 0.0,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, PwmLevel::High(_))
    }
}

/// Common error type for generation, serialization and parsing.
#[derive(thiserror::Error, Debug)]
pub enum PwmError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed PWL line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type PwmResult<T> = Result<T, PwmError>;

/// Decides the output level of a sample from its time and reference value.
pub trait Modulator {
    fn level(&self, time: f64, reference: f64) -> PwmLevel;
}
