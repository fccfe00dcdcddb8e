use crate::modulation::carrier::{carrier_phase, duty_cycle};
use crate::prelude::{Modulator, PwmConfig, PwmLevel};

/// Natural (sine-triangle) PWM: the output is high while the carrier phase sits
/// below the duty threshold derived from the instantaneous reference value.
#[derive(Debug, Clone, Copy)]
pub struct NaturalPwm {
    period: f64,
    amplitude: f64,
}

impl NaturalPwm {
    pub fn new(period: f64, amplitude: f64) -> Self {
        Self { period, amplitude }
    }

    pub fn from_config(config: &PwmConfig) -> Self {
        Self::new(config.pwm_period(), config.sine_amplitude)
    }

    pub fn period(&self) -> f64 {
        self.period
    }
}

impl Modulator for NaturalPwm {
    fn level(&self, time: f64, reference: f64) -> PwmLevel {
        let time_in_cycle = carrier_phase(time, self.period);
        if time_in_cycle < duty_cycle(reference) * self.period {
            PwmLevel::High(self.amplitude)
        } else {
            PwmLevel::Low
        }
    }
}
