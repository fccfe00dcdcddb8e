use crate::modulation::{carrier_phase, duty_cycle, Waveform};

/// Measured versus expected duty cycle over one complete carrier period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyMeasurement {
    pub start_time: f64,
    pub samples: usize,
    pub expected: f64,
    pub measured: f64,
}

impl DutyMeasurement {
    pub fn error(&self) -> f64 {
        (self.measured - self.expected).abs()
    }
}

pub struct DutyCycleAnalyzer;

impl DutyCycleAnalyzer {
    /// Splits the pulse train at carrier phase wraps and measures each complete period.
    ///
    /// The trailing period is dropped because the waveform may end mid-cycle.
    pub fn per_period(waveform: &Waveform) -> Vec<DutyMeasurement> {
        let period = waveform.config().pwm_period();
        let time = waveform.time();
        let reference = waveform.reference();
        let levels = waveform.levels();

        let mut measurements = Vec::new();
        let mut start = 0;
        for i in 1..=levels.len() {
            let wrapped = i == levels.len()
                || carrier_phase(time[i], period) < carrier_phase(time[i - 1], period);
            if !wrapped {
                continue;
            }
            if i < levels.len() {
                let high = levels[start..i].iter().filter(|l| l.is_high()).count();
                let samples = i - start;
                measurements.push(DutyMeasurement {
                    start_time: time[start],
                    samples,
                    expected: duty_cycle(reference[start]),
                    measured: high as f64 / samples as f64,
                });
            }
            start = i;
        }
        measurements
    }

    pub fn max_error(measurements: &[DutyMeasurement]) -> f64 {
        measurements
            .iter()
            .map(DutyMeasurement::error)
            .fold(0.0, f64::max)
    }
}
