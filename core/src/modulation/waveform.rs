use crate::modulation::natural::NaturalPwm;
use crate::prelude::{Modulator, PwlRecord, PwmConfig, PwmLevel, PwmResult};
use crate::telemetry::log::LogManager;
use ndarray::Array1;
use std::f64::consts::PI;

const MIN_SAMPLES_PER_PERIOD: f64 = 20.0;

/// Result of one generation pass: the sampled reference and the pulse train it produced.
#[derive(Debug, Clone)]
pub struct Waveform {
    config: PwmConfig,
    time: Array1<f64>,
    reference: Array1<f64>,
    levels: Vec<PwmLevel>,
}

impl Waveform {
    pub fn config(&self) -> &PwmConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn reference(&self) -> &Array1<f64> {
        &self.reference
    }

    pub fn levels(&self) -> &[PwmLevel] {
        &self.levels
    }

    /// Time-ordered `(time, value)` pairs.
    pub fn records(&self) -> impl Iterator<Item = PwlRecord> + '_ {
        self.time
            .iter()
            .zip(self.levels.iter())
            .map(|(&time, &value)| PwlRecord { time, value })
    }

    pub fn high_fraction(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        let high = self.levels.iter().filter(|level| level.is_high()).count();
        high as f64 / self.levels.len() as f64
    }

    /// Reference sine mapped onto [0, 1], the scale it shares with the duty cycle.
    pub fn normalized_reference(&self) -> Vec<f64> {
        self.reference.iter().map(|&value| (value + 1.0) / 2.0).collect()
    }

    /// Pulse train divided by the high-state amplitude.
    pub fn normalized_pwm(&self) -> Vec<f64> {
        let amplitude = self.config.sine_amplitude;
        self.levels
            .iter()
            .map(|level| {
                if amplitude == 0.0 {
                    if level.is_high() {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    level.amplitude() / amplitude
                }
            })
            .collect()
    }
}

/// Samples the reference sine and modulates it onto the carrier.
pub fn generate(config: &PwmConfig) -> PwmResult<Waveform> {
    config.validate()?;
    let logger = LogManager::new();

    if config.samples_per_period() < MIN_SAMPLES_PER_PERIOD {
        logger.warn(&format!(
            "only {:.1} samples per carrier period; pulse edges will be coarse",
            config.samples_per_period()
        ));
    }

    let count = config.sample_count();
    let time = Array1::from_shape_fn(count, |i| config.time_at(i));
    let omega = 2.0 * PI * config.sine_frequency;
    let reference = time.mapv(|t| (omega * t).sin());

    let modulator = NaturalPwm::from_config(config);
    let levels: Vec<PwmLevel> = time
        .iter()
        .zip(reference.iter())
        .map(|(&t, &threshold)| modulator.level(t, threshold))
        .collect();

    logger.record(&format!(
        "generated {} samples, carrier period {:.3e}s",
        count,
        modulator.period()
    ));

    Ok(Waveform {
        config: *config,
        time,
        reference,
        levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::PwmError;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn small_config() -> PwmConfig {
        PwmConfig {
            pwm_frequency: 10_000.0,
            sine_amplitude: 24.0,
            sine_frequency: 100.0,
            duration: 2e-3,
            timestep: 1e-6,
        }
    }

    #[test]
    fn default_scenario_produces_expected_samples() {
        let waveform = generate(&PwmConfig::default()).unwrap();
        assert_eq!(waveform.len(), 100_000);

        let first = waveform.records().next().unwrap();
        assert_eq!(first.time, 0.0);
        assert_eq!(first.value, PwmLevel::High(24.0));

        let half_period = waveform.records().nth(50).unwrap();
        assert!((half_period.time - 5e-5).abs() < 1e-15);
    }

    #[test]
    fn times_are_evenly_spaced_and_increasing() {
        let config = small_config();
        let waveform = generate(&config).unwrap();
        let records: Vec<_> = waveform.records().collect();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.time, i as f64 * config.timestep);
        }
        assert!(records.windows(2).all(|pair| pair[0].time < pair[1].time));
    }

    #[test]
    fn values_are_two_level() {
        let waveform = generate(&small_config()).unwrap();
        assert!(waveform
            .records()
            .all(|record| matches!(record.value, PwmLevel::High(a) if a == 24.0)
                || record.value == PwmLevel::Low));
    }

    #[test]
    fn invalid_config_is_not_generated() {
        let config = PwmConfig {
            pwm_frequency: 0.0,
            ..small_config()
        };
        assert!(matches!(
            generate(&config),
            Err(PwmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn symmetric_sine_averages_half_duty() {
        let config = PwmConfig {
            duration: 0.01,
            ..small_config()
        };
        let waveform = generate(&config).unwrap();
        assert!((waveform.high_fraction() - 0.5).abs() < 0.01);
    }

    #[test]
    fn random_parameter_sets_hold_record_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let pwm_frequency = rng.gen_range(1_000.0..50_000.0);
            let timestep = 1.0 / pwm_frequency / rng.gen_range(8.0..200.0);
            let config = PwmConfig {
                pwm_frequency,
                sine_amplitude: rng.gen_range(0.5..48.0),
                sine_frequency: rng.gen_range(0.0..500.0),
                duration: timestep * rng.gen_range(10.0..5_000.0),
                timestep,
            };
            let waveform = generate(&config).unwrap();
            assert_eq!(waveform.len(), config.sample_count());
            assert_eq!(waveform.time().len(), waveform.len());
            for (i, record) in waveform.records().enumerate() {
                assert_eq!(record.time, config.time_at(i));
                assert!(
                    record.value == PwmLevel::Low
                        || record.value == PwmLevel::High(config.sine_amplitude)
                );
            }
        }
    }

    #[test]
    fn normalized_views_stay_in_unit_range() {
        let waveform = generate(&small_config()).unwrap();
        assert!(waveform
            .normalized_reference()
            .iter()
            .all(|&v| (0.0..=1.0).contains(&v)));
        assert!(waveform
            .normalized_pwm()
            .iter()
            .all(|&v| v == 0.0 || v == 1.0));
    }
}
