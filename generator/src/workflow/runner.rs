use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::{info, warn};
use pwmcore::math::{DutyCycleAnalyzer, SpectrumHelper, StatsHelper};
use pwmcore::pwl;
use pwmcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use std::path::PathBuf;
use std::sync::Arc;

pub struct WorkflowResult {
    pub output_path: PathBuf,
    pub record_count: usize,
    pub high_fraction: f64,
    pub max_duty_error: f64,
    pub fundamental_hz: Option<f64>,
    pub model: VisualizationModel,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        self.execute_with(&self.config)
    }

    /// Generates the pulse train for `config` and writes it to `config.output`.
    pub fn execute_with(&self, config: &WorkflowConfig) -> anyhow::Result<WorkflowResult> {
        let signal = config.to_pwm_config();
        let waveform = pwmcore::generate(&signal)
            .map_err(|err| {
                self.metrics.record_error();
                err
            })
            .context("generating PWM waveform")?;
        self.metrics.record_generated(waveform.len());

        let record_count = pwl::write_file(&config.output, &waveform)
            .map_err(|err| {
                self.metrics.record_error();
                err
            })
            .with_context(|| format!("writing PWL file {}", config.output.display()))?;
        self.metrics.record_written(record_count);

        let measurements = DutyCycleAnalyzer::per_period(&waveform);
        let max_duty_error = DutyCycleAnalyzer::max_error(&measurements);
        let tolerance = 3.0 / signal.samples_per_period();
        if max_duty_error > tolerance {
            warn!(
                "duty cycle deviates by {:.4} (tolerance {:.4}); consider a smaller timestep",
                max_duty_error, tolerance
            );
        }

        let high_fraction = waveform.high_fraction();
        let levels: Vec<f64> = waveform.levels().iter().map(|l| l.amplitude()).collect();
        let fundamental_hz = SpectrumHelper::dominant_frequency(
            &levels,
            1.0 / signal.timestep,
            signal.pwm_frequency / 2.0,
        );
        info!(
            "{} records, {} carrier periods, high fraction {:.4}, mean {:.4}, rms {:.4}",
            record_count,
            measurements.len(),
            high_fraction,
            StatsHelper::mean(&levels),
            StatsHelper::rms(&levels)
        );

        let output = config.output.display().to_string();
        let model = VisualizationModel::from_waveform(&waveform, config.plot_points, &output);

        Ok(WorkflowResult {
            output_path: config.output.clone(),
            record_count,
            high_fraction,
            max_duty_error,
            fundamental_hz,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmcore::PwmConfig;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> WorkflowConfig {
        let signal = PwmConfig {
            duration: 0.01,
            ..Default::default()
        };
        WorkflowConfig::from_args(dir.join("pwm.txt"), signal, 1_000)
    }

    #[test]
    fn runner_executes_workflow() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let runner = Runner::new(cfg.clone());
        let result = runner.execute().unwrap();

        assert_eq!(result.record_count, 10_000);
        assert_eq!(result.model.time.len(), 1_000);
        assert!((result.high_fraction - 0.5).abs() < 0.01);
        let fundamental = result.fundamental_hz.unwrap();
        assert!((fundamental - 100.0).abs() < 1.0);
        let contents = fs::read_to_string(&cfg.output).unwrap();
        assert_eq!(contents.lines().count(), 10_000);
        assert_eq!(runner.metrics().written, 10_000);
    }

    #[test]
    fn runner_rejects_zero_carrier_frequency() {
        let dir = tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.pwm_frequency = 0.0;
        let runner = Runner::new(cfg.clone());
        let err = runner.execute().err().unwrap();
        assert!(format!("{:#}", err).contains("pwm_frequency"));
        assert!(!cfg.output.exists());
        assert_eq!(runner.metrics().errors, 1);
    }

    #[test]
    fn runner_surfaces_unwritable_path() {
        let dir = tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.output = dir.path().join("missing").join("pwm.txt");
        let runner = Runner::new(cfg);
        let err = runner.execute().err().unwrap();
        assert!(format!("{:#}", err).contains("writing PWL file"));
    }

    #[test]
    fn runner_output_is_idempotent() {
        let dir = tempdir().unwrap();
        let cfg = config_in(dir.path());
        let runner = Runner::new(cfg.clone());
        runner.execute().unwrap();
        let first = fs::read(&cfg.output).unwrap();
        runner.execute().unwrap();
        assert_eq!(first, fs::read(&cfg.output).unwrap());
    }
}
