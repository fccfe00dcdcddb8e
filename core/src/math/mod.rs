pub mod duty;
pub mod fft;
pub mod stats;

pub use duty::{DutyCycleAnalyzer, DutyMeasurement};
pub use fft::{FftHelper, SpectrumHelper};
pub use stats::StatsHelper;
