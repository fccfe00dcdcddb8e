//! Core signal generation for the PWM-to-PWL toolchain.
//!
//! A sine reference is sampled on a fixed grid, compared against a sawtooth
//! carrier phase (natural PWM), and serialized as piecewise-linear breakpoints
//! that circuit simulators import as a voltage source.

pub mod math;
pub mod modulation;
pub mod prelude;
pub mod pwl;
pub mod telemetry;

pub use modulation::{generate, Waveform};
pub use prelude::{Modulator, PwlRecord, PwmConfig, PwmError, PwmLevel, PwmResult};
