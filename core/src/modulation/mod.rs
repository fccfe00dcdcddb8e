pub mod carrier;
pub mod natural;
pub mod waveform;

pub use carrier::{carrier_phase, duty_cycle};
pub use natural::NaturalPwm;
pub use waveform::{generate, Waveform};
