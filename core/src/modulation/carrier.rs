/// Position of `time` inside the current carrier period (sawtooth phase, in seconds).
pub fn carrier_phase(time: f64, period: f64) -> f64 {
    time % period
}

/// Maps a reference value in [-1, 1] onto a duty cycle in [0, 1].
pub fn duty_cycle(threshold: f64) -> f64 {
    (threshold + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_cycle_spans_unit_interval() {
        assert_eq!(duty_cycle(-1.0), 0.0);
        assert_eq!(duty_cycle(0.0), 0.5);
        assert_eq!(duty_cycle(1.0), 1.0);
    }

    #[test]
    fn carrier_phase_wraps_each_period() {
        let period = 1e-4;
        assert_eq!(carrier_phase(0.0, period), 0.0);
        assert!((carrier_phase(2.5e-4, period) - 0.5e-4).abs() < 1e-12);
        assert!(carrier_phase(7.3e-4, period) < period);
    }
}
