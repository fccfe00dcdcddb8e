use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub generated: usize,
    pub written: usize,
    pub errors: usize,
}

struct Metrics {
    generated: usize,
    written: usize,
    errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                generated: 0,
                written: 0,
                errors: 0,
            }),
        }
    }

    pub fn record_generated(&self, samples: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.generated += samples;
        }
    }

    pub fn record_written(&self, lines: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.written += lines;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                generated: metrics.generated,
                written: metrics.written,
                errors: metrics.errors,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_generated(10);
        metrics.record_written(10);
        metrics.record_generated(5);
        metrics.record_error();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                generated: 15,
                written: 10,
                errors: 1,
            }
        );
    }
}
