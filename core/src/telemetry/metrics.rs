use std::sync::Mutex;

/// Per-batch counters for converted, failed and skipped input files.
pub struct ConversionMetrics {
    inner: Mutex<Counts>,
}

/// Snapshot of the batch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.converted + self.failed + self.skipped
    }
}

impl ConversionMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counts::default()),
        }
    }

    pub fn record_converted(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.converted += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.failed += 1;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut counts) = self.inner.lock() {
            counts.skipped += 1;
        }
    }

    pub fn snapshot(&self) -> Counts {
        if let Ok(counts) = self.inner.lock() {
            *counts
        } else {
            Counts::default()
        }
    }
}

impl Default for ConversionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = ConversionMetrics::new();
        metrics.record_converted();
        metrics.record_converted();
        metrics.record_failed();
        metrics.record_skipped();

        let counts = metrics.snapshot();
        assert_eq!(counts.converted, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.total(), 4);
    }
}
