use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub ticks: u32,
    pub tps: f32,
}

/// Counts simulated ticks over a rolling interval.
#[derive(Debug)]
pub(crate) struct TickMeter {
    interval_start: Instant,
    interval: Duration,
    ticks: u32,
}

impl TickMeter {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            ticks: 0,
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let snapshot = LoopMetricsSnapshot {
            ticks: self.ticks,
            tps: self.ticks as f32 / elapsed_seconds,
        };

        self.interval_start = now;
        self.ticks = 0;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_snapshot_before_interval_elapses() {
        let start = Instant::now();
        let mut meter = TickMeter::new(Duration::from_secs(1), start);
        meter.record_tick();
        assert!(meter
            .maybe_snapshot(start + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn snapshot_reports_rate_and_resets() {
        let start = Instant::now();
        let mut meter = TickMeter::new(Duration::from_secs(1), start);
        for _ in 0..120 {
            meter.record_tick();
        }

        let snapshot = meter
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("snapshot");
        assert_eq!(snapshot.ticks, 120);
        assert!((snapshot.tps - 60.0).abs() < 0.01);

        let next = meter
            .maybe_snapshot(start + Duration::from_secs(3))
            .expect("snapshot");
        assert_eq!(next.ticks, 0);
    }
}
