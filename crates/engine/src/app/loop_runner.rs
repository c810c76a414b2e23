use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, trace, warn};

use crate::level::LevelError;
use crate::sim::{SimEvent, World};
use crate::StartupError;

use super::input::InputCollector;
use super::metrics::TickMeter;

const DEFAULT_TARGET_TPS: u32 = 60;
const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
const DEFAULT_METRICS_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Stop after this many ticks. `None` runs until input asks to quit.
    pub max_ticks: Option<u64>,
    /// Sleep between frames to hold `target_tps`; otherwise ticks run back to back.
    pub pace_realtime: bool,
    pub start_level: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: DEFAULT_TARGET_TPS,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_ticks_per_frame: 5,
            metrics_log_interval: DEFAULT_METRICS_LOG_INTERVAL,
            max_ticks: None,
            pace_realtime: false,
            start_level: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("input source failed: {0}")]
    Input(String),
}

/// Feeds button transitions for a tick into the collector before it is sampled.
pub trait InputSource {
    fn feed(&mut self, tick: u64, collector: &mut InputCollector) -> Result<(), AppError>;

    /// Signals produced by the tick, for sound or rendering collaborators.
    fn observe(&mut self, _tick: u64, _events: &[SimEvent]) {}
}

/// No buttons are ever pressed.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn feed(&mut self, _tick: u64, _collector: &mut InputCollector) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub levels_loaded: u64,
    pub deaths: u64,
    pub final_level: usize,
}

/// Drives `world` at a fixed step until quit is requested or `max_ticks` is reached.
pub fn run_headless(
    world: &mut World,
    input: &mut dyn InputSource,
    config: &LoopConfig,
) -> Result<RunSummary, AppError> {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, DEFAULT_METRICS_LOG_INTERVAL);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        max_ticks = ?config.max_ticks,
        pace_realtime = config.pace_realtime,
        "loop_config"
    );

    let mut collector = InputCollector::new();
    let mut meter = TickMeter::new(metrics_log_interval, Instant::now());
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut tick: u64 = 0;

    let reason = 'frames: loop {
        let ticks_this_frame = if config.pace_realtime {
            let now = Instant::now();
            let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
            last_frame_instant = now;
            accumulator = accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

            let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
            accumulator = step_plan.remaining_accumulator;
            if step_plan.dropped_backlog > Duration::ZERO {
                warn!(
                    dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                    max_ticks_per_frame, "sim_clamp_triggered"
                );
            }
            step_plan.ticks_to_run
        } else {
            1
        };

        for _ in 0..ticks_this_frame {
            if config.max_ticks.is_some_and(|limit| tick >= limit) {
                break 'frames "max_ticks";
            }

            input.feed(tick, &mut collector)?;
            let snapshot = collector.snapshot_for_tick();
            if snapshot.quit_requested() {
                break 'frames "quit_requested";
            }

            let events = world.tick(&snapshot)?;
            for event in &events {
                trace!(tick, event = ?event, "sim_event");
            }
            input.observe(tick, &events);
            tick += 1;
            meter.record_tick();
        }

        if let Some(snapshot) = meter.maybe_snapshot(Instant::now()) {
            info!(
                ticks = snapshot.ticks,
                tps = snapshot.tps,
                level = world.level(),
                "loop_metrics"
            );
        }

        if config.pace_realtime {
            thread::sleep(fixed_dt.saturating_sub(accumulator));
        }
    };

    let summary = RunSummary {
        ticks: tick,
        levels_loaded: world.levels_loaded(),
        deaths: world.deaths(),
        final_level: world.level(),
    };
    info!(
        reason,
        ticks = summary.ticks,
        levels_loaded = summary.levels_loaded,
        deaths = summary.deaths,
        final_level = summary.final_level,
        "shutdown"
    );
    Ok(summary)
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    // Anything still owed after the cap is dropped rather than carried into the next frame.
    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };

    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
