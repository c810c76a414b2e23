mod input;
mod loop_runner;
mod metrics;

pub use input::{InputAction, InputCollector, InputSnapshot};
pub use loop_runner::{run_headless, AppError, InputSource, LoopConfig, NoInput, RunSummary};
pub use metrics::LoopMetricsSnapshot;
