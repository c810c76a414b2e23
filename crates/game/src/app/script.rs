use std::fs;
use std::path::Path;

use ninja_engine::{AppError, InputAction, InputCollector, InputSource};
use serde::Deserialize;
use tracing::info;

type ScriptResult<T> = Result<T, String>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptStepRecord {
    tick: u64,
    action: String,
    #[serde(default = "default_pressed")]
    pressed: bool,
}

fn default_pressed() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScriptStep {
    tick: u64,
    action: InputAction,
    pressed: bool,
}

/// Replays recorded button transitions, e.g.
/// `[{"tick": 30, "action": "jump"}, {"tick": 31, "action": "jump", "pressed": false}]`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedInput {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl ScriptedInput {
    pub(crate) fn load(path: &Path) -> ScriptResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|error| format!("read input script {}: {error}", path.display()))?;
        let script = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            steps = script.len(),
            "input_script_loaded"
        );
        Ok(script)
    }

    pub(crate) fn from_json_str(raw: &str) -> ScriptResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let records: Vec<ScriptStepRecord> =
            match serde_path_to_error::deserialize(&mut deserializer) {
                Ok(records) => records,
                Err(error) => {
                    let path = error.path().to_string();
                    let source = error.into_inner();
                    return if path.is_empty() || path == "." {
                        Err(format!("parse input script: {source}"))
                    } else {
                        Err(format!("parse input script at {path}: {source}"))
                    };
                }
            };

        let mut steps = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                InputAction::parse(&record.action)
                    .map(|action| ScriptStep {
                        tick: record.tick,
                        action,
                        pressed: record.pressed,
                    })
                    .ok_or_else(|| {
                        format!(
                            "validation failed at [{index}].action: unknown action '{}'",
                            record.action
                        )
                    })
            })
            .collect::<ScriptResult<Vec<_>>>()?;
        // Stable: transitions on the same tick keep their file order.
        steps.sort_by_key(|step| step.tick);

        Ok(Self { steps, cursor: 0 })
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }
}

impl InputSource for ScriptedInput {
    fn feed(&mut self, tick: u64, collector: &mut InputCollector) -> Result<(), AppError> {
        while let Some(step) = self.steps.get(self.cursor) {
            if step.tick > tick {
                break;
            }
            collector.handle_action(step.action, step.pressed);
            self.cursor += 1;
        }
        Ok(())
    }
}
