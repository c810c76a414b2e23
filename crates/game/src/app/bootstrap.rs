use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use ninja_engine::{
    resolve_app_paths, AnimationLibrary, AppError, DirectoryLevels, InputSource, LevelSource,
    LoopConfig, NoInput, World,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::script::ScriptedInput;

const START_LEVEL_ENV_VAR: &str = "NINJA_START_LEVEL";
const MAX_TICKS_ENV_VAR: &str = "NINJA_MAX_TICKS";
const REALTIME_ENV_VAR: &str = "NINJA_REALTIME";
const INPUT_SCRIPT_ENV_VAR: &str = "NINJA_INPUT_SCRIPT";
const SEED_ENV_VAR: &str = "NINJA_SEED";

/// Tick cap for unpaced runs that set none: one simulated minute at 60 tps.
const DEFAULT_HEADLESS_TICKS: u64 = 60 * 60;
const DEFAULT_SEED: u64 = 0x6e69_6e6a_61;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) world: World,
    pub(crate) input: Box<dyn InputSource>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    info!("=== Ninja Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        maps_dir = %app_paths.maps_dir.display(),
        "startup"
    );

    let config = loop_config_from_env();
    let levels = DirectoryLevels::open(&app_paths.maps_dir)?;
    let start_level = clamp_start_level(config.start_level, levels.level_count());
    let seed = env_value(SEED_ENV_VAR, env::var(SEED_ENV_VAR)).unwrap_or(DEFAULT_SEED);

    let world = World::new(
        Box::new(levels),
        Arc::new(AnimationLibrary::default()),
        start_level,
        seed,
    )?;

    let input: Box<dyn InputSource> = match env::var(INPUT_SCRIPT_ENV_VAR) {
        Ok(path) => Box::new(ScriptedInput::load(&PathBuf::from(path)).map_err(AppError::Input)?),
        Err(_) => Box::new(NoInput),
    };

    Ok(AppWiring {
        config: LoopConfig {
            start_level,
            ..config
        },
        world,
        input,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn loop_config_from_env() -> LoopConfig {
    let pace_realtime = env_value(REALTIME_ENV_VAR, env::var(REALTIME_ENV_VAR))
        .map(|flag: EnvFlag| flag.0)
        .unwrap_or(false);
    let max_ticks = env_value(MAX_TICKS_ENV_VAR, env::var(MAX_TICKS_ENV_VAR))
        .or((!pace_realtime).then_some(DEFAULT_HEADLESS_TICKS));
    let start_level = env_value(START_LEVEL_ENV_VAR, env::var(START_LEVEL_ENV_VAR)).unwrap_or(0);

    LoopConfig {
        max_ticks,
        pace_realtime,
        start_level,
        ..LoopConfig::default()
    }
}

fn clamp_start_level(requested: usize, level_count: usize) -> usize {
    let last = level_count.saturating_sub(1);
    if requested > last {
        warn!(requested, last, "start level out of range; using last level");
        last
    } else {
        requested
    }
}

/// Parses an env var, warning and returning `None` when it is set but unusable.
fn env_value<T: FromStr>(var: &'static str, raw: Result<String, env::VarError>) -> Option<T> {
    match raw {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    env_var = var,
                    value = value.as_str(),
                    "invalid env var value; falling back to default"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            None
        }
    }
}

/// `1`/`true`/`yes`/`on` and their negatives, case-insensitive.
struct EnvFlag(bool);

impl FromStr for EnvFlag {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(EnvFlag(true)),
            "0" | "false" | "no" | "off" => Ok(EnvFlag(false)),
            _ => Err(()),
        }
    }
}
