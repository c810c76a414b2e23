use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod level;
pub mod sim;

pub use app::{
    run_headless, AppError, InputAction, InputCollector, InputSnapshot, InputSource, LoopConfig,
    LoopMetricsSnapshot, NoInput, RunSummary,
};
pub use level::{
    DirectoryLevels, GridPos, InMemoryLevels, LevelError, LevelSource, PlacedTile, Tile, TileKind,
    Tilemap, DEFAULT_TILE_SIZE,
};
pub use sim::{
    Action, AnimationLibrary, AnimationTemplate, Archetype, CollisionFlags, DeathCause, Enemy,
    FrameHandle, ParticleKind, PhysicsEntity, Player, Rect, SimEvent, Vec2, World,
};

pub const ROOT_ENV_VAR: &str = "NINJA_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub maps_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "NINJA_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain a data/maps/ directory."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from {start_dir}\n\
Expected a directory containing data/maps/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/ninja\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let maps_dir = maps_dir_for(&root);
    Ok(AppPaths { root, maps_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            // Prefer the working directory, then walk up from the executable.
            if let Some(root) = env::current_dir().ok().and_then(|cwd| find_root_from(&cwd)) {
                return Ok(root);
            }

            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_root_from(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn maps_dir_for(root: &Path) -> PathBuf {
    root.join("data").join("maps")
}

fn is_repo_marker(path: &Path) -> bool {
    maps_dir_for(path).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
