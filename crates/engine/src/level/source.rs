use std::fs;
use std::path::{Path, PathBuf};

use super::format::LevelError;
use super::tilemap::Tilemap;

/// Numbered level library. Level indices run from `0` to `level_count() - 1`.
pub trait LevelSource {
    fn level_count(&self) -> usize;
    fn load(&self, index: usize) -> Result<Tilemap, LevelError>;
}

/// Levels stored as `<dir>/<index>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLevels {
    dir: PathBuf,
    count: usize,
}

impl DirectoryLevels {
    pub fn open(dir: &Path) -> Result<Self, LevelError> {
        let entries = fs::read_dir(dir).map_err(|source| LevelError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| LevelError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }

        if count == 0 {
            return Err(LevelError::NoLevels {
                dir: dir.to_path_buf(),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            count,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn level_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.json"))
    }
}

impl LevelSource for DirectoryLevels {
    fn level_count(&self) -> usize {
        self.count
    }

    fn load(&self, index: usize) -> Result<Tilemap, LevelError> {
        let path = self.level_path(index);
        if index >= self.count || !path.is_file() {
            return Err(LevelError::MissingLevel {
                index,
                dir: self.dir.clone(),
            });
        }
        Tilemap::load(&path)
    }
}

/// Prepared tilemaps held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLevels {
    levels: Vec<Tilemap>,
}

impl InMemoryLevels {
    pub fn new(levels: Vec<Tilemap>) -> Self {
        Self { levels }
    }
}

impl LevelSource for InMemoryLevels {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn load(&self, index: usize) -> Result<Tilemap, LevelError> {
        self.levels
            .get(index)
            .cloned()
            .ok_or_else(|| LevelError::MissingLevel {
                index,
                dir: PathBuf::from("<memory>"),
            })
    }
}
