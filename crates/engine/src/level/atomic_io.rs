use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes `text` beside `path` first, then swaps it into place so a crash mid-save
/// never leaves a truncated level behind.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staged = staging_path(path);
    fs::write(&staged, text.as_bytes())?;
    if let Err(error) = swap_into_place(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(error);
    }
    Ok(())
}

fn swap_into_place(staged: &Path, target: &Path) -> io::Result<()> {
    // Windows refuses to rename over an existing file.
    match fs::remove_file(target) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    fs::rename(staged, target)
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("level.json");
    path.with_file_name(format!("{name}.tmp"))
}
