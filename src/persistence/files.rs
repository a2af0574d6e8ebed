use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Get the cadence directory - checks for local .cadence first, then falls
/// back to global ~/.cadence
pub fn get_cadence_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_cadence(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".cadence"))
}

/// Find a local .cadence directory by walking up the directory tree
fn find_local_cadence(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let cadence_dir = current.join(".cadence");
        if cadence_dir.exists() && cadence_dir.is_dir() {
            return Some(cadence_dir);
        }
        current = current.parent()?;
    }
}

/// Ensure the cadence directory exists
pub fn ensure_cadence_dir() -> Result<PathBuf> {
    let dir = get_cadence_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .cadence directory in the current directory
pub fn init_local_cadence() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let cadence_dir = current_dir.join(".cadence");

    if cadence_dir.exists() {
        anyhow::bail!("Cadence directory already exists: {}", cadence_dir.display());
    }

    fs::create_dir_all(&cadence_dir)
        .with_context(|| format!("Failed to create directory: {}", cadence_dir.display()))?;

    Ok(cadence_dir)
}

/// Get the path of the plan file
pub fn plan_file() -> Result<PathBuf> {
    Ok(ensure_cadence_dir()?.join("plan.json"))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    let mut temp_file =
        NamedTempFile::new_in(dir).context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}
