use std::path::Path;

use tracing::debug;

use crate::core::Result;

/// Recursively remove a directory and everything below it.
pub fn remove_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::remove_dir_all(path)?;
    debug!(path = %path.display(), "directory removed");
    Ok(())
}
