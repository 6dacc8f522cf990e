//! I/O helpers for configuration and run reports.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod config;
pub mod report;

/// Write `contents` next to `path` and rename it into place.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    fs::write(&tmp_name, contents)
        .with_context(|| format!("write temp file {}", Path::new(&tmp_name).display()))?;
    fs::rename(&tmp_name, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
