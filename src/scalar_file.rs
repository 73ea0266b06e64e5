//! Scalar files used by the CLI: the serialized scalar as pretty JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a scalar file written by [`write_scalar_file`] (or by course storage).
pub fn read_scalar_file(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scalar file {}", path.display()))?;
    let data = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scalar file {}", path.display()))?;
    Ok(data)
}

pub fn write_scalar_file(path: &Path, data: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create scalar directory")?;
    }
    let content = serde_json::to_string_pretty(data).context("Failed to serialize scalar")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write scalar file {}", path.display()))?;
    Ok(())
}
