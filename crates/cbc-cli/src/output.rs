//! Output files.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use cbc_core::AdvancedBlockingFormat;

pub fn output_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{name}.{extension}"))
}

/// `<name>-advanced.json` or `<name>-advanced.txt`.
pub fn advanced_path(dir: &Path, name: &str, format: AdvancedBlockingFormat) -> PathBuf {
    output_path(dir, &format!("{name}-advanced"), format.as_str())
}

pub fn pretty_json(compact: &str) -> Result<String, String> {
    let value: serde_json::Value =
        serde_json::from_str(compact).map_err(|e| format!("Invalid JSON payload: {e}"))?;
    serde_json::to_string_pretty(&value).map_err(|e| format!("Failed to encode JSON: {e}"))
}

/// Append to `path`, creating it when missing.
pub fn create_or_append(path: &Path, contents: &str) -> Result<(), String> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}
