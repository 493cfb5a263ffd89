use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Write a rendered report, creating parent directories as needed.
pub fn write_report<P: AsRef<Path>>(path: P, report: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)?;
    Ok(())
}

/// Serialize `value` as pretty JSON into `path`.
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    write_report(path, &text)
}
