use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::error::{BorgvaultError, Result};

pub fn write_status(path: &Path, ok: bool, detail: Option<&str>) -> Result<()> {
    let stamp = Local::now().format("%Y-%m-%dT%H:%M:%S");
    let line = if ok {
        format!("{} ok\n", stamp)
    } else {
        format!("{} error: {}\n", stamp, detail.unwrap_or("unknown"))
    };
    let mut file = File::create(path)
        .map_err(|e| BorgvaultError::message(format!("write status {}: {}", path.display(), e)))?;
    file.write_all(line.as_bytes())
        .map_err(|e| BorgvaultError::message(format!("write status {}: {}", path.display(), e)))?;
    Ok(())
}
