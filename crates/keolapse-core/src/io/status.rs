use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::STATUS_FILE_NAME;
use crate::error::Result;

use super::image_io::write_atomic;

/// Side file summarizing the last completed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub last_run: DateTime<Utc>,
    pub frame_count: usize,
    pub output_fps: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

pub fn status_path(output_dir: &Path) -> PathBuf {
    output_dir.join(STATUS_FILE_NAME)
}

/// Read the status file. A missing file is `Ok(None)`.
pub fn read_status(output_dir: &Path) -> Result<Option<RunStatus>> {
    let path = status_path(output_dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Replace the status file atomically.
pub fn write_status(output_dir: &Path, status: &RunStatus) -> Result<()> {
    let json = serde_json::to_vec_pretty(status)?;
    write_atomic(&status_path(output_dir), &json)
}
