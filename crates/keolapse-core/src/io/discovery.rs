use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{KeolapseError, Result};
use crate::frame::{FrameSet, SessionDate};

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

fn list_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extensions) {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Collect the session's frames from `dir`, sorted by name.
pub fn discover_frames(dir: &Path, extensions: &[String]) -> Result<FrameSet> {
    if !dir.is_dir() {
        return Err(KeolapseError::NoImages(dir.to_path_buf()));
    }
    let paths = list_images(dir, extensions)?;
    if paths.is_empty() {
        return Err(KeolapseError::NoImages(dir.to_path_buf()));
    }
    debug!(dir = %dir.display(), count = paths.len(), "Discovered frames");
    Ok(FrameSet::new(dir, paths))
}

/// Locate the keogram for a session.
///
/// Prefers files whose name contains the session date; otherwise takes any
/// image in the directory. Among candidates the newest file wins.
pub fn find_keogram(
    dir: &Path,
    date: Option<SessionDate>,
    extensions: &[String],
) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(KeolapseError::KeogramNotFound(dir.to_path_buf()));
    }
    let candidates = list_images(dir, extensions)?;

    let dated: Vec<&PathBuf> = match date {
        Some(d) => {
            let stamp = d.compact();
            candidates
                .iter()
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.contains(&stamp))
                })
                .collect()
        }
        None => Vec::new(),
    };
    let pool: Vec<&PathBuf> = if dated.is_empty() {
        candidates.iter().collect()
    } else {
        dated
    };

    pool.into_iter()
        .max_by_key(|p| {
            let modified = std::fs::metadata(p).and_then(|m| m.modified()).ok();
            (modified, p.file_name().map(|n| n.to_os_string()))
        })
        .cloned()
        .ok_or_else(|| KeolapseError::KeogramNotFound(dir.to_path_buf()))
}

/// Deterministic video path for a session: `<dir>/<prefix>-<YYYYMMDD>.<ext>`.
pub fn output_video_path(output_dir: &Path, prefix: &str, date: SessionDate, extension: &str) -> PathBuf {
    output_dir.join(format!("{prefix}-{}.{extension}", date.compact()))
}
