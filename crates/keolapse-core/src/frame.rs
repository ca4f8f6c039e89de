use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Time-ordered still frames of one capture session.
///
/// Frames are sorted by file name once at construction; capture tools name
/// files by timestamp, so lexical order is capture order.
#[derive(Clone, Debug)]
pub struct FrameSet {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl FrameSet {
    pub fn new(dir: impl Into<PathBuf>, mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self {
            dir: dir.into(),
            paths,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Night a session belongs to, used to name the output video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionDate(pub NaiveDate);

impl SessionDate {
    /// Parse a `YYYYMMDD` directory name.
    pub fn from_dir_name(dir: &Path) -> Option<Self> {
        let name = dir.file_name()?.to_str()?;
        NaiveDate::parse_from_str(name, "%Y%m%d").ok().map(Self)
    }

    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }
}
