//! Pure path arithmetic: which files go where and which remote directories
//! are new in this run.

use crate::client::ServerUrl;
use crate::error::{UploadError, UploadResult};
use crate::fs::LocalFile;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

pub type FileFilter = Box<dyn Fn(&LocalFile) -> bool + Send + Sync>;
pub type FileOrder = Box<dyn Fn(&LocalFile, &LocalFile) -> Ordering + Send + Sync>;

/// How remote directory names are compared when deduplicating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathComparison {
    CaseSensitive,
    CaseInsensitive,
}

impl PathComparison {
    /// Case-sensitive on Unix-like hosts, insensitive elsewhere.
    pub fn for_platform() -> Self {
        if cfg!(unix) {
            Self::CaseSensitive
        } else {
            Self::CaseInsensitive
        }
    }
}

impl Default for PathComparison {
    fn default() -> Self {
        Self::for_platform()
    }
}

/// Remote directories already attempted during one run.
#[derive(Debug)]
pub struct VisitedDirectories {
    comparison: PathComparison,
    seen: HashSet<String>,
}

impl VisitedDirectories {
    pub fn new(comparison: PathComparison) -> Self {
        Self {
            comparison,
            seen: HashSet::new(),
        }
    }

    /// Records `directory`; returns true when it was not seen before.
    pub fn insert(&mut self, directory: &str) -> bool {
        let key = match self.comparison {
            PathComparison::CaseSensitive => directory.to_string(),
            PathComparison::CaseInsensitive => directory.to_lowercase(),
        };
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Set on the first file that introduces its remote directory.
    pub create_directory: Option<String>,
    pub remote_directory: String,
    pub remote_url: String,
    pub local_path: PathBuf,
    pub size: u64,
}

/// Filter first, then a stable sort.
pub fn select_files(
    files: Vec<LocalFile>,
    filter: Option<&FileFilter>,
    order: Option<&FileOrder>,
) -> Vec<LocalFile> {
    let mut files: Vec<LocalFile> = match filter {
        Some(filter) => files.into_iter().filter(|f| filter(f)).collect(),
        None => files,
    };

    if let Some(order) = order {
        files.sort_by(|a, b| order(a, b));
    }

    files
}

/// `path` relative to `root`, joined with `/`.
pub fn relative_path(root: &Path, path: &Path) -> UploadResult<String> {
    let outside = || UploadError::OutsideRoot {
        root: root.to_path_buf(),
        path: path.to_path_buf(),
    };

    let relative = path.strip_prefix(root).map_err(|_| outside())?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }

    if segments.is_empty() {
        return Err(outside());
    }

    Ok(segments.join("/"))
}

/// Directory part of a forward-slash relative path, empty at the root.
pub fn directory_part(relative: &str) -> &str {
    relative.rsplit_once('/').map_or("", |(dir, _)| dir)
}

pub fn plan(
    root: &Path,
    server_url: &ServerUrl,
    files: &[LocalFile],
    comparison: PathComparison,
) -> UploadResult<Vec<PlannedFile>> {
    let mut visited = VisitedDirectories::new(comparison);

    files
        .iter()
        .map(|file| -> UploadResult<PlannedFile> {
            let relative = relative_path(root, &file.path)?;
            let directory = directory_part(&relative).to_string();

            let create_directory = if !directory.is_empty() && visited.insert(&directory) {
                Some(directory.clone())
            } else {
                None
            };

            Ok(PlannedFile {
                create_directory,
                remote_directory: directory,
                remote_url: server_url.file_url(&relative),
                local_path: file.path.clone(),
                size: file.size,
            })
        })
        .collect()
}
