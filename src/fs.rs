use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file found under the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: DateTime<Local>) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Current,
    Recursive,
}

pub trait FileSystem: Send + Sync {
    /// Resolves a possibly relative path against the working directory.
    fn absolute(&self, path: &Path) -> PathBuf;

    /// Lists the regular files under `root`, all extensions.
    fn list_files(&self, root: &Path, scope: SearchScope) -> io::Result<Vec<LocalFile>>;

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// The real disk, walked with `walkdir` in file-name order.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    working_directory: PathBuf,
}

impl LocalFileSystem {
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_working_directory(std::env::current_dir()?))
    }

    pub fn with_working_directory(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory.join(path)
        }
    }

    fn list_files(&self, root: &Path, scope: SearchScope) -> io::Result<Vec<LocalFile>> {
        let root = self.absolute(root);
        let max_depth = match scope {
            SearchScope::Current => 1,
            SearchScope::Recursive => usize::MAX,
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(io::Error::from)?;
            let modified = metadata
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now());
            files.push(LocalFile::new(entry.into_path(), metadata.len(), modified));
        }

        Ok(files)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.absolute(path))?;
        Ok(Box::new(file))
    }
}
