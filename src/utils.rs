// Helpers behind the CLI's --include and --sort options

use crate::fs::LocalFile;
use std::str::FromStr;

pub fn glob_match(filename: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(ext) = pattern.strip_prefix("*.") {
        filename.ends_with(&format!(".{}", ext))
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        filename.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        filename.ends_with(suffix)
    } else {
        filename == pattern
    }
}

/// True when no patterns are given or any of them matches the file name.
pub fn matches_any(file: &LocalFile, patterns: &[String]) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| glob_match(file.file_name(), p))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Full local path, which keeps directories together.
    Path,
    Name,
    Size,
    Modified,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(Self::Path),
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            "modified" | "date" => Ok(Self::Modified),
            other => Err(format!("unknown sort field '{other}' (path, name, size, modified)")),
        }
    }
}

/// Orderable key for `file`; used with `UploadRequest::sort_by_key`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Number(i64),
}

impl SortField {
    pub fn key(self, file: &LocalFile) -> SortKey {
        match self {
            Self::Path => SortKey::Text(file.path.to_string_lossy().into_owned()),
            Self::Name => SortKey::Text(file.file_name().to_lowercase()),
            Self::Size => SortKey::Number(i64::try_from(file.size).unwrap_or(i64::MAX)),
            Self::Modified => SortKey::Number(file.modified.timestamp_millis()),
        }
    }
}
