pub mod ftp;

use crate::error::{UploadError, UploadResult};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::io::Read;
use url::Url;

/// Validated base URL of the target server. Always an absolute `ftp://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    url: Url,
}

impl ServerUrl {
    pub fn parse(value: &str) -> UploadResult<Self> {
        let url = Url::parse(value).map_err(|_| {
            UploadError::InvalidConfiguration(format!("Value {value} is not a valid url"))
        })?;

        if url.scheme() != "ftp" {
            return Err(UploadError::InvalidConfiguration(format!(
                "{value} is not using the ftp protocol"
            )));
        }

        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(UploadError::InvalidConfiguration(format!(
                "{value} has no host"
            )));
        }

        Ok(Self { url })
    }

    /// Normalized URL text without trailing slashes.
    pub fn base(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// `relative` is a forward-slash path below the base, e.g. `sub/file.txt`.
    pub fn file_url(&self, relative: &str) -> String {
        self.join(relative)
    }

    /// `absolute_dir` is a path below the base that starts with `/`.
    pub fn directory_url(&self, absolute_dir: &str) -> String {
        self.join(absolute_dir)
    }

    /// Appends each `/`-separated segment percent-encoded, so `#`, `?` and
    /// `%` in local names survive the round trip through the URL.
    fn join(&self, path: &str) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url.into()
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpMethod {
    /// `STOR`
    Upload,
    /// `MKD`
    MakeDirectory,
}

impl fmt::Display for FtpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("STOR"),
            Self::MakeDirectory => f.write_str("MKD"),
        }
    }
}

/// One FTP command against one URL, executed over its own session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpRequest {
    pub url: String,
    pub method: FtpMethod,
    pub credentials: Credentials,
    pub keep_alive: bool,
    pub use_binary: bool,
}

impl FtpRequest {
    pub fn new(url: impl Into<String>, method: FtpMethod, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            method,
            credentials,
            keep_alive: false,
            use_binary: true,
        }
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn use_binary(mut self, use_binary: bool) -> Self {
        self.use_binary = use_binary;
        self
    }
}

/// Status text returned by the server for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FtpResponse {
    status_description: String,
}

impl FtpResponse {
    pub fn new(status_description: impl Into<String>) -> Self {
        Self {
            status_description: status_description.into(),
        }
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn normalized_status(&self) -> String {
        self.status_description.trim().to_uppercase()
    }
}

#[async_trait]
pub trait FtpTransport: Send + Sync {
    /// Issues `MKD` for the path of `request.url`.
    async fn make_directory(&self, request: FtpRequest) -> Result<FtpResponse>;

    /// Issues `STOR` for the path of `request.url`, copies all of `source`
    /// into the data connection and closes it before reading the reply.
    async fn upload(
        &self,
        request: FtpRequest,
        source: Box<dyn Read + Send>,
    ) -> Result<FtpResponse>;
}
