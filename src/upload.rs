use crate::client::{Credentials, FtpMethod, FtpRequest, FtpTransport, ServerUrl};
use crate::error::{UploadError, UploadResult};
use crate::fs::{FileSystem, LocalFile, SearchScope};
use crate::log::UploadLog;
use crate::planner::{self, FileFilter, FileOrder, PathComparison};
use std::path::{Path, PathBuf};

/// Reply phrases that confirm a completed `STOR`.
pub const ACCEPTED_UPLOAD_STATUSES: [&str; 2] = ["TRANSFER COMPLETE", "FILE RECEIVE OK"];

/// Everything needed for one folder upload. The server URL is validated on
/// construction so a bad configuration never reaches the network.
pub struct UploadRequest {
    pub root: PathBuf,
    pub server_url: ServerUrl,
    pub credentials: Credentials,
    filter: Option<FileFilter>,
    order: Option<FileOrder>,
}

impl UploadRequest {
    pub fn new(
        root: impl Into<PathBuf>,
        server_url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> UploadResult<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(UploadError::InvalidConfiguration(
                "upload root must not be empty".to_string(),
            ));
        }

        let credentials = Credentials::new(username, password);
        if credentials.username.is_empty() {
            return Err(UploadError::InvalidConfiguration(
                "username must not be empty".to_string(),
            ));
        }

        Ok(Self {
            root,
            server_url: ServerUrl::parse(server_url)?,
            credentials,
            filter: None,
            order: None,
        })
    }

    /// Only files matching `filter` are uploaded.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&LocalFile) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Upload order by `key`; files with equal keys keep listing order.
    pub fn sort_by_key<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&LocalFile) -> K + Send + Sync + 'static,
    {
        self.order = Some(Box::new(move |a: &LocalFile, b: &LocalFile| {
            key(a).cmp(&key(b))
        }));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Remote directories attempted, in creation order.
    pub directories: Vec<String>,
    /// Remote URLs uploaded, in upload order.
    pub files: Vec<String>,
    pub bytes: u64,
}

pub struct FolderUploader<'a> {
    fs: &'a dyn FileSystem,
    transport: &'a dyn FtpTransport,
    log: &'a dyn UploadLog,
    comparison: PathComparison,
}

impl<'a> FolderUploader<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        transport: &'a dyn FtpTransport,
        log: &'a dyn UploadLog,
    ) -> Self {
        Self {
            fs,
            transport,
            log,
            comparison: PathComparison::for_platform(),
        }
    }

    pub fn with_comparison(mut self, comparison: PathComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Uploads every file under `request.root`, creating remote directories
    /// first. Stops at the first failed upload.
    pub async fn upload_folder(&self, request: UploadRequest) -> UploadResult<UploadSummary> {
        let root = self.fs.absolute(&request.root);
        let files = self
            .fs
            .list_files(&root, SearchScope::Recursive)
            .map_err(|e| UploadError::io(&root, e))?;
        let files = planner::select_files(files, request.filter.as_ref(), request.order.as_ref());
        self.log.verbose(&format!(
            "Uploading {} files from {} to {}",
            files.len(),
            root.display(),
            request.server_url
        ));

        let planned = planner::plan(&root, &request.server_url, &files, self.comparison)?;

        let mut summary = UploadSummary::default();
        for file in planned {
            if let Some(directory) = file.create_directory {
                self.log
                    .verbose(&format!("Trying to Ensure folderpath {directory}"));
                self.ensure_directory(&request.server_url, &request.credentials, &directory)
                    .await;
                summary.directories.push(directory);
            }

            if self
                .upload_file(&file.remote_url, &request.credentials, &file.local_path)
                .await?
            {
                self.log.information(&format!(
                    "Uploaded file {} to {}",
                    file.local_path.display(),
                    file.remote_url
                ));
                summary.bytes += file.size;
                summary.files.push(file.remote_url);
            }
        }

        Ok(summary)
    }

    /// Issues `MKD` for every ancestor of `directory`, left to right.
    /// Failures are logged and ignored: a rejected `MKD` usually means the
    /// directory already exists.
    pub async fn ensure_directory(
        &self,
        server_url: &ServerUrl,
        credentials: &Credentials,
        directory: &str,
    ) {
        self.log.verbose(&format!("Getting folders for {directory}"));

        let mut current = String::new();
        for segment in directory.split('/') {
            current.push('/');
            current.push_str(segment);

            let url = server_url.directory_url(&current);
            self.log
                .verbose(&format!("Try creating folder {current} with {url}"));

            let request = FtpRequest::new(url, FtpMethod::MakeDirectory, credentials.clone())
                .keep_alive(false)
                .use_binary(true);

            match self.transport.make_directory(request).await {
                Ok(response) => self
                    .log
                    .verbose(&format!("Response {}", response.normalized_status())),
                Err(e) => self.log.verbose(&format!(
                    "Folder not created due to exception {e:#}. This is most likely ok"
                )),
            }
        }
    }

    /// Sends one local file with `STOR`. Only an accepted reply counts as success.
    pub async fn upload_file(
        &self,
        remote_url: &str,
        credentials: &Credentials,
        local_path: &Path,
    ) -> UploadResult<bool> {
        let source = self
            .fs
            .open_read(local_path)
            .map_err(|e| UploadError::io(local_path, e))?;

        self.log.verbose(&format!("Creating request for {remote_url}"));
        self.log.verbose(&format!(
            "Using credentials user: {}, password: ***",
            credentials.username
        ));
        self.log.verbose("Setting KeepAlive:false, UseBinary:true");

        let request = FtpRequest::new(remote_url, FtpMethod::Upload, credentials.clone())
            .keep_alive(false)
            .use_binary(true);

        let response = self
            .transport
            .upload(request, source)
            .await
            .map_err(UploadError::Transport)?;

        validate_upload_status(&response.normalized_status())?;
        Ok(true)
    }
}

/// Accepts `status` when it contains one of [`ACCEPTED_UPLOAD_STATUSES`].
pub fn validate_upload_status(status: &str) -> UploadResult<()> {
    let upper = status.to_uppercase();
    if ACCEPTED_UPLOAD_STATUSES
        .iter()
        .any(|accepted| upper.contains(accepted))
    {
        Ok(())
    } else {
        Err(UploadError::UploadRejected {
            status: status.to_string(),
        })
    }
}
