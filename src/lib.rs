#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! Recursive folder upload to a plain FTP server.
//!
//! [`upload::FolderUploader`] lists the files under a root, recreates the
//! directory layout remotely with one `MKD` per path segment and sends each
//! file with `STOR`, all over short-lived single-command sessions.

pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod log;
pub mod planner;
pub mod upload;
pub mod utils;

pub use client::ftp::SuppaFtpTransport;
pub use client::{Credentials, FtpMethod, FtpRequest, FtpResponse, FtpTransport, ServerUrl};
pub use error::{UploadError, UploadResult};
pub use fs::{FileSystem, LocalFile, LocalFileSystem, SearchScope};
pub use log::{TracingLog, UploadLog};
pub use planner::PathComparison;
pub use upload::{FolderUploader, UploadRequest, UploadSummary};
