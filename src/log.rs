/// Sink for progress messages. Implementations must not fail.
pub trait UploadLog: Send + Sync {
    fn verbose(&self, message: &str);
    fn information(&self, message: &str);
}

/// Forwards verbose messages to `tracing::debug!` and information to `tracing::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl UploadLog for TracingLog {
    fn verbose(&self, message: &str) {
        tracing::debug!(target: "ftp_folder_upload", "{}", message);
    }

    fn information(&self, message: &str) {
        tracing::info!(target: "ftp_folder_upload", "{}", message);
    }
}
