use super::{FtpMethod, FtpRequest, FtpResponse, FtpTransport};
use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use std::io::Read;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use url::Url;

// suppaftp checks the closing reply code itself and drops its text.
const UPLOAD_ACCEPTED: &str = "226 Transfer complete";
const DIRECTORY_CREATED: &str = "257 Directory created";

/// Plain FTP transport on top of suppaftp's blocking client.
///
/// Every request gets its own session: connect, login, one command, quit.
/// There is no pooling, so `keep_alive` has no effect here.
#[derive(Debug, Default, Clone)]
pub struct SuppaFtpTransport;

#[derive(Debug, PartialEq, Eq)]
struct Endpoint {
    address: String,
    path: String,
}

impl SuppaFtpTransport {
    pub fn new() -> Self {
        Self
    }

    fn endpoint(url: &str) -> Result<Endpoint> {
        let parsed = Url::parse(url).with_context(|| format!("invalid ftp url {url}"))?;
        ensure!(parsed.scheme() == "ftp", "{url} is not an ftp url");

        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow!("{url} has no host"))?;
        let port = parsed.port_or_known_default().unwrap_or(21);
        let path = percent_decode_str(parsed.path())
            .decode_utf8()
            .with_context(|| format!("{url} has a non utf-8 path"))?
            .into_owned();

        Ok(Endpoint {
            address: format!("{host}:{port}"),
            path,
        })
    }

    fn connect_ftp(endpoint: &Endpoint, request: &FtpRequest) -> Result<FtpStream> {
        let mut ftp = FtpStream::connect(&endpoint.address)
            .with_context(|| format!("failed to connect to {}", endpoint.address))?;
        ftp.login(
            request.credentials.username.as_str(),
            request.credentials.password.as_str(),
        )?;
        if request.use_binary {
            ftp.transfer_type(FileType::Binary)?;
        }
        Ok(ftp)
    }

    fn reply_text(response: &suppaftp::types::Response) -> String {
        String::from_utf8_lossy(&response.body).trim().to_string()
    }

    /// The reply has already been read by now, so a failed `QUIT` does not
    /// change the outcome of the request.
    fn close(mut ftp: FtpStream, url: &str) {
        if let Err(e) = ftp.quit() {
            tracing::warn!(url, error = %e, "failed to close ftp session");
        }
    }

    fn make_directory_blocking(request: &FtpRequest) -> Result<FtpResponse> {
        let endpoint = Self::endpoint(&request.url)?;
        let mut ftp = Self::connect_ftp(&endpoint, request)?;

        let response = match ftp.mkdir(&endpoint.path) {
            Ok(()) => FtpResponse::new(DIRECTORY_CREATED),
            Err(FtpError::UnexpectedResponse(reply)) => FtpResponse::new(Self::reply_text(&reply)),
            Err(e) => return Err(e.into()),
        };

        Self::close(ftp, &request.url);
        Ok(response)
    }

    fn upload_blocking(request: &FtpRequest, mut source: Box<dyn Read + Send>) -> Result<FtpResponse> {
        let endpoint = Self::endpoint(&request.url)?;
        let mut ftp = Self::connect_ftp(&endpoint, request)?;

        // Sends STOR, copies the data, closes the data stream and reads the reply.
        let response = match ftp.put_file(&endpoint.path, &mut source) {
            Ok(_) => FtpResponse::new(UPLOAD_ACCEPTED),
            Err(FtpError::UnexpectedResponse(reply)) => FtpResponse::new(Self::reply_text(&reply)),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to upload {}", request.url))
            }
        };

        Self::close(ftp, &request.url);
        Ok(response)
    }
}

#[async_trait]
impl FtpTransport for SuppaFtpTransport {
    async fn make_directory(&self, request: FtpRequest) -> Result<FtpResponse> {
        ensure!(
            request.method == FtpMethod::MakeDirectory,
            "{} request sent to make_directory",
            request.method
        );

        tokio::task::spawn_blocking(move || Self::make_directory_blocking(&request)).await?
    }

    async fn upload(
        &self,
        request: FtpRequest,
        source: Box<dyn Read + Send>,
    ) -> Result<FtpResponse> {
        ensure!(
            request.method == FtpMethod::Upload,
            "{} request sent to upload",
            request.method
        );

        tokio::task::spawn_blocking(move || Self::upload_blocking(&request, source)).await?
    }
}
