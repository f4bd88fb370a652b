#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ftp_folder_upload::{FtpRequest, FtpResponse, FtpTransport, UploadLog};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Creates `root/<relative>` files with their own path as content.
pub fn create_tree(files: &[&str]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for relative in files {
        write_file(temp_dir.path(), relative, relative);
    }
    temp_dir
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MakeDirectory(String),
    Upload(String),
}

/// In-memory transport that records every request in order.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    requests: Mutex<Vec<FtpRequest>>,
    uploads: Mutex<HashMap<String, Vec<u8>>>,
    upload_status: Mutex<HashMap<String, String>>,
    failing_directories: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to uploads of `url` with `status` instead of a success.
    pub fn reply_to_upload(&self, url: &str, status: &str) {
        self.upload_status
            .lock()
            .unwrap()
            .insert(url.to_string(), status.to_string());
    }

    /// Makes `MKD` on `url` fail with a transport error.
    pub fn fail_directory(&self, url: &str) {
        self.failing_directories
            .lock()
            .unwrap()
            .insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<FtpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn directory_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::MakeDirectory(url) => Some(url),
                Call::Upload(_) => None,
            })
            .collect()
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload(url) => Some(url),
                Call::MakeDirectory(_) => None,
            })
            .collect()
    }

    pub fn uploaded(&self, url: &str) -> Option<Vec<u8>> {
        self.uploads.lock().unwrap().get(url).cloned()
    }

    pub fn connection_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FtpTransport for RecordingTransport {
    async fn make_directory(&self, request: FtpRequest) -> Result<FtpResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::MakeDirectory(request.url.clone()));
        self.requests.lock().unwrap().push(request.clone());

        if self.failing_directories.lock().unwrap().contains(&request.url) {
            return Err(anyhow!("550 Create directory operation failed"));
        }
        Ok(FtpResponse::new("257 Created"))
    }

    async fn upload(
        &self,
        request: FtpRequest,
        mut source: Box<dyn Read + Send>,
    ) -> Result<FtpResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Upload(request.url.clone()));
        self.requests.lock().unwrap().push(request.clone());

        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        self.uploads.lock().unwrap().insert(request.url.clone(), data);

        let status = self
            .upload_status
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| "226 Transfer complete.".to_string());
        Ok(FtpResponse::new(status))
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub verbose: Mutex<Vec<String>>,
    pub information: Mutex<Vec<String>>,
}

impl UploadLog for RecordingLog {
    fn verbose(&self, message: &str) {
        self.verbose.lock().unwrap().push(message.to_string());
    }

    fn information(&self, message: &str) {
        self.information.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct FakeFtpState {
    pub commands: Vec<String>,
    pub directories: HashSet<String>,
    pub files: HashMap<String, Vec<u8>>,
    pub reject_uploads: bool,
    /// Hang up on `QUIT` without sending a reply.
    pub drop_on_quit: bool,
    pub sessions: usize,
}

/// Minimal single-threaded FTP server speaking just enough for `MKD` and
/// passive-mode `STOR`.
pub struct FakeFtpServer {
    pub port: u16,
    pub state: Arc<Mutex<FakeFtpState>>,
}

impl FakeFtpServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(FakeFtpState::default()));

        let thread_state = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                thread_state.lock().unwrap().sessions += 1;
                let _ = Self::serve(stream, &thread_state);
            }
        });

        Self { port, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("ftp://127.0.0.1:{}{}", self.port, path)
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn stored_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.lock().unwrap().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn reply(control: &mut TcpStream, line: &str) -> std::io::Result<()> {
        control.write_all(format!("{line}\r\n").as_bytes())
    }

    fn accept_data(listener: &TcpListener) -> Option<TcpStream> {
        listener.set_nonblocking(true).ok()?;
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false).ok()?;
                    return Some(stream);
                }
                Err(_) => thread::sleep(Duration::from_millis(10)),
            }
        }
        None
    }

    fn serve(mut control: TcpStream, state: &Arc<Mutex<FakeFtpState>>) -> std::io::Result<()> {
        let mut reader = BufReader::new(control.try_clone()?);
        let mut data_listener: Option<TcpListener> = None;
        Self::reply(&mut control, "220 fake ftp ready")?;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end().to_string();
            let (command, argument) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let command = command.to_uppercase();

            let recorded = if command == "PASS" {
                "PASS ***".to_string()
            } else {
                line.clone()
            };
            state.lock().unwrap().commands.push(recorded);

            match command.as_str() {
                "USER" => Self::reply(&mut control, "331 Password required")?,
                "PASS" => Self::reply(&mut control, "230 Logged in")?,
                "TYPE" => Self::reply(&mut control, "200 Type set to I")?,
                "MKD" => {
                    let created = state
                        .lock()
                        .unwrap()
                        .directories
                        .insert(argument.to_string());
                    if created {
                        Self::reply(&mut control, &format!("257 \"{argument}\" created"))?;
                    } else {
                        Self::reply(&mut control, "550 Create directory operation failed")?;
                    }
                }
                "PASV" | "EPSV" => {
                    let listener = TcpListener::bind("127.0.0.1:0")?;
                    let port = listener.local_addr()?.port();
                    data_listener = Some(listener);
                    if command == "PASV" {
                        Self::reply(
                            &mut control,
                            &format!(
                                "227 Entering Passive Mode (127,0,0,1,{},{})",
                                port / 256,
                                port % 256
                            ),
                        )?;
                    } else {
                        Self::reply(
                            &mut control,
                            &format!("229 Entering Extended Passive Mode (|||{port}|)"),
                        )?;
                    }
                }
                "STOR" => {
                    let Some(listener) = data_listener.take() else {
                        Self::reply(&mut control, "425 Use PASV first")?;
                        continue;
                    };

                    if state.lock().unwrap().reject_uploads {
                        Self::reply(&mut control, "550 Permission denied")?;
                        drop(Self::accept_data(&listener));
                        continue;
                    }

                    Self::reply(&mut control, "150 Ok to send data")?;
                    let mut data = Vec::new();
                    if let Some(mut stream) = Self::accept_data(&listener) {
                        stream.read_to_end(&mut data)?;
                    }
                    state
                        .lock()
                        .unwrap()
                        .files
                        .insert(argument.to_string(), data);
                    Self::reply(&mut control, "226 Transfer complete")?;
                }
                "QUIT" => {
                    if state.lock().unwrap().drop_on_quit {
                        return Ok(());
                    }
                    Self::reply(&mut control, "221 Goodbye")?;
                    return Ok(());
                }
                _ => Self::reply(&mut control, "502 Command not implemented")?,
            }
        }
    }
}
