#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::cast_precision_loss
)]

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use ftp_folder_upload::config::Config;
use ftp_folder_upload::utils::{matches_any, SortField};
use ftp_folder_upload::{
    FolderUploader, LocalFileSystem, PathComparison, SuppaFtpTransport, TracingLog, UploadRequest,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Asks for the password unless one was given on the command line.
fn ensure_password(config: &mut Config) -> Result<()> {
    if config.password.is_none() {
        use std::io::Write;

        print!("Password (hidden - you won't see it when you type): ");
        std::io::stdout().flush()?;

        match rpassword::prompt_password("") {
            Ok(password) => {
                config.password = Some(password);
            }
            Err(_) => {
                let mut password = String::new();
                std::io::stdin().read_line(&mut password)?;
                config.password = Some(password.trim().to_string());
            }
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log every FTP command and reply
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local folder recursively
    Upload {
        /// Local folder to upload
        root: PathBuf,

        /// Target URL, e.g. ftp://host/www (defaults to the configured one)
        #[arg(short, long)]
        server: Option<String>,

        /// FTP username (defaults to the configured one)
        #[arg(short, long)]
        username: Option<String>,

        /// FTP password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,

        /// Only upload files whose name matches one of these patterns
        #[arg(short, long)]
        include: Vec<String>,

        /// Upload order: path, name, size, modified
        #[arg(long)]
        sort: Option<SortField>,

        /// Reverse the upload order
        #[arg(short, long, requires = "sort")]
        reverse: bool,

        /// Compare remote directory names case-sensitively
        #[arg(long, conflicts_with = "case_insensitive")]
        case_sensitive: bool,

        /// Compare remote directory names case-insensitively
        #[arg(long)]
        case_insensitive: bool,
    },

    /// Configure default server settings
    Config {
        /// Server URL
        #[arg(long)]
        server: Option<String>,

        /// Username
        #[arg(long)]
        username: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Upload {
            root,
            server,
            username,
            password,
            include,
            sort,
            reverse,
            case_sensitive,
            case_insensitive,
        } => {
            let mut config = Config::load()?;
            if server.is_none() && username.is_none() && !config.is_configured() {
                config.interactive_setup()?;
            }
            if let Some(server) = server {
                config.server_url = server;
            }
            if let Some(username) = username {
                config.username = username;
            }
            config.password = password;
            ensure_password(&mut config)?;

            let password = config
                .password
                .clone()
                .ok_or_else(|| anyhow!("Password not configured"))?;

            let mut request =
                UploadRequest::new(root, &config.server_url, config.username.clone(), password)?;
            if !include.is_empty() {
                request = request.with_filter(move |file| matches_any(file, &include));
            }
            if let Some(field) = sort {
                request = if reverse {
                    request.sort_by_key(move |file| std::cmp::Reverse(field.key(file)))
                } else {
                    request.sort_by_key(move |file| field.key(file))
                };
            }

            let comparison = if case_sensitive {
                PathComparison::CaseSensitive
            } else if case_insensitive {
                PathComparison::CaseInsensitive
            } else {
                PathComparison::for_platform()
            };

            let fs = LocalFileSystem::new()?;
            let transport = SuppaFtpTransport::new();
            let log = TracingLog;
            let uploader = FolderUploader::new(&fs, &transport, &log).with_comparison(comparison);

            let summary = uploader.upload_folder(request).await?;

            println!(
                "\nUpload complete: {} files ({}), {} directories",
                summary.files.len(),
                human_bytes::human_bytes(summary.bytes as f64),
                summary.directories.len()
            );
        }
        Commands::Config { server, username } => {
            let mut config = Config::load()?;

            if server.is_none() && username.is_none() {
                config.interactive_setup()?;
            } else {
                if let Some(server) = server {
                    config.server_url = server;
                }
                if let Some(username) = username {
                    config.username = username;
                }
                config.configured = true;

                config.save()?;
                println!("Configuration saved successfully!");
            }
        }
    }

    Ok(())
}
