use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stored defaults for the `upload` command. The password is never written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub configured: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(config_path) => Self::load_from(&config_path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            return Ok(config);
        }
        Ok(Self::default())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            self.save_to(&config_path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ftp-folder-upload", "ftp-upload")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn is_configured(&self) -> bool {
        self.configured && !self.server_url.is_empty() && !self.username.is_empty()
    }

    pub fn interactive_setup(&mut self) -> Result<()> {
        println!("\nLet's configure the upload target:\n");

        print!("Server URL (ftp://host/path): ");
        io::stdout().flush()?;
        let mut server_url = String::new();
        io::stdin().read_line(&mut server_url)?;
        self.server_url = server_url.trim().to_string();

        print!("Username: ");
        io::stdout().flush()?;
        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        self.username = username.trim().to_string();

        self.configured = true;
        self.save()?;

        println!("\nSettings saved to: {:?}", Self::config_path());
        println!("The password is asked for on every upload unless passed with --password.\n");
        Ok(())
    }
}
