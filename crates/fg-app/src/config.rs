use std::env;
use std::path::PathBuf;
use std::time::Duration;

use fg_client::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
use fg_core::Language;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub language: Language,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            language: Language::default(),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and the `FACEGEN_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(e.into()),
        }

        Ok(Self::from_lookup(|key| env::var(key).ok())?)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FACEGEN_API_URL") {
            config.api_url = url;
        }

        if let Some(secs) = lookup("FACEGEN_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("FACEGEN_TIMEOUT_SECS must be a number, got {secs:?}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(lang) = lookup("FACEGEN_LANG") {
            config.language = lang
                .parse()
                .map_err(|e| AppError::Config(format!("FACEGEN_LANG: {e}")))?;
        }

        if let Some(dir) = lookup("FACEGEN_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.api_url = url.clone();
        }
        if let Some(lang) = cli.lang {
            self.language = lang;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout(self.timeout)
    }
}
