use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::PartySet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SERVER_PORT must be a valid u16, got {0:?}")]
    InvalidPort(String),
    #[error("LEDGER_PARTIES must list at least one party and no party twice, got {0:?}")]
    InvalidParties(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ledger_path: PathBuf,
    pub parties: PartySet,
    pub seed_sample_votes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 10040,
            ledger_path: PathBuf::from("votes.json"),
            parties: PartySet::default(),
            seed_sample_votes: false,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            config.port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(path) = lookup("LEDGER_FILE") {
            config.ledger_path = PathBuf::from(path);
        }
        if let Some(list) = lookup("LEDGER_PARTIES") {
            let names = list.split(',').map(str::trim).filter(|p| !p.is_empty());
            config.parties =
                PartySet::new(names).ok_or_else(|| ConfigError::InvalidParties(list.clone()))?;
        }
        if let Some(flag) = lookup("SEED_SAMPLE_VOTES") {
            config.seed_sample_votes =
                matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
