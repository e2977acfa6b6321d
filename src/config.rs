use std::{collections::HashMap, env, fs, io, net::SocketAddr, path::Path};

use ipnet::IpNet;
use thiserror::Error;

use crate::systemd_client::ToolPaths;

pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub allowed_cidr: Option<IpNet>,
    pub tools: ToolPaths,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OBSERVE_API_TOKEN is required and must not be empty")]
    MissingApiToken,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("OBSERVE_ALLOWED_CIDR must be a valid CIDR range")]
    InvalidAllowedCidr,
    #[error("invalid bind address or port")]
    InvalidSocket,
    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Config {
    /// Reads the process environment layered under the dotenv file named by
    /// `OBSERVE_ENV_FILE` (default `.env`). The environment itself is never mutated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_file = env::var("OBSERVE_ENV_FILE").unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
        let file_values = load_env_file(Path::new(&env_file))?;

        Self::from_lookup(|key| file_values.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_token = non_empty("OBSERVE_API_TOKEN").ok_or(ConfigError::MissingApiToken)?;
        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = non_empty("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);
        let allowed_cidr = non_empty("OBSERVE_ALLOWED_CIDR")
            .map(|value| {
                value
                    .parse::<IpNet>()
                    .map_err(|_| ConfigError::InvalidAllowedCidr)
            })
            .transpose()?;

        let defaults = ToolPaths::default();
        let tools = ToolPaths {
            systemctl: non_empty("SYSTEMCTL_PATH").unwrap_or(defaults.systemctl),
            journalctl: non_empty("JOURNALCTL_PATH").unwrap_or(defaults.journalctl),
        };

        let config = Self {
            api_token,
            bind_addr,
            bind_port,
            allowed_cidr,
            tools,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

/// A missing file is not an error and yields no values.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_env_file(&text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.display().to_string(),
            source,
        }),
    }
}

pub fn parse_env_file(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
