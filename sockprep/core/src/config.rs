//! TOML Configuration File Support
//!
//! Loads socket preparation settings from `~/.config/sockprep/sockprep.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Environment Variables
//!
//! - `SOCKPREP_ENDPOINT`: Socket endpoint (`unix:///path` or a bare path)
//! - `SOCKPREP_UMASK`: Octal permission mask installed before binding
//!
//! # Example Configuration
//!
//! ```toml
//! [socket]
//! endpoint = "unix:///run/sockprep/sockprep.sock"
//! umask = 0o077
//! create_parent_dir = true
//! restore_umask = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bootstrap::SocketOptions;
use crate::endpoint::{EndpointError, SocketEndpoint};
use crate::mask::PermissionMask;

/// Environment variable naming the socket endpoint
pub const ENV_ENDPOINT: &str = "SOCKPREP_ENDPOINT";

/// Environment variable holding the octal umask
pub const ENV_UMASK: &str = "SOCKPREP_UMASK";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Endpoint string could not be parsed
    #[error("Invalid endpoint: {0}")]
    EndpointError(#[from] EndpointError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Socket section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketToml {
    /// Socket endpoint (`unix:///path` or a bare path)
    pub endpoint: Option<String>,

    /// Permission mask installed before the socket is created
    pub umask: Option<PermissionMask>,

    /// Whether to create the socket's parent directory
    pub create_parent_dir: Option<bool>,

    /// Whether to put the previous umask back after binding
    pub restore_umask: Option<bool>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SockprepToml {
    /// Socket preparation settings
    pub socket: SocketToml,
}

/// Fully resolved configuration
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Options handed to the bootstrap
    pub options: SocketOptions,
    /// Where the endpoint came from
    pub endpoint_source: ConfigSource,
    /// Where the umask came from
    pub umask_source: ConfigSource,
    /// The config file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            options: SocketOptions::default(),
            endpoint_source: ConfigSource::Default,
            umask_source: ConfigSource::Default,
            config_file_path: None,
        }
    }
}

impl ResolvedConfig {
    fn apply_toml(&mut self, toml: &SockprepToml) -> Result<(), ConfigError> {
        let socket = &toml.socket;

        if let Some(ref endpoint) = socket.endpoint {
            let endpoint: SocketEndpoint = endpoint.parse()?;
            self.options.path = endpoint.into_path();
            self.endpoint_source = ConfigSource::File;
        }
        if let Some(umask) = socket.umask {
            self.options.umask = Some(umask);
            self.umask_source = ConfigSource::File;
        }
        if let Some(create) = socket.create_parent_dir {
            self.options.create_parent_dir = create;
        }
        if let Some(restore) = socket.restore_umask {
            self.options.restore_umask = restore;
        }
        Ok(())
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            let endpoint: SocketEndpoint = endpoint.parse()?;
            self.options.path = endpoint.into_path();
            self.endpoint_source = ConfigSource::Env;
        }
        if let Some(umask) = lookup(ENV_UMASK) {
            let umask = umask
                .parse::<PermissionMask>()
                .map_err(|e| ConfigError::ValidationError(format!("{ENV_UMASK}: {e}")))?;
            self.options.umask = Some(umask);
            self.umask_source = ConfigSource::Env;
        }
        Ok(())
    }
}

/// Get the default configuration file path
///
/// `$XDG_CONFIG_HOME/sockprep/sockprep.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sockprep").join("sockprep.toml"))
}

/// Load configuration from the default path plus the environment
pub fn load_config() -> Result<ResolvedConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from `path` plus the environment
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ResolvedConfig, ConfigError> {
    let mut config = load_file(path)?;
    config.apply_env_with(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn load_file(path: Option<PathBuf>) -> Result<ResolvedConfig, ConfigError> {
    let mut config = ResolvedConfig::default();

    let Some(config_path) = path else {
        return Ok(config);
    };

    if !config_path.exists() {
        tracing::debug!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return Ok(config);
    }

    let toml_content =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
            path: config_path.clone(),
            source: e,
        })?;

    let toml_config: SockprepToml = toml::from_str(&toml_content)?;
    config.apply_toml(&toml_config)?;

    tracing::info!(
        path = %config_path.display(),
        "Loaded configuration from file"
    );
    config.config_file_path = Some(config_path);

    Ok(config)
}

/// CLI overrides applied on top of file and environment values
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub endpoint: Option<SocketEndpoint>,

    /// Umask override
    pub umask: Option<PermissionMask>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: SocketEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set umask override
    #[must_use]
    pub fn with_umask(mut self, umask: PermissionMask) -> Self {
        self.umask = Some(umask);
        self
    }

    /// Apply overrides to a resolved configuration
    pub fn apply(&self, config: &mut ResolvedConfig) {
        if let Some(ref endpoint) = self.endpoint {
            config.options.path = endpoint.path().to_path_buf();
            config.endpoint_source = ConfigSource::Cli;
        }
        if let Some(umask) = self.umask {
            config.options.umask = Some(umask);
            config.umask_source = ConfigSource::Cli;
        }
    }
}
