use std::path::{Path, PathBuf};

use gitnotify_std::fs::{ReadFile, WriteFile};
use serde::{Deserialize, Serialize};

use crate::rules::{RuleSet, null_as_default};

pub const DEFAULT_PORT: u32 = 8080;
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// gitnotify configuration, stored as YAML and exchanged as JSON on
/// `/api/config`.
///
/// ```yaml
/// organization: acme
/// port: 8080
/// webhook_secret: s3cr3t
/// notifications:
///   - event_type: issues
///     actions: [opened, closed]
///   - event_type: pull_request
///     repos: [core]
/// github_app:
///   app_id: 12345
///   installation_id: 67890
///   private_key_path: /etc/gitnotify/app.pem
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub port: u32,
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notifications: RuleSet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub github_app: GithubApp,
}

/// GitHub App credentials. Carried through load, save and the config API;
/// nothing in the notification path reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubApp {
    #[serde(default)]
    pub app_id: u64,
    #[serde(default)]
    pub installation_id: u64,
    #[serde(default)]
    pub private_key_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("organization is required")]
    MissingOrganization,

    #[error("webhook_secret is required")]
    MissingWebhookSecret,

    #[error("port must be between 1 and 65535")]
    PortOutOfRange(u32),
}

impl Config {
    /// Parses YAML, applying [`DEFAULT_PORT`] when the port is zero or absent.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    pub fn load<F: ReadFile + ?Sized>(fs: &F, path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs.read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn save<F: WriteFile + ?Sized>(&self, fs: &F, path: &Path) -> Result<(), ConfigError> {
        let yaml = self.to_yaml()?;
        fs.write(path, &yaml).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.organization.is_empty() {
            return Err(ValidationError::MissingOrganization);
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingWebhookSecret);
        }
        self.listen_port().map(|_| ())
    }

    pub fn listen_port(&self) -> Result<u16, ValidationError> {
        match u16::try_from(self.port) {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(ValidationError::PortOutOfRange(self.port)),
        }
    }
}
