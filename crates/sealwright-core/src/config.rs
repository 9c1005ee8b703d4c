//! Configuration file loading and parsing

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["sealwright.yaml", "sealwright.yml"];

/// Contents of `sealwright.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Repository root; manifest paths are relative to it
    #[serde(default = "default_repository")]
    pub repository: Utf8PathBuf,

    /// Directory holding one metadata document per secret
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: Utf8PathBuf,

    /// PEM certificate of the decrypting controller
    #[serde(default = "default_certificate")]
    pub certificate: Utf8PathBuf,

    /// Maximum number of secrets resealed at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub sealer: SealerConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            metadata_dir: default_metadata_dir(),
            certificate: default_certificate(),
            concurrency: default_concurrency(),
            sealer: SealerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

fn default_repository() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}

fn default_metadata_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("secrets/metadata")
}

fn default_certificate() -> Utf8PathBuf {
    Utf8PathBuf::from("secrets/pub-cert.pem")
}

fn default_concurrency() -> usize {
    4
}

/// Which sealer implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SealerBackend {
    /// In-process hybrid encryption
    #[default]
    Native,
    /// Delegate to the `kubeseal` binary
    Kubeseal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SealerConfig {
    #[serde(default)]
    pub backend: SealerBackend,

    #[serde(default = "default_kubeseal_path")]
    pub kubeseal_path: String,
}

impl Default for SealerConfig {
    fn default() -> Self {
        Self {
            backend: SealerBackend::default(),
            kubeseal_path: default_kubeseal_path(),
        }
    }
}

fn default_kubeseal_path() -> String {
    "kubeseal".to_string()
}

/// Secret store connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default = "default_store_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_store_endpoint(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_store_endpoint() -> String {
    "https://secretmanager.googleapis.com/v1".to_string()
}

fn default_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Loaded Sealwright configuration
#[derive(Debug, Clone)]
pub struct SealwrightConfig {
    /// The parsed configuration
    pub config: ConfigFile,

    /// Path to the configuration file, if one was found
    pub config_path: Option<Utf8PathBuf>,

    /// Directory relative paths are resolved against
    pub working_dir: Utf8PathBuf,
}

impl SealwrightConfig {
    /// Load configuration from the specified path or search for it
    ///
    /// Without an explicit path, a missing file falls back to defaults rooted
    /// at the current directory.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let found = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::not_found(format!("configuration file {p}"))
                    } else {
                        Error::Io(e)
                    }
                })?;
                Some((p.to_owned(), content))
            }
            None => Self::find_config()?,
        };

        match found {
            Some((config_path, content)) => {
                let config: ConfigFile = serde_yaml_ng::from_str(&content)?;
                let working_dir = config_path
                    .parent()
                    .filter(|p| !p.as_str().is_empty())
                    .map(|p| p.to_owned())
                    .unwrap_or_else(|| Utf8PathBuf::from("."));
                Self::from_parts(config, Some(config_path), working_dir)
            }
            None => Self::from_parts(ConfigFile::default(), None, current_dir()?),
        }
    }

    fn from_parts(
        config: ConfigFile,
        config_path: Option<Utf8PathBuf>,
        working_dir: Utf8PathBuf,
    ) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(Error::validation(
                "concurrency",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            config,
            config_path,
            working_dir,
        })
    }

    /// Build from an in-memory configuration
    pub fn with_config(config: ConfigFile, working_dir: Utf8PathBuf) -> Result<Self> {
        Self::from_parts(config, None, working_dir)
    }

    /// Find configuration file in current directory or parent directories
    fn find_config() -> Result<Option<(Utf8PathBuf, String)>> {
        let cwd = current_dir()?;
        let mut current = cwd.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok(Some((path, content)));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(None)
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn repository_root(&self) -> Utf8PathBuf {
        self.resolve(&self.config.repository)
    }

    /// Metadata directory; relative values are taken from the repository root
    pub fn metadata_dir(&self) -> Utf8PathBuf {
        if self.config.metadata_dir.is_absolute() {
            self.config.metadata_dir.clone()
        } else {
            self.repository_root().join(&self.config.metadata_dir)
        }
    }

    /// Certificate path; relative values are taken from the repository root
    pub fn certificate_path(&self) -> Utf8PathBuf {
        if self.config.certificate.is_absolute() {
            self.config.certificate.clone()
        } else {
            self.repository_root().join(&self.config.certificate)
        }
    }

    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    Utf8PathBuf::try_from(cwd)
        .map_err(|_| Error::validation("cwd", "Current directory path is not valid UTF-8"))
}
