//! Provisioning configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, then explicit overrides. A relative destination is resolved
//! against one base directory exactly once; every step then uses the same
//! absolute path.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_SOURCE_URL: &str =
    "https://download2.interactivebrokers.com/portal/clientportal.gw.zip";
pub const DEFAULT_DESTINATION_DIR: &str = "clientportal.gw";
/// Base directory for relative destinations. Defaults to the working directory.
pub const HOME_ENV: &str = "PORTAL_HOME";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub source_url:      String,
    pub destination_dir: PathBuf,
    /// `None` waits as long as the server and OS allow.
    pub http_timeout:    Option<Duration>,
    /// Hold `<destination>.lock` for the whole sequence.
    pub lock:            bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            source_url:      DEFAULT_SOURCE_URL.to_string(),
            destination_dir: PathBuf::from(DEFAULT_DESTINATION_DIR),
            http_timeout:    None,
            lock:            true,
        }
    }
}

impl ProvisionConfig {
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn destination_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_dir = dir.into();
        self
    }

    pub fn http_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Overlay the values a config file sets.
    pub fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(url) = file.source_url {
            self.source_url = url;
        }
        if let Some(dir) = file.destination_dir {
            self.destination_dir = dir;
        }
        if let Some(secs) = file.http_timeout_secs {
            self.http_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(lock) = file.lock {
            self.lock = lock;
        }
        self
    }

    /// Make the destination absolute against `base`, expanding a leading `~`
    /// and folding `.` and `..` components.
    pub fn resolve(mut self, base: &Path) -> Result<Self, ConfigError> {
        let dir = expand_tilde(&self.destination_dir)?;
        let dir = if dir.is_absolute() { dir } else { base.join(dir) };
        self.destination_dir = normalize(&dir);
        Ok(self)
    }

    /// [`resolve`](Self::resolve) against `$PORTAL_HOME` or the working directory.
    pub fn resolve_from_env(self) -> Result<Self, ConfigError> {
        let base = base_dir(std::env::var_os(HOME_ENV))?;
        self.resolve(&base)
    }

    pub fn destination(&self) -> &Path { &self.destination_dir }
}

/// On-disk configuration. Every key is optional.
///
/// ```toml
/// source_url = "https://download2.interactivebrokers.com/portal/clientportal.gw.zip"
/// destination_dir = "~/ibkr/clientportal.gw"
/// http_timeout_secs = 300   # 0 disables the timeout
/// lock = true
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source_url:        Option<String>,
    pub destination_dir:   Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub lock:              Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_tilde(path)?;
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Base directory for relative destinations, given the value of `$PORTAL_HOME`.
pub fn base_dir(env_value: Option<OsString>) -> Result<PathBuf, ConfigError> {
    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => {
            let path = expand_tilde(Path::new(&value))?;
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(current_dir()?.join(path))
            }
        }
        None => current_dir(),
    }
}

/// Lexical only: symlinks are not followed, so `link/..` is the link's parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn current_dir() -> Result<PathBuf, ConfigError> {
    std::env::current_dir().map_err(ConfigError::CurrentDir)
}

fn expand_tilde(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home::home_dir().ok_or(ConfigError::NoHome)?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}
