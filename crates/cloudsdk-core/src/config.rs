use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cloudsdk_util::errors::{CloudSdkError, SdkResult};

/// Proxy variables forwarded to the Windows install script.
const PROXY_VARIABLES: &[&str] = &["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"];

/// Global user configuration loaded from `~/.cloudsdk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub install: InstallConfig,
}

/// Installer settings from `[install]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Managed SDK base directory; platform default when absent.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// `latest` or a pinned release such as `296.0.0`.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, rename = "usage-reporting")]
    pub usage_reporting: bool,
    #[serde(default, rename = "user-agent")]
    pub user_agent: Option<String>,
    /// Extra variables for the install script environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            root: None,
            version: default_version(),
            usage_reporting: false,
            user_agent: None,
            env: BTreeMap::new(),
        }
    }
}

fn default_version() -> String {
    "latest".to_string()
}

impl GlobalConfig {
    /// Load the global configuration from `~/.cloudsdk/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> SdkResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> SdkResult<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CloudSdkError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| CloudSdkError::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// The managed SDK base directory: configured root, else platform default.
    pub fn managed_root(&self) -> SdkResult<PathBuf> {
        match &self.install.root {
            Some(root) => Ok(root.clone()),
            None => default_managed_root(),
        }
    }
}

/// Returns the path to the tool's data directory (`~/.cloudsdk/`).
pub fn dirs_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cloudsdk")
}

/// The user directories the managed root is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirs {
    pub home: Option<PathBuf>,
    /// `$XDG_CACHE_HOME` or `~/.cache` on Linux.
    pub cache: Option<PathBuf>,
    /// `%LOCALAPPDATA%` on Windows.
    pub data_local: Option<PathBuf>,
}

impl UserDirs {
    /// Directories of the current user, as reported by the `dirs` crate.
    pub fn current() -> Self {
        Self {
            home: dirs::home_dir(),
            cache: dirs::cache_dir(),
            data_local: dirs::data_local_dir(),
        }
    }
}

/// Default managed SDK base directory for the running platform.
pub fn default_managed_root() -> SdkResult<PathBuf> {
    managed_root_for(std::env::consts::OS, &UserDirs::current()).ok_or_else(|| {
        CloudSdkError::Config {
            message: "Cannot determine a home directory for the managed Cloud SDK".to_string(),
        }
    })
}

/// Platform convention for the managed SDK base directory.
///
/// `os` takes `std::env::consts::OS` values.
pub fn managed_root_for(os: &str, dirs: &UserDirs) -> Option<PathBuf> {
    match os {
        "windows" => dirs
            .data_local
            .as_ref()
            .map(|dir| dir.join("google").join("ct4j-cloud-sdk")),
        "macos" => dirs.home.as_ref().map(|home| {
            home.join("Library")
                .join("Application Support")
                .join("google")
                .join("ct4j-cloud-sdk")
        }),
        _ => dirs
            .cache
            .clone()
            .or_else(|| dirs.home.as_ref().map(|home| home.join(".cache")))
            .map(|cache| {
                cache
                    .join("google-cloud-tools-java")
                    .join("managed-cloud-sdk")
            }),
    }
}

/// Collect proxy settings from `vars` (either letter case), e.g. `std::env::vars()`.
pub fn proxy_environment(
    vars: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter(|(key, _)| {
            PROXY_VARIABLES
                .iter()
                .any(|proxy| key.eq_ignore_ascii_case(proxy))
        })
        .collect()
}
