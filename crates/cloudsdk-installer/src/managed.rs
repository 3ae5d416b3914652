//! A Cloud SDK installation owned by this tool under a managed root.

use std::fs;
use std::path::{Path, PathBuf};

use cloudsdk_core::config::{proxy_environment, GlobalConfig};
use cloudsdk_util::errors::{CloudSdkError, SdkResult};

use crate::installer::{InstallerOptions, SdkInstaller};
use crate::os::{OsInfo, OsName};
use crate::resolver::{FileResourceLocation, FileResourceResolver, DOWNLOADS_DIR};
use crate::version::SdkVersion;

/// One SDK version under a managed root directory.
#[derive(Debug, Clone)]
pub struct ManagedCloudSdk {
    version: SdkVersion,
    os_info: OsInfo,
    managed_root: PathBuf,
}

impl ManagedCloudSdk {
    pub fn new(version: SdkVersion, os_info: OsInfo, managed_root: impl Into<PathBuf>) -> Self {
        Self {
            version,
            os_info,
            managed_root: managed_root.into(),
        }
    }

    /// Build from user configuration for the running platform.
    ///
    /// `version` and `root` override the configured values.
    pub fn from_config(
        config: &GlobalConfig,
        version: Option<&str>,
        root: Option<&Path>,
    ) -> SdkResult<Self> {
        let version_str = version.unwrap_or(&config.install.version);
        let version: SdkVersion =
            version_str
                .parse()
                .map_err(|e| CloudSdkError::InvalidArgument {
                    message: format!("Invalid Cloud SDK version '{version_str}': {e}"),
                })?;
        let managed_root = match root {
            Some(root) => root.to_path_buf(),
            None => config.managed_root()?,
        };
        Ok(Self::new(version, OsInfo::current()?, managed_root))
    }

    pub fn version(&self) -> &SdkVersion {
        &self.version
    }

    pub fn managed_root(&self) -> &Path {
        &self.managed_root
    }

    pub fn location(&self) -> FileResourceLocation {
        FileResourceResolver::new(self.os_info, &self.managed_root).resolve(&self.version)
    }

    pub fn sdk_home(&self) -> PathBuf {
        self.location().sdk_home()
    }

    pub fn gcloud_path(&self) -> PathBuf {
        self.location().executable_path()
    }

    /// True when the entry-point executable is present.
    pub fn is_installed(&self) -> bool {
        self.gcloud_path().is_file()
    }

    pub fn new_installer(&self, options: InstallerOptions) -> SdkInstaller {
        SdkInstaller::new(self.location(), &self.version, self.os_info, options)
    }

    /// Options derived from configuration; on Windows the caller's proxy
    /// variables and `[install.env]` reach the install script.
    pub fn installer_options(&self, config: &GlobalConfig) -> InstallerOptions {
        let mut environment = std::collections::BTreeMap::new();
        if self.os_info.name() == OsName::Windows {
            environment.extend(proxy_environment(std::env::vars()));
            environment.extend(config.install.env.clone());
        }
        InstallerOptions {
            usage_reporting: config.install.usage_reporting,
            user_agent: config.install.user_agent.clone(),
            environment,
        }
    }

    /// Remove this version's extraction directory.
    pub fn uninstall(&self) -> SdkResult<()> {
        let dir = self.location().extraction_destination().to_path_buf();
        if !dir.is_dir() {
            return Err(CloudSdkError::InvalidArgument {
                message: format!("Cloud SDK {} is not installed", self.version),
            });
        }
        tracing::info!("Removing {}", dir.display());
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}

/// Versions with an extraction directory under `managed_root`, pinned
/// versions ascending and `LATEST` last.
pub fn list_installed(managed_root: &Path) -> Vec<SdkVersion> {
    let mut pinned = Vec::new();
    let mut latest = false;
    for entry in fs::read_dir(managed_root).into_iter().flatten().flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name == DOWNLOADS_DIR || !entry.path().is_dir() {
            continue;
        }
        match name.parse::<SdkVersion>() {
            Ok(SdkVersion::Latest) => latest = true,
            Ok(SdkVersion::Pinned(v)) => pinned.push(v),
            Err(_) => tracing::debug!("Ignoring {name} in {}", managed_root.display()),
        }
    }
    pinned.sort();
    let mut versions: Vec<SdkVersion> = pinned.into_iter().map(SdkVersion::Pinned).collect();
    if latest {
        versions.push(SdkVersion::Latest);
    }
    versions
}
