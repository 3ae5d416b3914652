//! Pure naming logic: where a Cloud SDK release is fetched from and where
//! it lands on disk.

use std::path::{Path, PathBuf};

use crate::os::{Architecture, OsInfo, OsName};
use crate::version::{SdkVersion, LATEST};

/// Base URL of the always-current rapid channel.
pub const LATEST_BASE_URL: &str = "https://dl.google.com/dl/cloudsdk/channels/rapid/";

/// Base URL of pinned releases.
pub const VERSIONED_BASE_URL: &str = "https://storage.googleapis.com/cloud-sdk-release/";

/// Product prefix shared by every archive name.
pub const PRODUCT: &str = "google-cloud-sdk";

/// Directory the archives unpack into.
pub const SDK_DIR_NAME: &str = "google-cloud-sdk";

/// Subdirectory of the managed root holding downloaded archives.
pub const DOWNLOADS_DIR: &str = "downloads";

const EXECUTABLE: &str = "gcloud";

/// Everything needed to fetch and unpack one SDK release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResourceLocation {
    source_url: String,
    archive_destination: PathBuf,
    extraction_destination: PathBuf,
    executable_name: String,
}

impl FileResourceLocation {
    pub fn new(
        source_url: impl Into<String>,
        archive_destination: impl Into<PathBuf>,
        extraction_destination: impl Into<PathBuf>,
        executable_name: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            archive_destination: archive_destination.into(),
            extraction_destination: extraction_destination.into(),
            executable_name: executable_name.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn archive_destination(&self) -> &Path {
        &self.archive_destination
    }

    pub fn extraction_destination(&self) -> &Path {
        &self.extraction_destination
    }

    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// `<extraction destination>/google-cloud-sdk`
    pub fn sdk_home(&self) -> PathBuf {
        self.extraction_destination.join(SDK_DIR_NAME)
    }

    /// `<sdk home>/bin/<executable>`
    pub fn executable_path(&self) -> PathBuf {
        self.sdk_home().join("bin").join(&self.executable_name)
    }
}

/// Computes a [`FileResourceLocation`] for a version and platform.
#[derive(Debug, Clone)]
pub struct FileResourceResolver {
    os_info: OsInfo,
    managed_root: PathBuf,
}

impl FileResourceResolver {
    pub fn new(os_info: OsInfo, managed_root: impl Into<PathBuf>) -> Self {
        Self {
            os_info,
            managed_root: managed_root.into(),
        }
    }

    pub fn resolve(&self, version: &SdkVersion) -> FileResourceLocation {
        let filename = match version {
            SdkVersion::Latest => latest_filename(&self.os_info).to_string(),
            SdkVersion::Pinned(v) => {
                format!("{PRODUCT}-{v}-{}", versioned_suffix(&self.os_info))
            }
        };
        let base_url = match version {
            SdkVersion::Latest => LATEST_BASE_URL,
            SdkVersion::Pinned(_) => VERSIONED_BASE_URL,
        };
        let extraction_dir = match version {
            SdkVersion::Latest => LATEST.to_string(),
            SdkVersion::Pinned(v) => v.to_string(),
        };

        FileResourceLocation {
            source_url: format!("{base_url}{filename}"),
            archive_destination: self.managed_root.join(DOWNLOADS_DIR).join(&filename),
            extraction_destination: self.managed_root.join(extraction_dir),
            executable_name: executable_name(self.os_info.name()).to_string(),
        }
    }
}

fn latest_filename(os_info: &OsInfo) -> &'static str {
    match (os_info.name(), os_info.arch()) {
        (OsName::Windows, Architecture::X86) => "google-cloud-sdk-windows-bundled-python.zip",
        (OsName::Windows, Architecture::X86_64 | Architecture::Arm) => {
            "google-cloud-sdk-windows-x86_64-bundled-python.zip"
        }
        (OsName::Mac | OsName::Linux, _) => "google-cloud-sdk.tar.gz",
    }
}

fn versioned_suffix(os_info: &OsInfo) -> String {
    match (os_info.name(), os_info.arch()) {
        (OsName::Windows, Architecture::X86) => "windows-x86-bundled-python.zip".to_string(),
        (OsName::Windows, Architecture::X86_64 | Architecture::Arm) => {
            "windows-x86_64-bundled-python.zip".to_string()
        }
        (OsName::Mac, arch) => format!("darwin-{arch}.tar.gz"),
        (OsName::Linux, arch) => format!("linux-{arch}.tar.gz"),
    }
}

/// `gcloud.cmd` on Windows, `gcloud` elsewhere.
pub fn executable_name(os: OsName) -> &'static str {
    match os {
        OsName::Windows => "gcloud.cmd",
        OsName::Mac | OsName::Linux => EXECUTABLE,
    }
}
