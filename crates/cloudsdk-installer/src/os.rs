//! Host operating system and CPU architecture.

use std::fmt;

use cloudsdk_util::errors::{CloudSdkError, SdkResult};

/// Operating system families with a Cloud SDK distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsName {
    Windows,
    Mac,
    Linux,
}

/// CPU architectures with a Cloud SDK distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X86_64,
    Arm,
}

impl Architecture {
    /// The token used in release archive names.
    pub fn archive_token(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Arm => "arm",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.archive_token())
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::Mac => f.write_str("darwin"),
            Self::Linux => f.write_str("linux"),
        }
    }
}

/// Operating system plus architecture, which together pick the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsInfo {
    name: OsName,
    arch: Architecture,
}

impl OsInfo {
    pub fn new(name: OsName, arch: Architecture) -> Self {
        Self { name, arch }
    }

    /// Detect the platform this binary runs on.
    pub fn current() -> SdkResult<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map `std::env::consts`-style names onto a supported platform.
    pub fn from_parts(os: &str, arch: &str) -> SdkResult<Self> {
        let unsupported = || CloudSdkError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };
        let name = match os {
            "windows" => OsName::Windows,
            "macos" => OsName::Mac,
            "linux" => OsName::Linux,
            _ => return Err(unsupported()),
        };
        let arch = match arch {
            "x86" | "i386" | "i586" | "i686" => Architecture::X86,
            "x86_64" | "amd64" => Architecture::X86_64,
            "aarch64" | "arm64" | "arm" => Architecture::Arm,
            _ => return Err(unsupported()),
        };
        Ok(Self { name, arch })
    }

    pub fn name(&self) -> OsName {
        self.name
    }

    pub fn arch(&self) -> Architecture {
        self.arch
    }
}

impl fmt::Display for OsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.arch)
    }
}
