//! Cloud SDK release selection.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Directory name used for the rapid channel.
pub const LATEST: &str = "LATEST";

/// Either the always-current rapid channel or a pinned release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SdkVersion {
    Latest,
    Pinned(Version),
}

impl SdkVersion {
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// Name of the extraction directory for this version.
    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Pinned(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for SdkVersion {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(LATEST) {
            Ok(Self::Latest)
        } else {
            Version::parse(s).map(Self::Pinned)
        }
    }
}

impl From<Version> for SdkVersion {
    fn from(v: Version) -> Self {
        Self::Pinned(v)
    }
}

impl TryFrom<String> for SdkVersion {
    type Error = semver::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SdkVersion> for String {
    fn from(v: SdkVersion) -> Self {
        v.to_string()
    }
}
