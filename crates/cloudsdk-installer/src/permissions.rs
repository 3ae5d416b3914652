//! POSIX permission bits recorded in archives.

use std::fmt;
use std::path::Path;

/// Read/write/execute flags for one permission class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Access {
    fn from_bits(bits: u32) -> Self {
        Self {
            read: bits & 0o4 != 0,
            write: bits & 0o2 != 0,
            execute: bits & 0o1 != 0,
        }
    }

    fn bits(self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }
}

/// Owner, group and other permissions decoded from an octal mode.
///
/// Only the nine `rwx` bits are kept; file-type and setuid/setgid/sticky
/// bits are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PosixPermissions {
    pub owner: Access,
    pub group: Access,
    pub other: Access,
}

impl PosixPermissions {
    /// Decode a mode such as `0o755` or a full `st_mode` like `0o100644`.
    pub fn from_mode(mode: u32) -> Self {
        Self {
            owner: Access::from_bits(mode >> 6),
            group: Access::from_bits(mode >> 3),
            other: Access::from_bits(mode),
        }
    }

    /// The `rwx` bits as an octal mode.
    pub fn mode(&self) -> u32 {
        (self.owner.bits() << 6) | (self.group.bits() << 3) | self.other.bits()
    }

    #[cfg(unix)]
    pub fn to_permissions(&self) -> std::fs::Permissions {
        use std::os::unix::fs::PermissionsExt;
        std::fs::Permissions::from_mode(self.mode())
    }

    /// Apply these permissions to `path`. No-op on non-Unix platforms.
    pub fn apply(&self, path: &Path) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            std::fs::set_permissions(path, self.to_permissions())
        }
        #[cfg(not(unix))]
        {
            let _ = path;
            Ok(())
        }
    }
}

impl fmt::Display for PosixPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for access in [self.owner, self.group, self.other] {
            write!(
                f,
                "{}{}{}",
                if access.read { 'r' } else { '-' },
                if access.write { 'w' } else { '-' },
                if access.execute { 'x' } else { '-' },
            )?;
        }
        Ok(())
    }
}
