//! Archive extraction with containment checks and permission restore.
//!
//! [`ArchiveKind::from_path`] picks a strategy purely from the file name;
//! [`ArchiveExtractor`] runs it and owns the failure policy: an error
//! removes the partially populated destination, a cancellation leaves the
//! finished tree in place.

mod tar_gz;
mod zip;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use cloudsdk_util::errors::{CloudSdkError, SdkResult};
use cloudsdk_util::progress::ProgressListener;
use tokio_util::sync::CancellationToken;

use crate::installer::ExtractStage;

pub use self::tar_gz::TarGzExtractor;
pub use self::zip::ZipExtractor;

/// Archive formats the SDK is distributed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Resolve the format from the archive's file name suffix, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }

    fn strategy(self) -> &'static dyn ExtractorStrategy {
        match self {
            Self::Zip => &ZipExtractor,
            Self::TarGz => &TarGzExtractor,
        }
    }
}

/// A single archive format's extraction routine.
pub trait ExtractorStrategy: Send + Sync {
    /// Write every entry of `archive` beneath `destination`, reporting one
    /// progress update per entry.
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
    ) -> SdkResult<()>;
}

/// Extracts `.zip` and `.tar.gz` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract `archive` into `destination`.
    ///
    /// Unknown suffixes fail before any I/O. Any extraction error deletes
    /// `destination` and is returned unchanged. Cancellation is checked once,
    /// after the last entry, and does not delete the output.
    pub fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        let kind = ArchiveKind::from_path(archive).ok_or_else(|| {
            CloudSdkError::UnknownArchiveType {
                path: archive.to_path_buf(),
            }
        })?;
        self.extract_with(kind.strategy(), archive, destination, progress, cancel)
    }

    /// Run an explicit strategy with the extractor's cleanup and
    /// cancellation policy.
    pub fn extract_with(
        &self,
        strategy: &dyn ExtractorStrategy,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        tracing::info!(
            "Extracting {} to {}",
            archive.display(),
            destination.display()
        );
        if let Err(e) = strategy.extract(archive, destination, progress) {
            tracing::debug!("Extraction failed, removing {}", destination.display());
            cloudsdk_util::fs::remove_dir_best_effort(destination);
            return Err(e);
        }
        if cancel.is_cancelled() {
            return Err(CloudSdkError::Cancelled {
                stage: "Extraction".to_string(),
            });
        }
        Ok(())
    }
}

impl ExtractStage for ArchiveExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        ArchiveExtractor::extract(self, archive, destination, progress, cancel)
    }
}

/// Resolve an entry name beneath `root`, which must already be canonical.
///
/// Both `/` and `\` separate components. Names that climb above `root` with
/// `..` or that are absolute are rejected.
pub(crate) fn contained_path(root: &Path, entry_name: &str) -> SdkResult<PathBuf> {
    let traversal = || CloudSdkError::PathTraversal {
        entry: entry_name.to_string(),
        destination: root.to_path_buf(),
    };
    let normalized = entry_name.replace('\\', "/");
    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return Err(traversal());
    }

    let mut target = root.to_path_buf();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if target == root || !target.pop() {
                    return Err(traversal());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }
    if !target.starts_with(root) {
        return Err(traversal());
    }
    Ok(target)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Create the directory `dir` beneath the canonical `root`, refusing to
/// follow any existing symlink that resolves outside of `root`.
pub(crate) fn create_contained_dir(root: &Path, dir: &Path, entry_name: &str) -> SdkResult<()> {
    let traversal = || CloudSdkError::PathTraversal {
        entry: entry_name.to_string(),
        destination: root.to_path_buf(),
    };
    let relative = dir.strip_prefix(root).map_err(|_| traversal())?;
    let mut current = root.to_path_buf();
    for part in relative.components() {
        current.push(part);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                if !current.canonicalize()?.starts_with(root) {
                    return Err(traversal());
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir(&current)?,
            Err(e) => return Err(e.into()),
        }
    }
    if !dir.canonicalize()?.starts_with(root) {
        return Err(traversal());
    }
    Ok(())
}

/// Prepare the parent directories of a file entry at `target` and make sure
/// the file itself is not a symlink that would redirect the write.
pub(crate) fn prepare_file_target(root: &Path, target: &Path, entry_name: &str) -> SdkResult<()> {
    if let Some(parent) = target.parent() {
        create_contained_dir(root, parent, entry_name)?;
    }
    let is_symlink = fs::symlink_metadata(target)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if is_symlink {
        return Err(CloudSdkError::PathTraversal {
            entry: entry_name.to_string(),
            destination: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Create `destination` and return its canonical form.
pub(crate) fn canonical_root(destination: &Path) -> SdkResult<PathBuf> {
    cloudsdk_util::fs::ensure_dir(destination)?;
    Ok(destination.canonicalize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_suffix() {
        assert_eq!(
            ArchiveKind::from_path(Path::new("/d/google-cloud-sdk.tar.gz")),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(
            ArchiveKind::from_path(Path::new("sdk-windows-x86_64-bundled-python.ZIP")),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(ArchiveKind::from_path(Path::new("sdk.tar")), None);
        assert_eq!(ArchiveKind::from_path(Path::new("sdk.gz")), None);
        assert_eq!(ArchiveKind::from_path(Path::new("zip")), None);
    }

    #[test]
    fn contained_path_accepts_nested_entries() {
        let root = Path::new("/out");
        assert_eq!(
            contained_path(root, "google-cloud-sdk/bin/gcloud").unwrap(),
            PathBuf::from("/out/google-cloud-sdk/bin/gcloud")
        );
        assert_eq!(
            contained_path(root, "a/./b/../c.txt").unwrap(),
            PathBuf::from("/out/a/c.txt")
        );
        assert_eq!(
            contained_path(root, "dir\\file.txt").unwrap(),
            PathBuf::from("/out/dir/file.txt")
        );
    }

    #[test]
    fn contained_path_rejects_escapes() {
        let root = Path::new("/out");
        for name in [
            "../evil.txt",
            "a/../../evil.txt",
            "..\\..\\evil.txt",
            "/etc/passwd",
            "\\evil.txt",
            "C:\\Windows\\evil.txt",
            "c:/evil.txt",
        ] {
            let err = contained_path(root, name).unwrap_err();
            assert!(
                matches!(err, CloudSdkError::PathTraversal { .. }),
                "{name} gave {err}"
            );
        }
    }

    #[test]
    fn create_contained_dir_builds_missing_components() {
        let tmp = tempfile::tempdir().unwrap();
        let root = canonical_root(tmp.path()).unwrap();
        let dir = contained_path(&root, "a/b/c").unwrap();

        create_contained_dir(&root, &dir, "a/b/c/").unwrap();

        assert!(root.join("a/b/c").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn create_contained_dir_rejects_symlink_out_of_root() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tmp.path().join("outside");
        std::fs::create_dir(&outside).unwrap();
        let root = canonical_root(&tmp.path().join("out")).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
        let dir = contained_path(&root, "link/sub").unwrap();

        let err = create_contained_dir(&root, &dir, "link/sub/").unwrap_err();

        assert!(matches!(err, CloudSdkError::PathTraversal { .. }), "got: {err}");
        assert!(!outside.join("sub").exists());
    }
}
