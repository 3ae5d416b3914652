use std::fs::File;
use std::path::Path;

use cloudsdk_util::errors::{CloudSdkError, SdkResult};
use cloudsdk_util::progress::ProgressListener;

use super::{
    canonical_root, contained_path, create_contained_dir, prepare_file_target, ExtractorStrategy,
};
use crate::permissions::PosixPermissions;

/// Extracts `.zip` archives entry by entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ExtractorStrategy for ZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
    ) -> SdkResult<()> {
        let root = canonical_root(destination)?;
        let file = File::open(archive)?;
        let mut zip = ::zip::ZipArchive::new(file).map_err(zip_error)?;

        progress.start(&format!("Extracting {}", archive.display()), None);
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(zip_error)?;
            let name = entry.name().to_string();
            let target = contained_path(&root, &name)?;

            if entry.is_dir() {
                create_contained_dir(&root, &target, &name)?;
            } else if entry.is_file() {
                prepare_file_target(&root, &target, &name)?;
                let mut out = File::create(&target)?;
                std::io::copy(&mut entry, &mut out)?;
                drop(out);
                if let Some(mode) = entry.unix_mode() {
                    PosixPermissions::from_mode(mode).apply(&target)?;
                }
            } else {
                tracing::warn!(
                    "Skipping zip entry {name} in {}: not a file or directory",
                    archive.display()
                );
            }
            progress.update(1);
        }
        progress.done();
        Ok(())
    }
}

fn zip_error(e: ::zip::result::ZipError) -> CloudSdkError {
    match e {
        ::zip::result::ZipError::Io(io) => CloudSdkError::Io(io),
        other => CloudSdkError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            other,
        )),
    }
}
