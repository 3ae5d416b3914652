use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cloudsdk_util::errors::SdkResult;
use cloudsdk_util::progress::ProgressListener;
use flate2::read::GzDecoder;

use super::{
    canonical_root, contained_path, create_contained_dir, prepare_file_target, ExtractorStrategy,
};
use crate::permissions::PosixPermissions;

/// Extracts gzip-compressed tarballs, streaming one entry at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl ExtractorStrategy for TarGzExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
    ) -> SdkResult<()> {
        let root = canonical_root(destination)?;
        let file = File::open(archive)?;
        let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

        progress.start(&format!("Extracting {}", archive.display()), None);
        for entry in tarball.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let target = contained_path(&root, &name)?;
            let entry_type = entry.header().entry_type();
            let mode = entry.header().mode().ok();

            if entry_type.is_dir() {
                create_contained_dir(&root, &target, &name)?;
            } else if entry_type.is_file() {
                prepare_file_target(&root, &target, &name)?;
                let mut out = File::create(&target)?;
                std::io::copy(&mut entry, &mut out)?;
                drop(out);
                if let Some(mode) = mode {
                    PosixPermissions::from_mode(mode).apply(&target)?;
                }
            } else {
                tracing::warn!(
                    "Skipping tar entry {name} in {}: not a file or directory",
                    archive.display()
                );
            }
            progress.update(1);
        }
        progress.done();
        Ok(())
    }
}
