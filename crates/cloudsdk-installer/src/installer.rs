//! Installation orchestrator: cleanup, download, extract, install script and
//! final verification, run once on a dedicated worker thread.

use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use std::thread;

use cloudsdk_util::errors::{CloudSdkError, SdkResult};
use cloudsdk_util::process::MessageListener;
use cloudsdk_util::progress::ProgressListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::download::Downloader;
use crate::extract::ArchiveExtractor;
use crate::os::OsInfo;
use crate::resolver::FileResourceLocation;
use crate::script::{InstallScriptRunner, ScriptProvider};
use crate::version::SdkVersion;

const DOWNLOAD_WORK: u64 = 100;
const EXTRACT_WORK: u64 = 50;
const INSTALL_WORK: u64 = 30;

/// Fetches the archive.
pub trait DownloadStage: Send + Sync {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()>;
}

/// Unpacks the archive.
pub trait ExtractStage: Send + Sync {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()>;
}

/// Finalizes an extracted SDK in place.
pub trait InstallStage: Send + Sync {
    fn install(
        &self,
        sdk_home: &Path,
        progress: &mut dyn ProgressListener,
        console: &mut dyn MessageListener,
    ) -> SdkResult<()>;
}

/// Caller choices for the default stages.
#[derive(Debug, Clone, Default)]
pub struct InstallerOptions {
    pub usage_reporting: bool,
    pub user_agent: Option<String>,
    /// Extra install-script environment, applied on Windows.
    pub environment: BTreeMap<String, String>,
}

struct Pipeline {
    location: FileResourceLocation,
    downloader: Box<dyn DownloadStage>,
    extractor: Box<dyn ExtractStage>,
    script: Option<Box<dyn InstallStage>>,
}

impl Pipeline {
    fn run(
        self,
        progress: &mut dyn ProgressListener,
        console: &mut dyn MessageListener,
        cancel: &CancellationToken,
    ) -> SdkResult<PathBuf> {
        let location = &self.location;
        let total = DOWNLOAD_WORK
            + EXTRACT_WORK
            + if self.script.is_some() { INSTALL_WORK } else { 0 };
        progress.start("Installing Cloud SDK", Some(total));

        self.clean_stale_artifacts()?;

        let archive = location.archive_destination();
        self.downloader.download(
            location.source_url(),
            archive,
            progress.new_child(DOWNLOAD_WORK).as_mut(),
            cancel,
        )?;
        if !archive.is_file() {
            return Err(CloudSdkError::installer(
                "Download succeeded but valid archive not found",
                archive,
            ));
        }

        self.extractor.extract(
            archive,
            location.extraction_destination(),
            progress.new_child(EXTRACT_WORK).as_mut(),
            cancel,
        )?;
        let sdk_home = location.sdk_home();
        if !sdk_home.is_dir() {
            return Err(CloudSdkError::installer(
                "Extraction succeeded but valid Cloud SDK home not found",
                sdk_home,
            ));
        }

        if let Some(ref script) = self.script {
            script.install(
                &sdk_home,
                progress.new_child(INSTALL_WORK).as_mut(),
                console,
            )?;
        }

        let executable = location.executable_path();
        if !executable.is_file() {
            return Err(CloudSdkError::installer(
                "Installation succeeded but Cloud SDK executable not found",
                executable,
            ));
        }

        progress.done();
        tracing::info!("Cloud SDK installed at {}", sdk_home.display());
        Ok(sdk_home)
    }

    fn clean_stale_artifacts(&self) -> SdkResult<()> {
        let archive = self.location.archive_destination();
        if archive.exists() {
            tracing::info!("Removing stale archive {}", archive.display());
            fs::remove_file(archive)?;
        }
        let extraction = self.location.extraction_destination();
        if extraction.exists() {
            tracing::info!("Removing stale install {}", extraction.display());
            fs::remove_dir_all(extraction)?;
        }
        Ok(())
    }
}

/// Installs one Cloud SDK release. Usable for a single installation only.
pub struct SdkInstaller {
    pipeline: Mutex<Option<Pipeline>>,
}

impl SdkInstaller {
    /// An installer with the HTTP downloader, the archive extractor and, for
    /// the rapid channel, the platform install script.
    pub fn new(
        location: FileResourceLocation,
        version: &SdkVersion,
        os_info: OsInfo,
        options: InstallerOptions,
    ) -> Self {
        let mut downloader = Downloader::new();
        if let Some(agent) = options.user_agent {
            downloader = downloader.with_user_agent(agent);
        }
        let script = version.is_latest().then(|| {
            let provider = ScriptProvider::for_os(os_info.name(), options.environment);
            Box::new(InstallScriptRunner::new(provider, options.usage_reporting))
                as Box<dyn InstallStage>
        });
        Self::with_stages(
            location,
            Box::new(downloader),
            Box::new(ArchiveExtractor),
            script,
        )
    }

    /// An installer with caller-supplied stages. `script` is `None` for
    /// pinned versions, which ship ready to use.
    pub fn with_stages(
        location: FileResourceLocation,
        downloader: Box<dyn DownloadStage>,
        extractor: Box<dyn ExtractStage>,
        script: Option<Box<dyn InstallStage>>,
    ) -> Self {
        Self {
            pipeline: Mutex::new(Some(Pipeline {
                location,
                downloader,
                extractor,
                script,
            })),
        }
    }

    /// Start the installation on a background thread and return immediately.
    ///
    /// Fails with [`CloudSdkError::IllegalState`] when called a second time.
    pub fn install(
        &self,
        mut progress: Box<dyn ProgressListener>,
        mut console: Box<dyn MessageListener>,
    ) -> SdkResult<InstallHandle> {
        let pipeline = self
            .pipeline
            .lock()
            .map_err(|_| CloudSdkError::IllegalState {
                message: "installer state is poisoned".to_string(),
            })?
            .take()
            .ok_or_else(|| CloudSdkError::IllegalState {
                message: "installer has already been started".to_string(),
            })?;

        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let (tx, rx) = oneshot::channel();
        let worker = thread::Builder::new()
            .name("cloud-sdk-installer".to_string())
            .spawn(move || {
                let result = pipeline.run(progress.as_mut(), console.as_mut(), &worker_cancel);
                if let Err(ref e) = result {
                    tracing::debug!("Cloud SDK installation failed: {e}");
                }
                let _ = tx.send(result);
            })?;

        Ok(InstallHandle {
            result: rx,
            cancel,
            worker,
        })
    }
}

/// Handle to a running installation.
///
/// Await it, or call [`InstallHandle::wait`] from synchronous code, to get
/// the SDK home or the first error.
pub struct InstallHandle {
    result: oneshot::Receiver<SdkResult<PathBuf>>,
    cancel: CancellationToken,
    worker: thread::JoinHandle<()>,
}

impl InstallHandle {
    /// Ask the worker to stop at its next cancellation checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the installation ends. Must not be called from within an
    /// async runtime; `.await` the handle there instead.
    pub fn wait(self) -> SdkResult<PathBuf> {
        let outcome = self.result.blocking_recv();
        let _ = self.worker.join();
        outcome.unwrap_or_else(|_| Err(worker_lost()))
    }
}

impl Future for InstallHandle {
    type Output = SdkResult<PathBuf>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.result)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|_| Err(worker_lost())))
    }
}

fn worker_lost() -> CloudSdkError {
    CloudSdkError::IllegalState {
        message: "installer worker terminated without a result".to_string(),
    }
}
