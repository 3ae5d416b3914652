//! Streaming HTTP download of SDK archives.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use cloudsdk_util::errors::{CloudSdkError, SdkResult};
use cloudsdk_util::format::{format_megabytes, NumberLocale};
use cloudsdk_util::progress::ProgressListener;
use reqwest::header::USER_AGENT;
use tokio_util::sync::CancellationToken;

use crate::installer::DownloadStage;

/// Size of each chunk copied from the network to disk.
pub const BUFFER_SIZE: usize = 8 * 1024;

/// Downloads a URL to a file that must not exist yet.
#[derive(Debug, Clone)]
pub struct Downloader {
    user_agent: Option<String>,
    locale: NumberLocale,
    system_proxy: bool,
}

impl Downloader {
    /// A downloader formatting sizes for the locale found in the environment.
    pub fn new() -> Self {
        Self {
            user_agent: None,
            locale: NumberLocale::from_env(),
            system_proxy: true,
        }
    }

    /// Identify the client with a `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Whether proxy variables from the environment apply. On by default.
    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    /// Stream `url` into `destination`, creating parent directories.
    ///
    /// Fails with [`CloudSdkError::AlreadyExists`] rather than overwrite an
    /// existing file. Cancellation is checked before every chunk is written;
    /// a cancelled or failed download removes the partial file.
    pub fn download(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        if destination.exists() {
            return Err(CloudSdkError::AlreadyExists {
                path: destination.to_path_buf(),
            });
        }
        cloudsdk_util::fs::ensure_parent_dir(destination)?;

        tracing::info!("Downloading {url}");
        let mut builder = reqwest::blocking::Client::builder().timeout(None);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| CloudSdkError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        let mut request = client.get(url);
        if let Some(ref agent) = self.user_agent {
            request = request.header(USER_AGENT, agent.as_str());
        }
        let resp = request.send().map_err(|e| CloudSdkError::Network {
            message: format!("Failed to download {url}: {e}"),
        })?;
        if !resp.status().is_success() {
            return Err(CloudSdkError::Network {
                message: format!("HTTP {} for {url}", resp.status()),
            });
        }

        let total = resp.content_length();
        progress.start(&self.start_message(url, total), total);
        write_stream(resp, destination, progress, cancel)?;
        progress.done();
        Ok(())
    }

    pub(crate) fn start_message(&self, url: &str, total: Option<u64>) -> String {
        match total {
            Some(bytes) => format!(
                "Downloading {} from {url}",
                format_megabytes(bytes, &self.locale)
            ),
            None => format!("Downloading {url}"),
        }
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadStage for Downloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut dyn ProgressListener,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        Downloader::download(self, url, destination, progress, cancel)
    }
}

/// Copy `reader` into a new file at `destination` in [`BUFFER_SIZE`] chunks.
///
/// The partial file is removed when the copy is cancelled or fails.
pub(crate) fn write_stream(
    reader: impl Read,
    destination: &Path,
    progress: &mut dyn ProgressListener,
    cancel: &CancellationToken,
) -> SdkResult<()> {
    let out = File::create(destination)?;
    let result = copy_chunks(reader, out, progress, cancel);
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(destination) {
            tracing::warn!("Failed to delete {}: {e}", destination.display());
        }
    }
    result
}

fn copy_chunks(
    mut reader: impl Read,
    mut out: File,
    progress: &mut dyn ProgressListener,
    cancel: &CancellationToken,
) -> SdkResult<()> {
    let mut buf = [0u8; BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(|e| CloudSdkError::Network {
            message: format!("Read error: {e}"),
        })?;
        if n == 0 {
            break;
        }
        if cancel.is_cancelled() {
            return Err(CloudSdkError::Cancelled {
                stage: "Download".to_string(),
            });
        }
        out.write_all(&buf[..n])?;
        progress.update(n as u64);
    }
    out.flush()?;
    Ok(())
}
