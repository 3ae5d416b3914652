use std::path::Path;

use cloudsdk_core::config::GlobalConfig;
use cloudsdk_installer::managed::ManagedCloudSdk;
use cloudsdk_util::errors::CloudSdkError;
use cloudsdk_util::process::MessageListener;
use cloudsdk_util::progress::{status, status_info, status_warn, ProgressBarListener};
use indicatif::ProgressBar;
use miette::Result;

/// Prints install script output above the progress bar.
struct BarMessages {
    bar: ProgressBar,
}

impl MessageListener for BarMessages {
    fn message(&mut self, raw: &str) {
        self.bar.println(raw);
    }
}

pub async fn exec(
    config: &GlobalConfig,
    version: Option<&str>,
    root: Option<&Path>,
    usage_reporting: bool,
    user_agent: Option<String>,
) -> Result<()> {
    let sdk = ManagedCloudSdk::from_config(config, version, root)?;
    let mut options = sdk.installer_options(config);
    options.usage_reporting |= usage_reporting;
    if user_agent.is_some() {
        options.user_agent = user_agent;
    }

    if sdk.is_installed() {
        status_info(
            "Reinstalling",
            &format!("Cloud SDK {} at {}", sdk.version(), sdk.sdk_home().display()),
        );
    }
    status(
        "Installing",
        &format!(
            "Cloud SDK {} into {}",
            sdk.version(),
            sdk.managed_root().display()
        ),
    );

    let progress = ProgressBarListener::new();
    let bar = progress.bar().clone();
    let console = BarMessages { bar: bar.clone() };
    let installer = sdk.new_installer(options);
    let mut handle = installer.install(Box::new(progress), Box::new(console))?;

    let finished = tokio::select! {
        result = &mut handle => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            status_warn("Cancelling", "waiting for the current step to stop");
            handle.cancel();
            handle.await
        }
    };
    bar.finish_and_clear();

    match result {
        Ok(home) => {
            status("Installed", &format!("Cloud SDK {} at {}", sdk.version(), home.display()));
            println!("{}", sdk.gcloud_path().display());
            Ok(())
        }
        Err(e @ CloudSdkError::Cancelled { .. }) => {
            status_warn("Cancelled", &format!("Cloud SDK {} was not installed", sdk.version()));
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
