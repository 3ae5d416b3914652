use std::path::Path;

use cloudsdk_core::config::GlobalConfig;
use cloudsdk_installer::managed::ManagedCloudSdk;
use cloudsdk_util::errors::CloudSdkError;
use miette::Result;

pub fn exec(config: &GlobalConfig, version: Option<&str>, root: Option<&Path>) -> Result<()> {
    let sdk = ManagedCloudSdk::from_config(config, version, root)?;
    if !sdk.is_installed() {
        return Err(CloudSdkError::InvalidArgument {
            message: format!(
                "Cloud SDK {} is not installed. Install it with: cloudsdk install {}",
                sdk.version(),
                sdk.version()
            ),
        }
        .into());
    }
    println!("{}", sdk.gcloud_path().display());
    Ok(())
}
