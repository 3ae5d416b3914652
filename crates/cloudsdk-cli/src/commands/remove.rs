use std::path::Path;

use cloudsdk_core::config::GlobalConfig;
use cloudsdk_installer::managed::ManagedCloudSdk;
use cloudsdk_util::progress::status;
use miette::Result;

pub fn exec(config: &GlobalConfig, version: &str, root: Option<&Path>) -> Result<()> {
    let sdk = ManagedCloudSdk::from_config(config, Some(version), root)?;
    sdk.uninstall()?;
    status("Removed", &format!("Cloud SDK {}", sdk.version()));
    Ok(())
}
