use std::path::Path;

use cloudsdk_core::config::GlobalConfig;
use cloudsdk_installer::managed::{list_installed, ManagedCloudSdk};
use cloudsdk_installer::os::OsInfo;
use miette::Result;

pub fn exec(config: &GlobalConfig, root: Option<&Path>) -> Result<()> {
    let managed_root = match root {
        Some(root) => root.to_path_buf(),
        None => config.managed_root()?,
    };
    let versions = list_installed(&managed_root);

    if versions.is_empty() {
        println!("No Cloud SDK versions installed in {}.", managed_root.display());
        println!("  Install one with: cloudsdk install [<version>]");
        return Ok(());
    }

    let os_info = OsInfo::current()?;
    println!("Installed Cloud SDK versions in {}:", managed_root.display());
    for version in versions {
        let sdk = ManagedCloudSdk::new(version, os_info, &managed_root);
        let marker = if sdk.is_installed() { "" } else { " (incomplete)" };
        println!("  {}{marker}  {}", sdk.version(), sdk.sdk_home().display());
    }
    Ok(())
}
