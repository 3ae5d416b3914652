//! Command dispatch and handler modules.

mod install;
mod list;
mod path;
mod remove;

use cloudsdk_core::config::GlobalConfig;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => GlobalConfig::load_from(path)?,
        None => GlobalConfig::load()?,
    };

    match cli.command {
        Command::Install {
            version,
            root,
            usage_reporting,
            user_agent,
        } => {
            install::exec(
                &config,
                version.as_deref(),
                root.as_deref(),
                usage_reporting,
                user_agent,
            )
            .await
        }
        Command::List { root } => list::exec(&config, root.as_deref()),
        Command::Path { version, root } => path::exec(&config, version.as_deref(), root.as_deref()),
        Command::Remove { version, root } => remove::exec(&config, &version, root.as_deref()),
    }
}
