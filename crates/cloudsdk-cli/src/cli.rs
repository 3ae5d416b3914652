//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cloudsdk",
    version,
    about = "Install and manage private copies of the Google Cloud SDK",
    long_about = "cloudsdk downloads, unpacks and installs Google Cloud SDK releases into a \
                  managed directory, one directory per version, without touching the user's \
                  shell configuration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.cloudsdk/config.toml)
    #[arg(long, global = true, env = "CLOUDSDK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download and install a Cloud SDK version
    Install {
        /// `latest` or a release such as 296.0.0 (default: from config)
        version: Option<String>,
        /// Managed root directory
        #[arg(long)]
        root: Option<PathBuf>,
        /// Allow the installed SDK to report usage statistics
        #[arg(long)]
        usage_reporting: bool,
        /// User-Agent sent with the archive download
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// List installed Cloud SDK versions
    #[command(alias = "ls")]
    List {
        /// Managed root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the path of an installed gcloud executable
    Path {
        /// `latest` or a release such as 296.0.0 (default: from config)
        version: Option<String>,
        /// Managed root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Remove an installed Cloud SDK version
    #[command(alias = "rm")]
    Remove {
        /// `latest` or a release such as 296.0.0
        version: String,
        /// Managed root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}
