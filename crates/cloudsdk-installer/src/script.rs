//! Post-extraction install script for rapid-channel archives.

use std::collections::BTreeMap;
use std::path::Path;

use cloudsdk_util::errors::{CloudSdkError, SdkResult};
use cloudsdk_util::process::{CommandExecutor, MessageListener, ProcessExecutor};
use cloudsdk_util::progress::ProgressListener;

use crate::installer::InstallStage;
use crate::os::OsName;

/// Flags that keep the script non-interactive and away from the user's
/// shell configuration.
const FIXED_FLAGS: &[&str] = &["--path-update=false", "--command-completion=false", "--quiet"];

const DISABLE_PROMPTS: (&str, &str) = ("CLOUDSDK_CORE_DISABLE_PROMPTS", "1");

/// Platform-specific command line and environment for the install script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptProvider {
    Unix,
    /// `environment` is merged into the script environment, e.g. proxy settings.
    Windows { environment: BTreeMap<String, String> },
}

impl ScriptProvider {
    pub fn for_os(os: OsName, environment: BTreeMap<String, String>) -> Self {
        match os {
            OsName::Windows => Self::Windows { environment },
            OsName::Mac | OsName::Linux => Self::Unix,
        }
    }

    /// The command that launches the script inside `sdk_root`, which must
    /// be absolute.
    pub fn command_line(&self, sdk_root: &Path) -> SdkResult<Vec<String>> {
        if !sdk_root.is_absolute() {
            return Err(CloudSdkError::InvalidArgument {
                message: format!("SDK root must be absolute: {}", sdk_root.display()),
            });
        }
        Ok(match self {
            Self::Unix => vec![sdk_root.join("install.sh").to_string_lossy().into_owned()],
            Self::Windows { .. } => vec![
                "cmd.exe".to_string(),
                "/c".to_string(),
                sdk_root.join("install.bat").to_string_lossy().into_owned(),
            ],
        })
    }

    pub fn environment(&self) -> BTreeMap<String, String> {
        let mut env = match self {
            Self::Unix => BTreeMap::new(),
            Self::Windows { environment } => environment.clone(),
        };
        env.insert(DISABLE_PROMPTS.0.to_string(), DISABLE_PROMPTS.1.to_string());
        env
    }
}

/// Runs the bundled install script through a [`CommandExecutor`].
pub struct InstallScriptRunner {
    provider: ScriptProvider,
    usage_reporting: bool,
    executor: Box<dyn CommandExecutor>,
}

impl InstallScriptRunner {
    pub fn new(provider: ScriptProvider, usage_reporting: bool) -> Self {
        Self::with_executor(provider, usage_reporting, Box::new(ProcessExecutor))
    }

    pub fn with_executor(
        provider: ScriptProvider,
        usage_reporting: bool,
        executor: Box<dyn CommandExecutor>,
    ) -> Self {
        Self {
            provider,
            usage_reporting,
            executor,
        }
    }

    /// Full command line: script launcher plus configuration flags.
    pub fn command_line(&self, sdk_root: &Path) -> SdkResult<Vec<String>> {
        let mut command = self.provider.command_line(sdk_root)?;
        command.extend(FIXED_FLAGS.iter().map(|flag| flag.to_string()));
        command.push(format!("--usage-reporting={}", self.usage_reporting));
        Ok(command)
    }

    /// Run the script in `sdk_root`; a non-zero exit becomes
    /// [`CloudSdkError::CommandExit`].
    pub fn install(
        &self,
        sdk_root: &Path,
        progress: &mut dyn ProgressListener,
        console: &mut dyn MessageListener,
    ) -> SdkResult<()> {
        let command = self.command_line(sdk_root)?;
        tracing::info!("Running install script in {}", sdk_root.display());

        progress.start("Installing Cloud SDK", None);
        let code = self.executor.run(
            &command,
            Some(sdk_root),
            &self.provider.environment(),
            console,
        )?;
        progress.done();

        if code != 0 {
            return Err(CloudSdkError::CommandExit { code });
        }
        Ok(())
    }
}

impl InstallStage for InstallScriptRunner {
    fn install(
        &self,
        sdk_home: &Path,
        progress: &mut dyn ProgressListener,
        console: &mut dyn MessageListener,
    ) -> SdkResult<()> {
        InstallScriptRunner::install(self, sdk_home, progress, console)
    }
}
