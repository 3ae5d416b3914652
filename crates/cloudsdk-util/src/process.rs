use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::errors::{CloudSdkError, SdkResult};

/// Receives raw output produced by a child process.
pub trait MessageListener: Send {
    fn message(&mut self, raw: &str);
}

/// Drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentMessages;

impl MessageListener for SilentMessages {
    fn message(&mut self, _raw: &str) {}
}

/// Runs a command line and reports its exit code.
pub trait CommandExecutor: Send + Sync {
    /// Run `command` (program followed by its arguments) with `env` layered
    /// over the inherited environment, streaming output to `listener`.
    fn run(
        &self,
        command: &[String],
        working_dir: Option<&Path>,
        env: &BTreeMap<String, String>,
        listener: &mut dyn MessageListener,
    ) -> SdkResult<i32>;
}

/// [`CommandExecutor`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    fn run(
        &self,
        command: &[String],
        working_dir: Option<&Path>,
        env: &BTreeMap<String, String>,
        listener: &mut dyn MessageListener,
    ) -> SdkResult<i32> {
        let (program, args) = command.split_first().ok_or_else(|| {
            CloudSdkError::InvalidArgument {
                message: "empty command line".to_string(),
            }
        })?;
        tracing::debug!("Running {}", command.join(" "));

        let mut builder = CommandBuilder::new(program.clone()).args(args.iter().cloned());
        for (k, v) in env {
            builder = builder.env(k.clone(), v.clone());
        }
        if let Some(dir) = working_dir {
            builder = builder.cwd(dir);
        }
        builder.stream(listener)
    }
}

/// Builder for constructing and executing external processes.
///
/// Provides a fluent API for setting program, arguments, environment variables, and working directory.
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the child process.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Execute the command and return its captured output.
    pub fn exec(&self) -> SdkResult<Output> {
        self.command().output().map_err(CloudSdkError::from)
    }

    /// Execute the command, forwarding stdout and stderr line by line to
    /// `listener`, and return the exit code.
    ///
    /// A process terminated by a signal reports `-1`.
    pub fn stream(&self, listener: &mut dyn MessageListener) -> SdkResult<i32> {
        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let (tx, rx) = mpsc::channel::<String>();
        let mut pipes: Vec<Box<dyn Read + Send>> = Vec::new();
        if let Some(out) = child.stdout.take() {
            pipes.push(Box::new(out));
        }
        if let Some(err) = child.stderr.take() {
            pipes.push(Box::new(err));
        }
        let readers: Vec<_> = pipes
            .into_iter()
            .map(|pipe| {
                let tx = tx.clone();
                thread::spawn(move || forward_lines(pipe, &tx))
            })
            .collect();
        drop(tx);

        for line in rx {
            listener.message(&line);
        }
        for reader in readers {
            let _ = reader.join();
        }

        let status = child.wait()?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Send each line of `pipe` to `tx`, decoding lossily, until EOF.
///
/// The pipe is drained even after the receiver is gone so the child never
/// blocks or dies writing to a closed pipe.
fn forward_lines(pipe: impl Read, tx: &mpsc::Sender<String>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("Failed to read process output: {e}");
                break;
            }
        }
    }
}
