//! Child process execution for the external archiver
//!
//! Commands are always a program plus a discrete argument vector; no shell is
//! involved, so file names cannot inject extra commands. The joined form from
//! [`CommandSpec::display_line`] exists only for logs.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{BackupError, BackupResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument, kept as a single argv element
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Human-readable command line for logging
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Build the std command
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// How a child process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process exited on its own
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The timeout elapsed first
    TimedOut,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        matches!(self, Self::Completed { code: Some(0), .. })
    }
}

/// Executes commands
pub trait ProcessRunner {
    /// Run `spec` to completion or until `timeout` elapses
    fn run(&self, spec: &CommandSpec, timeout: Duration) -> BackupResult<ProcessOutcome>;
}

/// Runs real child processes
///
/// Output is captured into anonymous temporary files, not pipes. The child is
/// polled until it exits or the timeout elapses, then killed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, spec: &CommandSpec, timeout: Duration) -> BackupResult<ProcessOutcome> {
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        let mut command = spec.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?));

        let mut child = command.spawn().map_err(|e| {
            BackupError::Archive(format!("Failed to start {}: {}", spec.program.display(), e))
        })?;

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(ProcessOutcome::TimedOut);
            }
            std::thread::sleep(POLL_INTERVAL.min(timeout));
        };

        Ok(ProcessOutcome::Completed {
            code: status.code(),
            stdout: read_captured(&mut stdout_file)?,
            stderr: read_captured(&mut stderr_file)?,
        })
    }
}

fn read_captured(file: &mut File) -> BackupResult<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
