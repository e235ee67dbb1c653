//! Synchronous execution of external tools.
//!
//! Stages describe each call as an [`Invocation`] and hand it to a
//! [`ToolRunner`]. [`SystemRunner`] spawns real processes; tests substitute a
//! runner that records invocations instead.
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::error::{Error, Result};

/// A single external command: program, arguments and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Applied on top of the inherited environment
    pub env: BTreeMap<String, OsString>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            env: BTreeMap::new(),
            current_dir: None,
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// `flag value` when `value` is present, nothing otherwise.
    pub fn opt_arg<S: AsRef<OsStr>>(self, flag: &str, value: Option<S>) -> Self {
        match value {
            Some(value) => self.arg(flag).arg(value),
            None => self,
        }
    }

    pub fn env<K: Into<String>, V: AsRef<OsStr>>(mut self, key: K, value: V) -> Self {
        self.env.insert(key.into(), value.as_ref().to_os_string());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.as_ref().to_os_string());
        }
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Command line as it would be typed, arguments joined by spaces.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Arguments as UTF-8 strings (lossy); convenient for assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Which output stream, if any, is collected instead of passed through.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Capture {
    Inherit,
    Stdout,
    Stderr,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Stream {
    Inherit,
    Piped,
}

impl From<Stream> for Stdio {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Inherit => Stdio::inherit(),
            Stream::Piped => Stdio::piped(),
        }
    }
}

impl Capture {
    /// stdin, stdout and stderr of the child. stdin always passes through;
    /// tools such as `conda` may prompt.
    fn streams(self) -> [Stream; 3] {
        match self {
            Capture::Inherit => [Stream::Inherit, Stream::Inherit, Stream::Inherit],
            Capture::Stdout => [Stream::Inherit, Stream::Piped, Stream::Inherit],
            Capture::Stderr => [Stream::Inherit, Stream::Inherit, Stream::Piped],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            success: false,
            ..Default::default()
        }
    }

    pub fn with_stdout<B: Into<Vec<u8>>>(mut self, stdout: B) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr<B: Into<Vec<u8>>>(mut self, stderr: B) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Turn a non-zero exit into [`Error::CommandFailed`].
    pub fn check(self, invocation: &Invocation) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            let command = invocation.display();
            error!("Command had a non-zero exit: {}", command);
            Err(Error::CommandFailed {
                command,
                code: self.code,
            })
        }
    }
}

pub trait ToolRunner {
    /// Run to completion. Only failing to start the process is an error here;
    /// the exit status is reported in the returned [`ToolOutput`].
    fn execute(&mut self, invocation: &Invocation, capture: Capture) -> Result<ToolOutput>;

    /// Run to completion and require a zero exit status.
    fn run(&mut self, invocation: &Invocation, capture: Capture) -> Result<ToolOutput> {
        self.execute(invocation, capture)?.check(invocation)
    }
}

impl<R: ToolRunner + ?Sized> ToolRunner for &mut R {
    fn execute(&mut self, invocation: &Invocation, capture: Capture) -> Result<ToolOutput> {
        (**self).execute(invocation, capture)
    }
}

/// Spawns the tools on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn execute(&mut self, invocation: &Invocation, capture: Capture) -> Result<ToolOutput> {
        debug!("Running: {}", invocation.display());
        if !invocation.env.is_empty() {
            debug!("  with environment: {:?}", invocation.env);
        }

        // `output()` nulls stdin and pipes both outputs unless told otherwise
        let mut cmd = invocation.to_command();
        let [stdin, stdout, stderr] = capture.streams();
        cmd.stdin(stdin).stdout(stdout).stderr(stderr);

        let output = cmd.output().map_err(|source| Error::Spawn {
            program: invocation.program_name(),
            source,
        })?;

        Ok(ToolOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
