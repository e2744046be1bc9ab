// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Invocation of native packaging tools. */

use {
    crate::error::{PackagingError, Result},
    duct::cmd,
    log::warn,
    std::path::{Path, PathBuf},
};

/// A command to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory. Inherited from the current process if not set.
    pub dir: Option<PathBuf>,
    /// Data fed to the process's stdin.
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn new(program: impl ToString) -> Self {
        Self {
            program: program.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = impl ToString>) -> Self {
        self.args.extend(args.into_iter().map(|x| x.to_string()));
        self
    }

    #[must_use]
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Render the command line for display purposes.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|x| x.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The result of running an [Invocation].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InvocationOutput {
    /// Exit code. `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl InvocationOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Convert an unsuccessful exit into an error describing the failed step.
    pub fn check(self, step: &'static str, program: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(PackagingError::ToolFailed {
                step,
                program: program.to_string(),
                status: self.status,
            })
        }
    }
}

/// Something that can run external processes.
///
/// Processes run to completion. Only the exit status and captured output are
/// made available.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput>;
}

/// Runs processes on the current system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput> {
        warn!("running {}", invocation.command_line());

        let mut expression = cmd(&invocation.program, &invocation.args)
            .stdout_capture()
            .stderr_capture()
            .unchecked();

        if let Some(dir) = &invocation.dir {
            expression = expression.dir(dir);
        }
        if let Some(data) = &invocation.stdin {
            expression = expression.stdin_bytes(data.clone());
        }

        let output = expression.run()?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("{}", line);
        }

        Ok(InvocationOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
