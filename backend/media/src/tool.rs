//! External tool invocation.
//!
//! Every flow talks to ffmpeg through [`ToolRunner`], which takes an argument
//! list and returns the exit status plus captured stderr.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use reelforge_core::{ReelError, ReelResult};
use tokio::process::Command;
use tracing::{debug, info};

/// Environment variable that overrides the ffmpeg location.
pub const FFMPEG_ENV: &str = "REELFORGE_FFMPEG";

/// Exit status and diagnostics of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub stderr: String,
}

impl ToolOutput {
    pub fn from_code(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            success: code == 0,
            stderr: stderr.into(),
        }
    }

    /// Turn a non-zero exit into [`ReelError::ToolFailed`].
    pub fn into_result(self) -> ReelResult<ToolOutput> {
        if self.success {
            Ok(self)
        } else {
            Err(ReelError::ToolFailed {
                exit_code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Program name shown in logs and diagnostics.
    fn program(&self) -> &Path;

    /// Run the tool to completion with the given arguments. Dropping the
    /// returned future must not leave the process running.
    async fn run(&self, args: Vec<OsString>) -> ReelResult<ToolOutput>;
}

/// Runs the real ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    program: PathBuf,
}

impl FfmpegTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `ffmpeg -version` and return the first line of its output.
    pub async fn version(&self) -> ReelResult<String> {
        let out = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ReelError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&out.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl ToolRunner for FfmpegTool {
    fn program(&self) -> &Path {
        &self.program
    }

    async fn run(&self, args: Vec<OsString>) -> ReelResult<ToolOutput> {
        debug!(program = %self.program.display(), args = ?args, "Running tool");

        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ReelError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let output = ToolOutput {
            exit_code: out.status.code(),
            success: out.status.success(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        info!(
            program = %self.program.display(),
            exit_code = ?output.exit_code,
            "Tool finished"
        );
        Ok(output)
    }
}

/// Find the ffmpeg executable: `REELFORGE_FFMPEG`, then `PATH`, then the
/// bare name.
pub fn locate_ffmpeg() -> PathBuf {
    if let Some(path) = std::env::var_os(FFMPEG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    which::which("ffmpeg")
        .or_else(|_| which::which("ffmpeg.exe"))
        .unwrap_or_else(|_| PathBuf::from("ffmpeg"))
}

/// Convenience for building argument lists from mixed strings and paths.
pub(crate) fn push_args<I, S>(args: &mut Vec<OsString>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.extend(items.into_iter().map(Into::into));
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Hook = Box<dyn Fn(&[OsString]) -> ToolOutput + Send + Sync>;

    /// Records every invocation and answers with a canned result. The hook
    /// runs while the tool "process" would be alive, so it can inspect
    /// scratch files before they are cleaned up.
    pub struct FakeTool {
        pub calls: Mutex<Vec<Vec<String>>>,
        hook: Hook,
    }

    impl FakeTool {
        pub fn new(hook: impl Fn(&[OsString]) -> ToolOutput + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                hook: Box::new(hook),
            }
        }

        pub fn exiting(code: i32, stderr: &'static str) -> Self {
            Self::new(move |_| ToolOutput::from_code(code, stderr))
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolRunner for FakeTool {
        fn program(&self) -> &Path {
            Path::new("ffmpeg")
        }

        async fn run(&self, args: Vec<OsString>) -> ReelResult<ToolOutput> {
            self.calls.lock().unwrap().push(
                args.iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
            );
            Ok((self.hook)(&args))
        }
    }

    /// Value following `flag` in an argument list.
    pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }
}
