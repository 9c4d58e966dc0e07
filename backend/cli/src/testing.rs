//! Recording tool runner shared by the operation and API tests.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use media::{ToolOutput, ToolRunner};
use reelforge_core::ReelResult;

/// One non-probe invocation: its arguments and the bytes of every input it
/// could read while running. `None` marks an input that was already gone.
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub args: Vec<String>,
    pub inputs: Vec<Option<Vec<u8>>>,
}

/// Answers probes with no metadata, records every other run and, on success,
/// writes `rendered` to the output path like the real tool would.
pub struct RecordingTool {
    exit_code: i32,
    stderr: &'static str,
    delay: Duration,
    runs: Mutex<Vec<ToolRun>>,
}

impl RecordingTool {
    pub fn new(exit_code: i32, stderr: &'static str) -> Self {
        Self {
            exit_code,
            stderr,
            delay: Duration::ZERO,
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(0, "")
    }

    /// Sleep before touching any file, like a long encode.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn runs(&self) -> Vec<ToolRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRunner for RecordingTool {
    fn program(&self) -> &Path {
        Path::new("ffmpeg")
    }

    async fn run(&self, args: Vec<OsString>) -> ReelResult<ToolOutput> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        if args.iter().any(|a| a == "null") {
            return Ok(ToolOutput::from_code(1, ""));
        }

        let inputs = read_inputs(&args);
        if self.exit_code == 0 {
            if let Some(output) = args.last() {
                std::fs::write(output, b"rendered").unwrap();
            }
        }
        self.runs.lock().unwrap().push(ToolRun { args, inputs });
        Ok(ToolOutput::from_code(self.exit_code, self.stderr))
    }
}

/// Concat runs list their inputs in the manifest; watermark runs name the
/// video as the first `-i`.
fn read_inputs(args: &[String]) -> Vec<Option<Vec<u8>>> {
    let Some(first_input) = args.iter().position(|a| a == "-i").and_then(|i| args.get(i + 1)) else {
        return Vec::new();
    };
    if args.first().map(String::as_str) != Some("-f") {
        return vec![std::fs::read(first_input).ok()];
    }
    match std::fs::read_to_string(first_input) {
        Ok(manifest) => manifest
            .lines()
            .filter_map(|line| line.strip_prefix("file '")?.strip_suffix('\''))
            .map(|path| std::fs::read(path).ok())
            .collect(),
        Err(_) => vec![None],
    }
}
