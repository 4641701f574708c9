//! Probe invoker
//!
//! Runs the external media-inspection tool against one file and parses its
//! JSON report. The call blocks for the lifetime of the subprocess; callers on
//! the async runtime must move it to the blocking pool.

pub mod raw;

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::AnalysisError;

pub use raw::{FormatSection, ProbeRawResult, StreamDescriptor};

/// Anything that can produce a raw probe report for a path
pub trait MediaProber: Send + Sync {
    /// Blocking probe of a single file
    fn probe(&self, path: &Path) -> Result<ProbeRawResult, AnalysisError>;
}

/// `ffprobe` subprocess invoker
#[derive(Debug, Clone)]
pub struct FfprobeInvoker {
    binary: String,
}

impl FfprobeInvoker {
    /// `binary` is a bare name looked up on PATH, or a path to the executable
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolve the executable
    pub fn locate(&self) -> Result<PathBuf, AnalysisError> {
        which::which(&self.binary).map_err(|_| AnalysisError::ToolNotFound(self.binary.clone()))
    }

    /// Build the command line; the target path is passed as a single argument
    fn command(executable: &Path, path: &Path) -> Command {
        let mut cmd = Command::new(executable);
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path);
        cmd
    }
}

impl MediaProber for FfprobeInvoker {
    fn probe(&self, path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        let executable = self.locate()?;

        debug!(
            binary = %executable.display(),
            file = %path.display(),
            "Running probe"
        );

        let output = Self::command(&executable, path)
            .output()
            .map_err(|e| AnalysisError::InvocationFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr)
            };
            return Err(AnalysisError::InvocationFailed(detail));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AnalysisError::MalformedOutput(e.to_string()))
    }
}
