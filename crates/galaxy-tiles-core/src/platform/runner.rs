//! External command execution.

use crate::error::{Result, TilesError};
use crate::shortcut::CommandBatch;
use async_trait::async_trait;
use std::io::Write;
use std::process::Output;
use tracing::{debug, warn};

/// Captured result of running a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exited with status zero.
    pub success: bool,
    /// Non-empty stdout lines.
    pub stdout: Vec<String>,
    /// Non-empty stderr lines.
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// Successful run without output.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Failed run with a single diagnostic line.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: Vec::new(),
            stderr: vec![message.into()],
        }
    }

    pub fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: split_lines(&output.stdout),
            stderr: split_lines(&output.stderr),
        }
    }

    /// Exit status zero and nothing on stderr.
    pub fn is_clean(&self) -> bool {
        self.success && self.stderr.is_empty()
    }

    /// Diagnostic text for error messages.
    pub fn diagnostics(&self) -> String {
        if self.stderr.is_empty() {
            "command exited with an error".to_string()
        } else {
            self.stderr.join(" ")
        }
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Runs a batch of shell commands in one process.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run every command of `batch`.
    ///
    /// A batch that ran but reported errors is still `Ok`; only a failure to
    /// start the process is an `Err`.
    async fn run(&self, batch: &CommandBatch) -> Result<CommandOutput>;
}

/// Runs batches through Windows PowerShell.
#[derive(Debug, Clone)]
pub struct PowerShellRunner {
    program: String,
}

impl PowerShellRunner {
    pub fn new() -> Self {
        Self {
            program: "powershell".to_string(),
        }
    }

    /// Use a different executable, e.g. `pwsh`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn report(&self, batch: &CommandBatch, script: &str, output: &CommandOutput) {
        if !output.success {
            warn!("{} exited with an error", batch.label());
        }
        for line in &output.stderr {
            warn!("{}", line);
        }
        if !output.stderr.is_empty() {
            debug!("Script: {}", script);
        }
        for line in &output.stdout {
            debug!("{}", line);
        }
    }
}

/// Windows PowerShell 5.1 reads a `.ps1` without a byte order mark in the
/// ANSI code page, which mangles non-ASCII titles and paths.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn script_bytes(script: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + script.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(script.as_bytes());
    bytes
}

impl Default for PowerShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for PowerShellRunner {
    async fn run(&self, batch: &CommandBatch) -> Result<CommandOutput> {
        if batch.is_empty() {
            return Ok(CommandOutput::ok());
        }

        let script = batch.to_powershell();
        let mut file = tempfile::Builder::new()
            .prefix("galaxy-tiles-")
            .suffix(".ps1")
            .tempfile()?;
        file.write_all(&script_bytes(&script))
            .map_err(|e| TilesError::io_with_path(e, file.path()))?;
        // Close our handle; the file is removed when `script_path` drops.
        let script_path = file.into_temp_path();

        debug!(
            "Running {} ({} commands) via {}",
            batch.label(),
            batch.len(),
            self.program
        );

        let output = tokio::process::Command::new(&self.program)
            .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
            .arg(&*script_path)
            .output()
            .await
            .map_err(|e| TilesError::CommandFailed {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let result = CommandOutput::from_output(&output);
        self.report(batch, &script, &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_drops_blank_and_trailing_space() {
        let lines = split_lines(b"first   \r\n\r\nsecond\n  \n");
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_script_is_written_with_utf8_bom() {
        let script = "New-Item -Path 'C:\\Spiele\\Ōkami' -ItemType Directory";
        let bytes = script_bytes(script);
        assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);
        assert_eq!(std::str::from_utf8(&bytes[3..]).unwrap(), script);
    }

    #[test]
    fn test_output_helpers() {
        assert!(CommandOutput::ok().is_clean());

        let failed = CommandOutput::failed("Access is denied.");
        assert!(!failed.is_clean());
        assert_eq!(failed.diagnostics(), "Access is denied.");

        let noisy = CommandOutput {
            success: true,
            stdout: Vec::new(),
            stderr: vec!["warning".into()],
        };
        assert!(!noisy.is_clean());
        assert_eq!(
            CommandOutput {
                success: false,
                ..Default::default()
            }
            .diagnostics(),
            "command exited with an error"
        );
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_spawn() {
        let runner = PowerShellRunner::new().with_program("definitely-not-a-real-program");
        let output = runner.run(&CommandBatch::new("nothing")).await.unwrap();
        assert!(output.is_clean());
    }

    #[tokio::test]
    async fn test_missing_program_is_command_error() {
        let runner = PowerShellRunner::new().with_program("definitely-not-a-real-program");
        let mut batch = CommandBatch::new("downloads");
        batch.download_icon("a.png", "a.png");

        let result = runner.run(&batch).await;
        assert!(matches!(result, Err(TilesError::CommandFailed { .. })));
    }
}
