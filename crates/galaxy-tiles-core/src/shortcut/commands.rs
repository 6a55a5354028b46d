//! Typed external commands and their PowerShell rendering.
//!
//! Planning code only ever builds [`ShellCommand`] values; the script text is
//! produced when a batch reaches a [`CommandRunner`](crate::platform::CommandRunner).

use crate::config::GalaxyPaths;
use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

/// A single action to run through the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Fetch an icon from the GOG image service.
    DownloadIcon { resource: String, destination: PathBuf },
    /// Create a `.lnk` shortcut pointing at `target`.
    CreateShortcut { link: PathBuf, target: PathBuf },
    /// Export the live Start layout.
    ExportStartLayout { destination: PathBuf },
    /// Stop every process with the given name.
    StopProcess { name: String },
}

impl ShellCommand {
    fn needs_wscript(&self) -> bool {
        matches!(self, ShellCommand::CreateShortcut { .. })
    }

    fn is_download(&self) -> bool {
        matches!(self, ShellCommand::DownloadIcon { .. })
    }
}

/// Quote a value as a PowerShell double-quoted string.
pub fn ps_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '`' | '"' | '$') {
            quoted.push('`');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn ps_path(path: &Path) -> String {
    ps_quote(&path.display().to_string())
}

/// Icon URL for a store resource name.
pub fn icon_url(resource: &str) -> String {
    format!("{}/{}?namespace=gamesdb", GalaxyPaths::ICON_BASE_URL, resource)
}

/// An ordered list of commands executed in one process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch {
    label: String,
    commands: Vec<ShellCommand>,
}

impl CommandBatch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    /// Batch holding a single command.
    pub fn single(label: impl Into<String>, command: ShellCommand) -> Self {
        let mut batch = Self::new(label);
        batch.push(command);
        batch
    }

    pub fn push(&mut self, command: ShellCommand) {
        self.commands.push(command);
    }

    pub fn download_icon(&mut self, resource: impl Into<String>, destination: impl Into<PathBuf>) {
        self.push(ShellCommand::DownloadIcon {
            resource: resource.into(),
            destination: destination.into(),
        });
    }

    pub fn create_shortcut(&mut self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.push(ShellCommand::CreateShortcut {
            link: link.into(),
            target: target.into(),
        });
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn commands(&self) -> &[ShellCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render the batch as one PowerShell script.
    pub fn to_powershell(&self) -> String {
        let mut script = String::new();

        if self.commands.iter().any(ShellCommand::is_download) {
            // The progress bar slows Invoke-WebRequest down considerably.
            script.push_str("$ProgressPreference = 'SilentlyContinue'\n");
        }
        if self.commands.iter().any(ShellCommand::needs_wscript) {
            script.push_str("$WScriptShell = New-Object -ComObject WScript.Shell\n");
        }

        for command in &self.commands {
            // Writing into a String cannot fail.
            let _ = match command {
                ShellCommand::DownloadIcon {
                    resource,
                    destination,
                } => writeln!(
                    script,
                    "Invoke-WebRequest -Uri {} -OutFile {}",
                    ps_quote(&icon_url(resource)),
                    ps_path(destination)
                ),
                ShellCommand::CreateShortcut { link, target } => writeln!(
                    script,
                    "$Shortcut = $WScriptShell.CreateShortcut({})\n$Shortcut.TargetPath = {}\n$Shortcut.Save()",
                    ps_path(link),
                    ps_path(target)
                ),
                ShellCommand::ExportStartLayout { destination } => {
                    writeln!(script, "Export-StartLayout -Path {}", ps_path(destination))
                }
                ShellCommand::StopProcess { name } => {
                    writeln!(script, "Stop-Process -ProcessName {}", ps_quote(name))
                }
            };
        }

        script
    }
}
