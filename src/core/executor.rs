//! The command executor boundary.
//!
//! The core never runs processes itself; it hands a built [`Command`] to a
//! [`CommandExecutor`] together with the repository's working directory.
//! [`ProcessExecutor`] is the real implementation. Every failure is turned into
//! one readable message by [`extract_error_message`]. Timeouts belong to the
//! executor, and nothing here cancels a running command.

use crate::core::command::Command;
use crate::core::error::{FlowNavigatorError, Result};
use async_trait::async_trait;
use std::path::Path;

const FAILURE_PREFIX: &str = "Command failed:";
const ERROR_MARKER: &str = "Error: ";
const INSTALL_HINT: &str =
    "install git-flow and make sure `git flow` runs in this repository, then retry";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` in `working_directory`. Non-zero exits are errors.
    async fn run(&self, command: &Command, working_directory: &Path) -> Result<CommandOutput>;
}

/// Pull the human-readable part out of a failure text: the message after an
/// `Error: ` marker if there is one, otherwise the text with its
/// `Command failed: <cmdline>` prefix removed.
pub fn extract_error_message(failure_text: &str, command_line: &str) -> String {
    if let Some(at) = failure_text.find(ERROR_MARKER) {
        let message = failure_text[at + ERROR_MARKER.len()..]
            .lines()
            .next()
            .unwrap_or_default()
            .trim();
        if !message.is_empty() {
            return message.to_string();
        }
    }

    let prefix = format!("{FAILURE_PREFIX} {command_line}");
    let remainder = failure_text
        .trim_start()
        .strip_prefix(&prefix)
        .or_else(|| failure_text.trim_start().strip_prefix(FAILURE_PREFIX))
        .unwrap_or(failure_text)
        .trim();

    if remainder.is_empty() {
        failure_text.trim().to_string()
    } else {
        remainder.to_string()
    }
}

fn is_tool_missing(stderr: &str) -> bool {
    stderr.contains("'flow' is not a git command") || stderr.contains("git: 'flow'")
}

/// Runs commands as child processes with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, command: &Command, working_directory: &Path) -> Result<CommandOutput> {
        let command_line = command.to_command_line();
        log::debug!("Running '{}' in {}", command_line, working_directory.display());

        let output = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .current_dir(working_directory)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FlowNavigatorError::external_tool_unavailable(format!(
                        "'{}' was not found on PATH; {INSTALL_HINT}",
                        command.program
                    ))
                } else {
                    FlowNavigatorError::Io(e)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return Ok(CommandOutput { stdout, stderr });
        }

        if is_tool_missing(&stderr) {
            log::warn!("git-flow is not installed: {}", stderr.trim());
            return Err(FlowNavigatorError::external_tool_unavailable(INSTALL_HINT));
        }

        let failure_text = format!("{FAILURE_PREFIX} {command_line}\n{stderr}\n{stdout}");
        let message = extract_error_message(&failure_text, &command_line);
        log::warn!("'{}' failed: {}", command_line, message);
        Err(FlowNavigatorError::external_command_failed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_marker() {
        let text = "Command failed: git flow feature finish\nFetching...\nError: There were merge conflicts.\nmore detail";
        assert_eq!(
            extract_error_message(text, "git flow feature finish"),
            "There were merge conflicts."
        );
    }

    #[test]
    fn test_extract_strips_command_failed_prefix() {
        let text = "Command failed: git flow feature start login\nfatal: A branch named 'feature/login' already exists\n";
        assert_eq!(
            extract_error_message(text, "git flow feature start login"),
            "fatal: A branch named 'feature/login' already exists"
        );
    }

    #[test]
    fn test_extract_passes_through_unprefixed_text() {
        assert_eq!(extract_error_message("  plain failure  ", "git x"), "plain failure");
    }

    #[test]
    fn test_extract_keeps_prefix_when_nothing_else() {
        let text = "Command failed: git flow feature list";
        assert_eq!(extract_error_message(text, "git flow feature list"), text);
    }

    #[test]
    fn test_tool_missing_detection() {
        assert!(is_tool_missing(
            "git: 'flow' is not a git command. See 'git --help'."
        ));
        assert!(!is_tool_missing("fatal: not a git repository"));
    }

    #[tokio::test]
    async fn test_process_executor_missing_program() {
        let command = Command {
            program: "definitely-not-a-real-program-xyz".to_string(),
            args: vec![],
        };
        let result = ProcessExecutor.run(&command, Path::new(".")).await;
        assert!(matches!(
            result,
            Err(FlowNavigatorError::ExternalToolUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_process_executor_failure_message() {
        let command = Command {
            program: "git".to_string(),
            args: vec!["definitely-not-a-subcommand".to_string()],
        };
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = ProcessExecutor.run(&command, temp_dir.path()).await;
        match result {
            Err(FlowNavigatorError::ExternalCommandFailed { message }) => {
                assert!(!message.starts_with(FAILURE_PREFIX));
                assert!(message.contains("definitely-not-a-subcommand"));
            }
            other => panic!("Expected ExternalCommandFailed, got: {other:?}"),
        }
    }
}
