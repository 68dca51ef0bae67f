use super::{CommandOutput, ExecutorError, HostExecutor};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// Executor that hands command lines to `sh -c`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl HostExecutor for ShellExecutor {
    #[tracing::instrument(level = "debug", skip(self))]
    fn execute(&self, command_line: &str) -> Result<CommandOutput, ExecutorError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecutorError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        // stdout first, stderr appended, like a combined capture of a short lived command
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim_end_matches('\n').to_string();

        debug!("Command exit status: {:?}", output.status.code());
        trace!("Output: {text}");

        Ok(CommandOutput {
            text,
            status: output.status.code(),
        })
    }
}
