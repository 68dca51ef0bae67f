mod poller;
mod shell;
pub mod slurm;
mod submitter;


pub use poller::{Sleeper, StatusPoller, ThreadSleeper};
pub use shell::ShellExecutor;
pub use submitter::Submitter;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to spawn `{command}`")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Text and exit code of a finished host command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    /// `None` if the process was terminated by a signal
    pub status: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a command line on the current host and blocks until it finished
pub trait HostExecutor {
    fn execute(&self, command_line: &str) -> Result<CommandOutput, ExecutorError>;
}

impl<T: HostExecutor + ?Sized> HostExecutor for &T {
    fn execute(&self, command_line: &str) -> Result<CommandOutput, ExecutorError> {
        (**self).execute(command_line)
    }
}
