use crate::{
    executors::{CommandOutput, ExecutorError, HostExecutor, Sleeper},
    job::{ExecutionMode, JobDescriptor},
};
use parking_lot::Mutex;
use std::{collections::VecDeque, path::PathBuf, time::Duration};
use tempfile::TempDir;

/// Executor that answers with canned outputs and records every command line
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Result<CommandOutput, String>>>,
    commands: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: &str, status: i32) -> Self {
        self.responses.lock().push_back(Ok(CommandOutput {
            text: text.to_string(),
            status: Some(status),
        }));
        self
    }

    /// the next command fails to spawn
    pub fn fail_spawn(self, message: &str) -> Self {
        self.responses.lock().push_back(Err(message.to_string()));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }
}

impl HostExecutor for ScriptedExecutor {
    fn execute(&self, command_line: &str) -> Result<CommandOutput, ExecutorError> {
        self.commands.lock().push(command_line.to_string());

        match self.responses.lock().pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(ExecutorError::Spawn {
                command: command_line.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
            }),
            None => panic!("no scripted response left for `{command_line}`"),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

/// Temporary directory with a job script and a log location inside it
pub struct Fixture {
    pub dir: TempDir,
    pub script: PathBuf,
    pub log_file: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.py");
        std::fs::write(&script, "print('hello')\n").unwrap();
        let log_file = dir.path().join("logs").join("job.log");

        Self {
            dir,
            script,
            log_file,
        }
    }

    pub fn scheduled(&self) -> JobDescriptor {
        JobDescriptor::builder("test", &self.script)
            .log_file(Some(self.log_file.clone()))
            .build()
            .unwrap()
    }

    pub fn local(&self) -> JobDescriptor {
        JobDescriptor::builder("test", &self.script)
            .mode(ExecutionMode::Local)
            .build()
            .unwrap()
    }
}
