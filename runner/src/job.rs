mod descriptor;
mod handle;
mod status;

#[cfg(test)]
mod descriptor_test;
#[cfg(test)]
mod status_test;

pub use descriptor::{ExecutionMode, JobDescriptor, JobDescriptorBuilder, DEFAULT_INTERPRETER};
pub use handle::{JobHandle, LocalOutcome};
pub use status::JobStatus;

use crate::{config::ConfigErrors, executors::ExecutorError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job has not been submitted")]
    NotSubmitted,
    #[error("Job configuration is invalid")]
    Config(#[from] ConfigErrors),
    #[error("Host command failed")]
    Executor(#[from] ExecutorError),
}

/// What a finished job left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    /// contents of the job log file
    Log(String),
    /// the log file could not be read, the job may not have written anything
    LogUnavailable(PathBuf),
    /// result of a job that ran on the current host
    Local(LocalOutcome),
}
