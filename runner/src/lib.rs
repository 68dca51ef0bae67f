//! Submit a single job to Slurm, or run it locally, and follow it until it finished.

pub mod args;
pub mod command;
pub mod config;
pub mod executors;
pub mod job;
pub mod logging;
pub mod session;

#[cfg(test)]
mod testing;

pub use job::{ExecutionMode, JobDescriptor, JobError, JobHandle, JobOutput, JobStatus};
pub use session::JobSession;
