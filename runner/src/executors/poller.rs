use super::{
    slurm::{failed_sacct_state, parse_sacct_state, sacct_command},
    HostExecutor,
};
use crate::{
    config::ConfigErrors,
    job::{JobDescriptor, JobError, JobHandle, JobOutput, JobStatus},
};
use std::{io::ErrorKind, path::Path, time::Duration};
use tracing::{debug, info, instrument, warn};

/// Suspension between two status queries
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Asks the scheduler accounting about a job and waits for it to finish
#[derive(Debug, Clone)]
pub struct StatusPoller<E, S = ThreadSleeper> {
    executor: E,
    sleeper: S,
}

impl<E: HostExecutor> StatusPoller<E> {
    pub fn new(executor: E) -> Self {
        Self::with_sleeper(executor, ThreadSleeper)
    }
}

impl<E: HostExecutor, S: Sleeper> StatusPoller<E, S> {
    pub fn with_sleeper(executor: E, sleeper: S) -> Self {
        Self { executor, sleeper }
    }

    /// Current state of the job, also stored in the handle
    ///
    /// Local jobs finished before submission returned, so they are always completed and no
    /// process is spawned for them.
    pub fn query_status(&self, handle: &mut JobHandle) -> Result<JobStatus, JobError> {
        handle.ensure_submitted()?;

        let status = match handle.job_id() {
            None => JobStatus::Completed,
            Some(job_id) => match self.accounting_record(job_id) {
                Ok(record) => parse_sacct_state(&record),
                Err(failure) => failed_sacct_state(&failure),
            },
        };

        handle.record_status(status.clone());
        Ok(status)
    }

    /// Raw accounting record (state, elapsed, memory, cpus, name) for diagnostics
    pub fn full_status(&self, handle: &JobHandle) -> Result<String, JobError> {
        handle.ensure_submitted()?;

        Ok(match handle.job_id() {
            None => JobStatus::Completed.to_string(),
            Some(job_id) => match self.accounting_record(job_id) {
                Ok(record) | Err(record) => record,
            },
        })
    }

    /// Block until the job left the queue, then return what it wrote to its log file
    ///
    /// There is no timeout, a job that never finishes keeps the caller waiting.
    #[instrument(skip_all, fields(job = descriptor.name()), level = "info")]
    pub fn await_completion(
        &self,
        descriptor: &JobDescriptor,
        handle: &mut JobHandle,
        poll_interval: Duration,
    ) -> Result<JobOutput, JobError> {
        if let Some(outcome) = handle.local_outcome() {
            warn!("Cannot wait for local job - returning output from local job");
            return Ok(JobOutput::Local(outcome.clone()));
        }
        handle.ensure_submitted()?;

        loop {
            let status = self.query_status(handle)?;
            if status.is_final() {
                debug!(status = %status, "Job left the queue");
                break;
            }

            debug!(
                job_id = ?handle.job_id(),
                status = %status,
                "Job still running, checking again in {poll_interval:?}"
            );
            self.sleeper.sleep(poll_interval);
        }

        let record = self.full_status(handle)?;
        info!(job_id = ?handle.job_id(), "Job finished with status: {record}");

        let log_file = descriptor
            .log_file()
            .ok_or(ConfigErrors::MissingOption("log_file"))?;
        Ok(read_log(log_file))
    }

    /// `Err` carries whatever the failed query printed, nothing if it could not be spawned
    fn accounting_record(&self, job_id: &str) -> Result<String, String> {
        match self.executor.execute(&sacct_command(job_id)) {
            Ok(output) if output.success() => Ok(output.text),
            Ok(output) => {
                warn!(
                    job_id = %job_id,
                    exit_code = ?output.status,
                    output = %output.text,
                    "sacct failed"
                );
                Err(output.text)
            }
            Err(error) => {
                warn!(job_id = %job_id, error = ?error, "Failed to run sacct");
                Err(String::new())
            }
        }
    }
}

fn read_log(path: &Path) -> JobOutput {
    debug!("reading log_file: {}", path.display());

    match std::fs::read_to_string(path) {
        Ok(content) => JobOutput::Log(content),
        Err(error) => {
            if error.kind() == ErrorKind::NotFound {
                warn!("Could not find log file: {}", path.display());
            } else {
                warn!(error = ?error, "Could not read log file: {}", path.display());
            }
            JobOutput::LogUnavailable(path.to_path_buf())
        }
    }
}
