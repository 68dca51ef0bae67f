use super::{slurm::parse_job_id, HostExecutor};
use crate::{
    config::ConfigErrors,
    job::{ExecutionMode, JobDescriptor, JobError, JobHandle, LocalOutcome},
};
use tracing::{debug, info, instrument, trace, warn};

/// Starts a job, either through the scheduler or directly on this host
#[derive(Debug, Clone)]
pub struct Submitter<E> {
    executor: E,
}

impl<E: HostExecutor> Submitter<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Spawn exactly one host process for the job and record the result in a new handle
    ///
    /// A scheduler that does not hand out a job id is not an error, the returned handle is left
    /// unsubmitted with the raw answer attached. Only a local job that cannot be spawned at all
    /// fails.
    #[instrument(skip_all, fields(job = descriptor.name()), level = "info")]
    pub fn submit(&self, descriptor: &JobDescriptor) -> Result<JobHandle, JobError> {
        let mut handle = JobHandle::new(descriptor.mode());

        match descriptor.mode() {
            ExecutionMode::Local => self.run_local(descriptor, &mut handle)?,
            ExecutionMode::Scheduled => self.run_scheduled(descriptor, &mut handle)?,
        }

        Ok(handle)
    }

    fn run_local(&self, descriptor: &JobDescriptor, handle: &mut JobHandle) -> Result<(), JobError> {
        info!("Running job locally: {}", descriptor.name());
        info!("command: {}", descriptor.run_command());

        let output = self.executor.execute(descriptor.run_command())?;
        let outcome = LocalOutcome {
            exit_code: output.status,
            output: output.text,
        };

        info!(exit_code = ?outcome.exit_code, "Local job finished");
        trace!("Output: {}", outcome.output);
        if !outcome.success() {
            debug!("Local job exited unsuccessfully, the exit code is left to the caller");
        }

        handle.record_local(outcome);
        Ok(())
    }

    fn run_scheduled(
        &self,
        descriptor: &JobDescriptor,
        handle: &mut JobHandle,
    ) -> Result<(), JobError> {
        let command = descriptor
            .submit_command()
            .ok_or(ConfigErrors::MissingOption("log_file"))?;
        debug!("sbatch command: {command}");

        let output = match self.executor.execute(command) {
            Ok(output) => output,
            Err(error) => {
                warn!(error = ?error, "Failed to run sbatch, job is not submitted");
                handle.record_rejected(error.to_string());
                return Ok(());
            }
        };
        debug!("sbatch response: {}", output.text);

        match parse_job_id(&output.text) {
            Some(job_id) if output.success() => {
                info!(job_id = %job_id, "Submitted job {}", descriptor.name());
                let job_id = job_id.to_string();
                handle.record_scheduled(job_id, output.text);
            }
            _ => {
                warn!(
                    exit_code = ?output.status,
                    response = %output.text,
                    "Scheduler did not return a job id, job is not submitted"
                );
                handle.record_rejected(output.text);
            }
        }

        Ok(())
    }
}
