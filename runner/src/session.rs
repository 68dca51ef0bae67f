use crate::{
    executors::{HostExecutor, ShellExecutor, Sleeper, StatusPoller, Submitter, ThreadSleeper},
    job::{JobDescriptor, JobError, JobHandle, JobOutput, JobStatus},
    logging::{LogContext, LogScope},
};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// One job run: the descriptor, its handle and the collaborators that drive it
///
/// Every operation enters the session's log scope, if there is one, for its duration.
#[derive(Debug)]
pub struct JobSession<E = ShellExecutor, S = ThreadSleeper> {
    descriptor: JobDescriptor,
    handle: JobHandle,
    executor: E,
    sleeper: S,
    log: Option<LogContext>,
}

impl JobSession {
    pub fn new(descriptor: JobDescriptor) -> Self {
        Self::with_executor(descriptor, ShellExecutor, ThreadSleeper)
    }
}

impl<E: HostExecutor, S: Sleeper> JobSession<E, S> {
    pub fn with_executor(descriptor: JobDescriptor, executor: E, sleeper: S) -> Self {
        Self {
            handle: JobHandle::new(descriptor.mode()),
            descriptor,
            executor,
            sleeper,
            log: None,
        }
    }

    pub fn with_log_context(mut self, log: LogContext) -> Self {
        self.log = Some(log);
        self
    }

    pub fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    fn scope(&self) -> Option<LogScope> {
        self.log.as_ref().map(LogContext::enter)
    }

    /// Submit the job, a later call submits it again and forgets the previous run
    pub fn run(&mut self) -> Result<&JobHandle, JobError> {
        let _scope = self.scope();

        if self.handle.is_submitted() {
            warn!(
                job_id = ?self.handle.job_id(),
                "Job was already submitted, submitting again"
            );
        }

        self.handle = Submitter::new(&self.executor).submit(&self.descriptor)?;
        Ok(&self.handle)
    }

    pub fn status(&mut self) -> Result<JobStatus, JobError> {
        let _scope = self.scope();
        StatusPoller::with_sleeper(&self.executor, &self.sleeper).query_status(&mut self.handle)
    }

    /// raw accounting record of the job
    pub fn full_status(&self) -> Result<String, JobError> {
        let _scope = self.scope();
        StatusPoller::with_sleeper(&self.executor, &self.sleeper).full_status(&self.handle)
    }

    pub fn wait(&mut self, poll_interval: Duration) -> Result<JobOutput, JobError> {
        let _scope = self.scope();
        StatusPoller::with_sleeper(&self.executor, &self.sleeper).await_completion(
            &self.descriptor,
            &mut self.handle,
            poll_interval,
        )
    }
}
