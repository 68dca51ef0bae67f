use super::{ExecutionMode, JobError, JobStatus};
use tracing::debug;

/// Completion record of a job that ran on the current host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOutcome {
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub output: String,
}

impl LocalOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Submission {
    NotSubmitted,
    /// the scheduler answered without a usable job id
    Rejected { response: String },
    Scheduled { job_id: String, response: String },
    Local(LocalOutcome),
}

/// Identity and last observed state of one job run
#[derive(Debug, Clone)]
pub struct JobHandle {
    mode: ExecutionMode,
    submission: Submission,
    status: Option<JobStatus>,
}

impl JobHandle {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            submission: Submission::NotSubmitted,
            status: None,
        }
    }

    /// Handle for a job that was submitted elsewhere, e.g. by an earlier invocation
    pub fn attach(job_id: impl Into<String>) -> Self {
        Self {
            mode: ExecutionMode::Scheduled,
            submission: Submission::Scheduled {
                job_id: job_id.into(),
                response: String::new(),
            },
            status: None,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn job_id(&self) -> Option<&str> {
        match &self.submission {
            Submission::Scheduled { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// raw scheduler answer, kept for diagnostics
    pub fn raw_response(&self) -> Option<&str> {
        match &self.submission {
            Submission::Scheduled { response, .. } | Submission::Rejected { response } => {
                Some(response)
            }
            _ => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(
            self.submission,
            Submission::Scheduled { .. } | Submission::Local(_)
        )
    }

    /// the scheduler was asked but did not hand out a job id
    pub fn submission_failed(&self) -> bool {
        matches!(self.submission, Submission::Rejected { .. })
    }

    pub fn local_outcome(&self) -> Option<&LocalOutcome> {
        match &self.submission {
            Submission::Local(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn last_status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn ensure_submitted(&self) -> Result<(), JobError> {
        if self.is_submitted() {
            Ok(())
        } else {
            Err(JobError::NotSubmitted)
        }
    }

    pub(crate) fn record_scheduled(&mut self, job_id: String, response: String) {
        self.submission = Submission::Scheduled { job_id, response };
    }

    pub(crate) fn record_rejected(&mut self, response: String) {
        self.submission = Submission::Rejected { response };
    }

    pub(crate) fn record_local(&mut self, outcome: LocalOutcome) {
        self.submission = Submission::Local(outcome);
    }

    /// Store a freshly observed status
    ///
    /// A final status is never replaced, and a job that was seen active does not fall back to
    /// unknown when the accounting briefly has no record of it.
    pub(crate) fn record_status(&mut self, status: JobStatus) {
        if let Some(current) = self.status.as_ref() {
            let regresses =
                current.is_final() || (current.is_active() && status == JobStatus::Unknown);
            if regresses {
                if *current != status {
                    debug!(current = %current, ignored = %status, "Ignoring status regression");
                }
                return;
            }
        }

        self.status = Some(status);
    }
}
