use std::fmt;

/// Job state as reported by the scheduler accounting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Configuring,
    Running,
    Completed,
    Failed,
    Cancelled,
    /// the accounting has no record of the job (yet)
    Unknown,
    /// any state token this crate does not know, e.g. `TIMEOUT` or `OUT_OF_MEMORY`
    Other(String),
}

impl JobStatus {
    /// Normalize a raw state field, e.g. `cancelled by 1234` becomes `Cancelled`
    pub fn parse(raw: &str) -> Self {
        let token = match raw.split_whitespace().next() {
            Some(token) => token.to_uppercase(),
            None => return Self::Unknown,
        };

        match token.as_str() {
            "PENDING" => Self::Pending,
            "CONFIGURING" => Self::Configuring,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            "UNKNOWN" => Self::Unknown,
            _ => Self::Other(raw.trim().to_uppercase()),
        }
    }

    /// queued or executing
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Configuring | Self::Running)
    }

    /// A job that is active or not yet visible to the accounting has to be polled again
    pub fn keeps_polling(&self) -> bool {
        self.is_active() || *self == Self::Unknown
    }

    /// nothing will change anymore, unrecognized states count as final
    pub fn is_final(&self) -> bool {
        !self.keeps_polling()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Configuring => "CONFIGURING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
