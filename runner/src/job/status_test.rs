use super::{ExecutionMode, JobHandle, JobStatus};

#[test]
pub fn parse_known_states() {
    assert_eq!(JobStatus::parse("PENDING"), JobStatus::Pending);
    assert_eq!(JobStatus::parse("configuring"), JobStatus::Configuring);
    assert_eq!(JobStatus::parse(" Running "), JobStatus::Running);
    assert_eq!(JobStatus::parse("COMPLETED"), JobStatus::Completed);
    assert_eq!(JobStatus::parse("FAILED"), JobStatus::Failed);
    assert_eq!(JobStatus::parse("CANCELLED by 4021"), JobStatus::Cancelled);
    assert_eq!(JobStatus::parse(""), JobStatus::Unknown);
}

#[test]
pub fn unrecognized_states_are_kept_and_final() {
    let status = JobStatus::parse("node_fail");

    assert_eq!(status, JobStatus::Other("NODE_FAIL".to_string()));
    assert_eq!(status.to_string(), "NODE_FAIL");
    assert!(status.is_final());
}

#[test]
pub fn polling_states() {
    for status in [
        JobStatus::Pending,
        JobStatus::Configuring,
        JobStatus::Running,
        JobStatus::Unknown,
    ] {
        assert!(status.keeps_polling(), "{status} should keep polling");
    }

    for status in [
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
        JobStatus::Other("TIMEOUT".to_string()),
    ] {
        assert!(status.is_final(), "{status} should be final");
        assert!(!status.is_active());
    }
}

#[test]
pub fn final_status_is_never_replaced() {
    let mut handle = JobHandle::attach("1");

    handle.record_status(JobStatus::Unknown);
    handle.record_status(JobStatus::Running);
    assert_eq!(handle.last_status(), Some(&JobStatus::Running));

    handle.record_status(JobStatus::Completed);
    handle.record_status(JobStatus::Running);
    assert_eq!(handle.last_status(), Some(&JobStatus::Completed));
}

#[test]
pub fn active_status_does_not_fall_back_to_unknown() {
    let mut handle = JobHandle::attach("1");

    handle.record_status(JobStatus::Running);
    handle.record_status(JobStatus::Unknown);
    assert_eq!(handle.last_status(), Some(&JobStatus::Running));

    handle.record_status(JobStatus::Pending);
    assert_eq!(handle.last_status(), Some(&JobStatus::Pending));
    handle.record_status(JobStatus::Failed);
    assert_eq!(handle.last_status(), Some(&JobStatus::Failed));
}

#[test]
pub fn new_handle_is_not_submitted() {
    let handle = JobHandle::new(ExecutionMode::Scheduled);

    assert!(!handle.is_submitted());
    assert!(!handle.submission_failed());
    assert_eq!(handle.job_id(), None);
    assert_eq!(handle.raw_response(), None);
    assert!(handle.ensure_submitted().is_err());
}
