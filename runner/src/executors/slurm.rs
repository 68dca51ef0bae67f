//! Text protocol of the Slurm command line tools

use super::HostExecutor;
use crate::job::JobStatus;
use std::time::Duration;
use tracing::{debug, warn};

/// Cluster wide CPU summary, prints `allocated/idle/other/total`
pub const SINFO_CPUS_COMMAND: &str = "sinfo -h -o %C";

/// Status of a job whose accounting query failed without any output
pub const SACCT_FAILED: &str = "SACCT_FAILED";

/// Format a duration as a Slurm time string, e.g. 01:05:02
///
/// Hours are not folded into days, `-t 36:00:00` is accepted by `sbatch`.
pub fn format_walltime(duration: &Duration) -> String {
    let mut seconds = duration.as_secs();
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// The job id is the last token of `Submitted batch job <id>`
pub fn parse_job_id(output: &str) -> Option<&str> {
    output.split_whitespace().last()
}

/// Accounting query for a single job, one pipe separated record per job step
pub fn sacct_command(job_id: &str) -> String {
    format!("sacct -n -P -j {job_id} --noconvert --format=State,Elapsed,MaxRSS,NCPUS,JobName")
}

/// State of the first record of a `sacct -P` answer, an empty answer means the job is unknown
pub fn parse_sacct_state(output: &str) -> JobStatus {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split('|').next())
        .map(JobStatus::parse)
        .unwrap_or(JobStatus::Unknown)
}

/// State reported for a job whose accounting query failed
///
/// The first field of the error text is kept as an unrecognized, and therefore final, state so
/// the wait loop ends instead of polling a broken `sacct` forever.
pub fn failed_sacct_state(output: &str) -> JobStatus {
    let raw = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split('|').next())
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .unwrap_or(SACCT_FAILED);

    JobStatus::Other(raw.to_uppercase())
}

/// Total CPU count from `sinfo -o %C`
pub fn parse_total_cpus(output: &str) -> Option<u32> {
    output.trim().rsplit('/').next()?.trim().parse().ok()
}

/// Number of CPUs in the cluster, 1 if the scheduler cannot be asked
pub fn max_cluster_cpus<E: HostExecutor>(executor: &E) -> u32 {
    let output = match executor.execute(SINFO_CPUS_COMMAND) {
        Ok(output) => output,
        Err(error) => {
            warn!(error = ?error, "Failed to query cluster CPUs, assuming one");
            return 1;
        }
    };

    match parse_total_cpus(&output.text) {
        Some(total) if output.success() && total > 0 => {
            debug!(total = total, "Cluster CPU count");
            total
        }
        _ => {
            warn!(output = %output.text, "Unexpected sinfo output, assuming one CPU");
            1
        }
    }
}
