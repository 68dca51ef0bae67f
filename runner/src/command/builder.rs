use super::SchedulerOptions;
use crate::{config::ConfigErrors, executors::slurm::format_walltime, job::JobDescriptor};
use itertools::Itertools;
use std::borrow::Cow;

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_./:@=,+%".contains(c)
}

/// Quote a token for `sh` if it contains anything besides plain word characters
///
/// Double quotes are used so the result can be embedded into the single quoted `--wrap` payload.
pub fn quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && token.chars().all(is_shell_safe) {
        return Cow::Borrowed(token);
    }

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');

    Cow::Owned(quoted)
}

/// Command that runs the job script on the current host
///
/// Layout: `[module preamble] [interpreter] <script> <args...>`
pub fn build_run_command(descriptor: &JobDescriptor, args: &[String]) -> String {
    let script = descriptor.script().to_string_lossy();

    let line = [
        Cow::Borrowed(descriptor.options().module_string.trim()),
        Cow::Borrowed(descriptor.interpreter().trim()),
        quote(&script),
    ]
    .into_iter()
    .chain(args.iter().map(|arg| quote(arg)))
    .filter(|part| !part.is_empty())
    .join(" ");
    line
}

/// `sbatch` invocation that wraps `run_command`
///
/// stdout and stderr are both appended to the job log file, which therefore has to be set.
pub fn build_submit_command(
    descriptor: &JobDescriptor,
    run_command: &str,
    options: &SchedulerOptions,
) -> Result<String, ConfigErrors> {
    let log_file = descriptor
        .log_file()
        .ok_or(ConfigErrors::MissingOption("log_file"))?
        .to_string_lossy();
    let log_file = quote(&log_file);

    let mut parts = vec![
        "sbatch".to_string(),
        format!("-J {}", quote(descriptor.name())),
        format!("-o {log_file}"),
        format!("-e {log_file}"),
        format!("--wrap='{}'", run_command.replace('\'', r"'\''")),
        options.nice.to_flag(),
    ];

    if !options.node_cmd.trim().is_empty() {
        parts.push(options.node_cmd.trim().to_string());
    }

    parts.extend([
        "--open-mode=append".to_string(),
        format!("--cpus-per-task={}", options.cores),
        format!("--partition={}", quote(&options.partition)),
        format!("-t {}", format_walltime(&options.time_limit)),
    ]);

    Ok(parts.join(" "))
}
