use clap::{Args, Parser, Subcommand};
use slurmlite::{
    args::ConfigMap,
    config::{parse_override, JobFile},
    executors::{slurm::max_cluster_cpus, ShellExecutor, StatusPoller},
    job::{ExecutionMode, JobHandle, JobOutput, JobStatus},
    logging::LogContext,
    session::{JobSession, DEFAULT_POLL_INTERVAL},
};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use tracing_unwrap::ResultExt;

#[derive(Parser, Debug)]
#[command(name = "slurmlite", version, about = "Submit a job to Slurm and follow it until it finished")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit the job described by a YAML job file
    Submit(SubmitOpts),
    /// Print the state of an already submitted job
    Status {
        job_id: String,
        /// print the whole accounting record instead of the state
        #[arg(long)]
        full: bool,
    },
    /// Print the number of CPUs in the cluster
    Cpus,
}

#[derive(Args, Debug)]
struct SubmitOpts {
    job_file: PathBuf,
    /// run on this host instead of submitting to the scheduler
    #[arg(long)]
    local: bool,
    /// block until the job finished and print its log
    #[arg(long)]
    wait: bool,
    /// seconds between two status queries while waiting
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval: u64,
    /// print the commands without running anything
    #[arg(long)]
    dry_run: bool,
    /// override a job option, takes precedence over the job file
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

fn exit_code(code: Option<i32>) -> ExitCode {
    match code {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}

fn submit(opts: SubmitOpts) -> ExitCode {
    let mut extra = ConfigMap::new();
    for item in &opts.overrides {
        match parse_override(item) {
            Ok((key, value)) => extra.insert(key, value),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut file = match JobFile::load(&opts.job_file) {
        Ok(file) => file,
        Err(e) => {
            error!(error = ?e, "Failed to load job file {}", opts.job_file.display());
            return ExitCode::FAILURE;
        }
    };
    if opts.local {
        file.mode = ExecutionMode::Local;
    }

    if file.preflight_checks() {
        error!("Job file {} contains errors", opts.job_file.display());
        return ExitCode::FAILURE;
    }

    let verbose = file.verbose;
    let descriptor = match file.into_descriptor(&extra) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!(error = ?e, "Invalid job: {e}");
            return ExitCode::FAILURE;
        }
    };

    if opts.dry_run {
        println!("{}", descriptor.run_command());
        if let Some(command) = descriptor.submit_command() {
            println!("{command}");
        }
        return ExitCode::SUCCESS;
    }

    let log = match LogContext::new(verbose, descriptor.log_file()) {
        Ok(log) => log,
        Err(e) => {
            error!(error = ?e, "Failed to set up logging: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = JobSession::new(descriptor).with_log_context(log);

    let handle = match session.run() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = ?e, "Failed to start job: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(outcome) = handle.local_outcome() {
        print!("{}", outcome.output);
        return exit_code(outcome.exit_code);
    }

    match handle.job_id() {
        Some(job_id) => println!("{job_id}"),
        None => {
            error!(
                response = handle.raw_response().unwrap_or_default(),
                "Submission failed"
            );
            return ExitCode::FAILURE;
        }
    }

    if !opts.wait {
        return ExitCode::SUCCESS;
    }

    match session.wait(Duration::from_secs(opts.poll_interval)) {
        Ok(JobOutput::Log(content)) => print!("{content}"),
        Ok(JobOutput::LogUnavailable(path)) => warn!("No output found at {}", path.display()),
        Ok(JobOutput::Local(outcome)) => print!("{}", outcome.output),
        Err(e) => {
            error!(error = ?e, "Failed to wait for job: {e}");
            return ExitCode::FAILURE;
        }
    }

    match session.handle().last_status() {
        Some(JobStatus::Completed) => ExitCode::SUCCESS,
        status => {
            info!(status = ?status, "Job did not complete successfully");
            ExitCode::FAILURE
        }
    }
}

fn status(job_id: String, full: bool) -> ExitCode {
    let poller = StatusPoller::new(ShellExecutor);
    let mut handle = JobHandle::attach(job_id);

    // an attached handle always counts as submitted
    if full {
        println!("{}", poller.full_status(&handle).unwrap_or_log());
    } else {
        println!("{}", poller.query_status(&mut handle).unwrap_or_log());
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Submit(opts) => submit(opts),
        Commands::Status { job_id, full } => status(job_id, full),
        Commands::Cpus => {
            println!("{}", max_cluster_cpus(&ShellExecutor));
            ExitCode::SUCCESS
        }
    }
}
