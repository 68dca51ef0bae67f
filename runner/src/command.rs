mod builder;
mod options;


pub use builder::{build_run_command, build_submit_command, quote};
pub use options::{default_options, Nice, SchedulerOptions, COMMAND_ONLY_KEYS};
