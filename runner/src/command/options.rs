use crate::{
    args::{ConfigMap, ConfigValue},
    config::ConfigErrors,
};
use std::time::Duration;

/// Keys that only shape the command lines and are never forwarded to the job script
pub const COMMAND_ONLY_KEYS: [&str; 2] = ["module_string", "node_cmd"];

/// Scheduler defaults, these have the lowest precedence when merging
pub fn default_options() -> ConfigMap {
    let mut defaults = ConfigMap::new();
    defaults.insert("nice", false);
    defaults.insert("time_hours", 1i64);
    defaults.insert("module_string", "");
    defaults.insert("node_cmd", "");
    defaults.insert("cores", 1i64);
    defaults.insert("partition", "normal");
    defaults
}

/// Priority adjustment handed to `sbatch --nice`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nice {
    /// bare `--nice`, the scheduler picks its default adjustment
    Default,
    Value(i64),
}

impl Nice {
    pub fn to_flag(self) -> String {
        match self {
            Self::Default => "--nice".to_string(),
            Self::Value(value) => format!("--nice={value}"),
        }
    }
}

/// Typed view of the scheduler related entries of a merged configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    pub nice: Nice,
    pub time_limit: Duration,
    pub cores: u32,
    pub partition: String,
    /// raw extra arguments spliced into the `sbatch` call
    pub node_cmd: String,
    /// shell preamble run before the interpreter, e.g. `module load python;`
    pub module_string: String,
}

fn invalid(key: &str, expected: &'static str) -> ConfigErrors {
    ConfigErrors::InvalidOption {
        key: key.to_string(),
        expected,
    }
}

fn required<'a>(config: &'a ConfigMap, key: &'static str) -> Result<&'a ConfigValue, ConfigErrors> {
    config.get(key).ok_or(ConfigErrors::MissingOption(key))
}

fn string_option(config: &ConfigMap, key: &'static str) -> Result<String, ConfigErrors> {
    match required(config, key)? {
        ConfigValue::Str(value) => Ok(value.clone()),
        _ => Err(invalid(key, "a string")),
    }
}

impl SchedulerOptions {
    pub fn from_config(config: &ConfigMap) -> Result<Self, ConfigErrors> {
        let nice = match required(config, "nice")? {
            ConfigValue::Bool(false) => Nice::Value(0),
            ConfigValue::Bool(true) => Nice::Default,
            ConfigValue::Int(value) => Nice::Value(*value),
            _ => return Err(invalid("nice", "a boolean or an integer")),
        };

        let hours = match required(config, "time_hours")? {
            ConfigValue::Int(hours) if *hours > 0 => *hours as f64,
            ConfigValue::Float(hours) if hours.is_finite() && *hours > 0.0 => *hours,
            _ => return Err(invalid("time_hours", "a positive number of hours")),
        };

        let cores = match required(config, "cores")? {
            ConfigValue::Int(cores) if *cores > 0 => {
                u32::try_from(*cores).map_err(|_| invalid("cores", "a positive integer"))?
            }
            _ => return Err(invalid("cores", "a positive integer")),
        };

        let partition = string_option(config, "partition")?;
        if partition.trim().is_empty() {
            return Err(invalid("partition", "a non-empty string"));
        }

        Ok(Self {
            nice,
            // whole seconds are enough for HH:MM:SS
            time_limit: Duration::from_secs((hours * 3600.0).round() as u64),
            cores,
            partition,
            node_cmd: string_option(config, "node_cmd")?,
            module_string: string_option(config, "module_string")?,
        })
    }
}
