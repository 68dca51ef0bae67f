use crate::{
    args::{encode, ConfigMap, ConfigValue},
    command::{
        build_run_command, build_submit_command, default_options, SchedulerOptions,
        COMMAND_ONLY_KEYS,
    },
    config::{check_executable, ConfigErrors},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// submit through `sbatch`
    #[default]
    Scheduled,
    /// run directly on the current host
    Local,
}

/// Everything needed to run one job, validated on construction and immutable afterwards
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    name: String,
    script: PathBuf,
    interpreter: String,
    config: ConfigMap,
    mode: ExecutionMode,
    log_file: Option<PathBuf>,
    options: SchedulerOptions,
    run_command: String,
    submit_command: Option<String>,
}

impl JobDescriptor {
    pub fn builder(name: impl Into<String>, script: impl Into<PathBuf>) -> JobDescriptorBuilder {
        JobDescriptorBuilder {
            name: name.into(),
            script: script.into(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            args: ConfigMap::new(),
            overrides: ConfigMap::new(),
            mode: ExecutionMode::default(),
            log_file: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// merged configuration: defaults, then user arguments, then explicit overrides
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// the part of the configuration that is forwarded to the script
    pub fn script_config(&self) -> ConfigMap {
        self.config.without(&COMMAND_ONLY_KEYS)
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn run_command(&self) -> &str {
        &self.run_command
    }

    /// `None` for local jobs
    pub fn submit_command(&self) -> Option<&str> {
        self.submit_command.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct JobDescriptorBuilder {
    name: String,
    script: PathBuf,
    interpreter: String,
    args: ConfigMap,
    overrides: ConfigMap,
    mode: ExecutionMode,
    log_file: Option<PathBuf>,
}

impl JobDescriptorBuilder {
    /// user supplied configuration, overrides the scheduler defaults
    pub fn args(mut self, args: ConfigMap) -> Self {
        self.args = args;
        self
    }

    /// explicit overrides, take precedence over everything else
    pub fn overrides(mut self, overrides: ConfigMap) -> Self {
        self.overrides.merge(&overrides);
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.overrides.insert(key, value);
        self
    }

    /// an empty interpreter executes the script directly
    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn build(self) -> Result<JobDescriptor, ConfigErrors> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ConfigErrors::EmptyJobName);
        }

        if !self.script.is_file() {
            return Err(ConfigErrors::FileNotFound(self.script));
        }
        if self.interpreter.trim().is_empty() && !check_executable(&self.script)? {
            return Err(ConfigErrors::NotExecutable(self.script));
        }

        let mut config = default_options();
        config.merge(&self.args);
        config.merge(&self.overrides);

        // a `logfile` entry in the user arguments doubles as the log path
        let log_file = self.log_file.or_else(|| match config.get("logfile") {
            Some(ConfigValue::Str(path)) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => None,
        });

        if self.mode == ExecutionMode::Scheduled && log_file.is_none() {
            return Err(ConfigErrors::MissingOption("log_file"));
        }

        let options = SchedulerOptions::from_config(&config)?;

        let mut descriptor = JobDescriptor {
            name,
            script: self.script,
            interpreter: self.interpreter,
            config,
            mode: self.mode,
            log_file,
            options,
            run_command: String::new(),
            submit_command: None,
        };

        let args = encode(&descriptor.script_config())?;
        debug!(args = ?args, "Encoded job arguments");

        descriptor.run_command = build_run_command(&descriptor, &args);
        debug!(command = %descriptor.run_command, "Built run command");

        if descriptor.mode == ExecutionMode::Scheduled {
            let submit_command =
                build_submit_command(&descriptor, &descriptor.run_command, &descriptor.options)?;
            debug!(command = %submit_command, "Built submit command");
            descriptor.submit_command = Some(submit_command);
        }

        Ok(descriptor)
    }
}
