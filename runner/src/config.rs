use crate::{
    args::{ConfigMap, ConfigValue, EncodeError},
    job::{ExecutionMode, JobDescriptor, DEFAULT_INTERPRETER},
};
use serde::Deserialize;
use std::{
    fs::File,
    io::Error,
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, warn};

#[cfg(test)]
mod config_test;

// check if a file is executable
pub fn check_executable(path: &Path) -> Result<bool, ConfigErrors> {
    if !path.is_file() {
        Err(ConfigErrors::FileNotFound(path.to_path_buf()))
    } else {
        match File::open(path).map(|file| file.metadata()) {
            Ok(Ok(metadata)) => Ok((metadata.mode() & 0o111) != 0),
            Ok(Err(e)) | Err(e) => Err(ConfigErrors::MetadataNotFound(e)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Job name must not be empty")]
    EmptyJobName,
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Script {0} is not executable and no interpreter is set")]
    NotExecutable(PathBuf),
    #[error("Metadata not found")]
    MetadataNotFound(#[from] Error),
    #[error("Required option `{0}` is missing")]
    MissingOption(&'static str),
    #[error("Option `{key}` must be {expected}")]
    InvalidOption { key: String, expected: &'static str },
    #[error("Override `{0}` is not of the form KEY=VALUE")]
    InvalidOverride(String),
    #[error("Failed to read job file {path}")]
    ReadJobFile { path: PathBuf, source: Error },
    #[error("Job file is invalid")]
    InvalidJobFile(#[from] serde_yaml::Error),
    #[error("Job arguments cannot be encoded")]
    UnsupportedValue(#[from] EncodeError),
    #[error("Failed to open log file {path}")]
    LogFile { path: PathBuf, source: Error },
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

/// YAML description of a single job
#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub name: String,
    pub script: PathBuf,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(alias = "logfile")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
    // user arguments, forwarded to the script and merged over the scheduler defaults
    #[serde(default)]
    pub args: ConfigMap,
    // explicit overrides with the highest precedence
    #[serde(default)]
    pub overrides: ConfigMap,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigErrors::ReadJobFile {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigErrors> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Report every problem at once instead of failing on the first one
    ///
    /// Returns true if the job file contains an error.
    pub fn preflight_checks(&self) -> bool {
        let mut contains_error = false;

        if self.name.trim().is_empty() {
            error!("name must not be empty");
            contains_error = true;
        }

        if !self.script.is_file() {
            error!(
                "Failed to find script. Either not a file or not found at {}",
                self.script.to_string_lossy()
            );
            contains_error = true;
        } else if self.interpreter.trim().is_empty() {
            match check_executable(&self.script) {
                Ok(true) => {}
                Ok(false) => {
                    error!(
                        "Script {} is not executable and interpreter is empty",
                        self.script.to_string_lossy()
                    );
                    contains_error = true;
                }
                Err(e) => {
                    error!(
                        "Failed to determine if {} is an executable: {e}",
                        self.script.to_string_lossy()
                    );
                    contains_error = true;
                }
            }
        }

        let has_logfile_arg = matches!(self.args.get("logfile"), Some(ConfigValue::Str(_)));
        if self.mode == ExecutionMode::Scheduled && self.log_file.is_none() && !has_logfile_arg {
            error!("log_file is required for scheduled jobs, sbatch output has to go somewhere");
            contains_error = true;
        }

        for (key, value) in self.args.iter().chain(self.overrides.iter()) {
            if let ConfigValue::Unsupported(_) = value {
                error!(
                    "Option {key} holds a {} which cannot be passed on the command line",
                    value.kind()
                );
                contains_error = true;
            }
        }

        if self.mode == ExecutionMode::Local && self.overrides.contains_key("partition") {
            warn!("partition is set but the job runs locally, it will be ignored by the scheduler");
        }

        contains_error
    }

    /// Build the descriptor, `extra` overrides win over everything in the file
    pub fn into_descriptor(self, extra: &ConfigMap) -> Result<JobDescriptor, ConfigErrors> {
        JobDescriptor::builder(self.name, self.script)
            .interpreter(self.interpreter)
            .mode(self.mode)
            .log_file(self.log_file)
            .args(self.args)
            .overrides(self.overrides)
            .overrides(extra.clone())
            .build()
    }
}

/// Parse a `KEY=VALUE` override, the value is read as a YAML scalar (`4`, `true`, `gpu`)
pub fn parse_override(input: &str) -> Result<(String, ConfigValue), ConfigErrors> {
    let (key, value) = input
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| ConfigErrors::InvalidOverride(input.to_string()))?;

    let value = if value.is_empty() {
        ConfigValue::Str(String::new())
    } else {
        // anything that is not a plain scalar or list is taken literally
        serde_yaml::from_str::<ConfigValue>(value)
            .ok()
            .filter(|parsed| !matches!(parsed, ConfigValue::Unsupported(_)))
            .unwrap_or_else(|| ConfigValue::Str(value.to_string()))
    };

    Ok((key.trim().to_string(), value))
}
