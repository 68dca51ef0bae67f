use super::{ExecutionMode, JobDescriptor};
use crate::{
    args::{ConfigMap, ConfigValue},
    command::Nice,
    config::ConfigErrors,
    testing::Fixture,
};
use std::{path::PathBuf, time::Duration};

#[test]
pub fn option_precedence() {
    let fixture = Fixture::new();
    let args: ConfigMap = [("cores", 2i64), ("time_hours", 4i64)].into_iter().collect();

    let descriptor = JobDescriptor::builder("prec", &fixture.script)
        .log_file(Some(fixture.log_file.clone()))
        .args(args)
        .set("cores", 8i64)
        .build()
        .unwrap();

    let options = descriptor.options();
    assert_eq!(options.cores, 8);
    assert_eq!(options.time_limit, Duration::from_secs(4 * 3600));
    assert_eq!(options.partition, "normal");
    assert_eq!(options.nice, Nice::Value(0));
}

#[test]
pub fn defaults_keep_their_position() {
    let fixture = Fixture::new();
    let args: ConfigMap = [
        ("foo", ConfigValue::Int(1)),
        ("cores", ConfigValue::Int(4)),
    ]
    .into_iter()
    .collect();

    let descriptor = JobDescriptor::builder("order", &fixture.script)
        .mode(ExecutionMode::Local)
        .args(args)
        .build()
        .unwrap();

    let config = descriptor.script_config();
    let keys: Vec<&str> = config.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["nice", "time_hours", "cores", "partition", "foo"]);
}

#[test]
pub fn missing_script_fails_fast() {
    let result = JobDescriptor::builder("missing", "/nonexistent/run.py")
        .mode(ExecutionMode::Local)
        .build();

    assert!(matches!(result, Err(ConfigErrors::FileNotFound(path)) if path == PathBuf::from("/nonexistent/run.py")));
}

#[test]
pub fn empty_name_is_rejected() {
    let fixture = Fixture::new();
    let result = JobDescriptor::builder("  ", &fixture.script)
        .mode(ExecutionMode::Local)
        .build();

    assert!(matches!(result, Err(ConfigErrors::EmptyJobName)));
}

#[test]
pub fn scheduled_job_requires_log_file() {
    let fixture = Fixture::new();
    let result = JobDescriptor::builder("nolog", &fixture.script).build();

    assert!(matches!(
        result,
        Err(ConfigErrors::MissingOption("log_file"))
    ));
}

#[test]
pub fn logfile_argument_is_used_as_log_path() {
    let fixture = Fixture::new();
    let mut args = ConfigMap::new();
    args.insert("logfile", fixture.log_file.to_string_lossy().to_string());

    let descriptor = JobDescriptor::builder("fromargs", &fixture.script)
        .args(args)
        .build()
        .unwrap();

    assert_eq!(descriptor.log_file(), Some(fixture.log_file.as_path()));
    assert!(descriptor.submit_command().is_some());
}

#[test]
pub fn invalid_option_types_are_rejected() {
    let fixture = Fixture::new();

    let result = JobDescriptor::builder("badcores", &fixture.script)
        .mode(ExecutionMode::Local)
        .set("cores", "four")
        .build();
    assert!(matches!(
        result,
        Err(ConfigErrors::InvalidOption { ref key, .. }) if key == "cores"
    ));

    let result = JobDescriptor::builder("badtime", &fixture.script)
        .mode(ExecutionMode::Local)
        .set("time_hours", 0i64)
        .build();
    assert!(matches!(
        result,
        Err(ConfigErrors::InvalidOption { ref key, .. }) if key == "time_hours"
    ));
}

#[test]
pub fn unsupported_argument_fails_construction() {
    let fixture = Fixture::new();
    let args: ConfigMap = serde_yaml::from_str("nested:\n  a: 1\n").unwrap();

    let result = JobDescriptor::builder("nested", &fixture.script)
        .mode(ExecutionMode::Local)
        .args(args)
        .build();

    assert!(matches!(result, Err(ConfigErrors::UnsupportedValue(_))));
}

#[test]
pub fn local_job_has_no_submit_command() {
    let fixture = Fixture::new();
    let descriptor = fixture.local();

    assert_eq!(descriptor.mode(), ExecutionMode::Local);
    assert_eq!(descriptor.submit_command(), None);
    assert!(descriptor.run_command().starts_with("python3 "));
}

#[test]
pub fn script_without_interpreter_must_be_executable() {
    let fixture = Fixture::new();

    let result = JobDescriptor::builder("direct", &fixture.script)
        .mode(ExecutionMode::Local)
        .interpreter("")
        .build();

    assert!(matches!(result, Err(ConfigErrors::NotExecutable(_))));
}
