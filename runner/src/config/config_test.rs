use super::{parse_override, ConfigErrors, JobFile};
use crate::{
    args::{ConfigMap, ConfigValue},
    job::ExecutionMode,
    testing::Fixture,
};

fn job_file(fixture: &Fixture, extra: &str) -> String {
    format!(
        "name: test\nscript: {}\nlog_file: {}\n{extra}",
        fixture.script.display(),
        fixture.log_file.display()
    )
}

#[test]
pub fn minimal_job_file() {
    let fixture = Fixture::new();
    let file = JobFile::from_yaml(&job_file(&fixture, "")).unwrap();

    assert_eq!(file.interpreter, "python3");
    assert_eq!(file.mode, ExecutionMode::Scheduled);
    assert!(!file.verbose);
    assert!(file.args.is_empty());
    assert!(!file.preflight_checks());
}

#[test]
pub fn args_keep_file_order() {
    let fixture = Fixture::new();
    let file = JobFile::from_yaml(&job_file(
        &fixture,
        "args:\n  zebra: 1\n  apple: [a, b]\n  flag: true\n",
    ))
    .unwrap();

    let keys: Vec<&str> = file.args.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["zebra", "apple", "flag"]);
}

#[test]
pub fn unknown_fields_are_rejected() {
    let fixture = Fixture::new();
    let result = JobFile::from_yaml(&job_file(&fixture, "walltime: 3\n"));

    assert!(matches!(result, Err(ConfigErrors::InvalidJobFile(_))));
}

#[test]
pub fn logfile_alias() {
    let fixture = Fixture::new();
    let content = format!(
        "name: test\nscript: {}\nlogfile: {}\nmode: local\n",
        fixture.script.display(),
        fixture.log_file.display()
    );
    let file = JobFile::from_yaml(&content).unwrap();

    assert_eq!(file.log_file.as_deref(), Some(fixture.log_file.as_path()));
    assert_eq!(file.mode, ExecutionMode::Local);
}

#[test]
pub fn preflight_reports_problems() {
    let content = "name: ''\nscript: /nonexistent/run.py\nargs:\n  nested:\n    a: 1\n";
    let file = JobFile::from_yaml(content).unwrap();

    assert!(file.preflight_checks());
}

#[test]
pub fn extra_overrides_win() {
    let fixture = Fixture::new();
    let file = JobFile::from_yaml(&job_file(
        &fixture,
        "args:\n  cores: 2\noverrides:\n  cores: 4\n",
    ))
    .unwrap();

    let mut extra = ConfigMap::new();
    extra.insert("cores", 16i64);
    let descriptor = file.clone().into_descriptor(&extra).unwrap();
    assert_eq!(descriptor.options().cores, 16);

    let descriptor = file.into_descriptor(&ConfigMap::new()).unwrap();
    assert_eq!(descriptor.options().cores, 4);
}

#[test]
pub fn override_parsing() {
    assert_eq!(
        parse_override("cores=4").unwrap(),
        ("cores".to_string(), ConfigValue::Int(4))
    );
    assert_eq!(
        parse_override("verbose=true").unwrap(),
        ("verbose".to_string(), ConfigValue::Bool(true))
    );
    assert_eq!(
        parse_override("partition=gpu").unwrap(),
        ("partition".to_string(), ConfigValue::from("gpu"))
    );
    assert_eq!(
        parse_override("expr=a=b").unwrap(),
        ("expr".to_string(), ConfigValue::from("a=b"))
    );
    assert_eq!(
        parse_override("name=").unwrap(),
        ("name".to_string(), ConfigValue::from(""))
    );
    assert!(matches!(
        parse_override("novalue"),
        Err(ConfigErrors::InvalidOverride(_))
    ));
    assert!(matches!(
        parse_override("=4"),
        Err(ConfigErrors::InvalidOverride(_))
    ));
}
