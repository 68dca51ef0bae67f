use super::{ConfigMap, ConfigValue};
use thiserror::Error;

/// Flag and value tokens in the order they are passed to the job script
pub type ArgumentSequence = Vec<String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Option `{key}` holds a {kind}, which has no command line representation")]
    UnsupportedValueType { key: String, kind: &'static str },
}

/// Render a float the way command line tools usually print them: `2.0`, `0.0001`, `1e+20`,
/// `1.5e-07`, `nan`, `inf`
///
/// Plain notation is used for decimal exponents in `-4..16`, scientific notation otherwise.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` yields the shortest mantissa that round-trips, e.g. `1.5e-7`
    let scientific = format!("{value:e}");
    match scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)))
    {
        Some((mantissa, exponent)) if !(-4..16).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        // debug formatting keeps the fractional part of whole floats (2.0, not 2)
        _ => format!("{value:?}"),
    }
}

/// Turn a configuration mapping into `--key value` tokens, keeping the mapping order
///
/// `true` becomes a bare `--key`, `false` is dropped, sequences become `--key a b c`.
pub fn encode(config: &ConfigMap) -> Result<ArgumentSequence, EncodeError> {
    let mut tokens = ArgumentSequence::with_capacity(config.len() * 2);

    for (key, value) in config.iter() {
        let flag = format!("--{key}");

        match value {
            ConfigValue::Bool(true) => tokens.push(flag),
            ConfigValue::Bool(false) => {}
            ConfigValue::Int(value) => tokens.extend([flag, value.to_string()]),
            ConfigValue::Float(value) => tokens.extend([flag, format_float(*value)]),
            ConfigValue::Str(value) => tokens.extend([flag, value.clone()]),
            ConfigValue::List(values) => {
                tokens.push(flag);
                tokens.extend(values.iter().cloned());
            }
            ConfigValue::Unsupported(_) => {
                return Err(EncodeError::UnsupportedValueType {
                    key: key.to_owned(),
                    kind: value.kind(),
                })
            }
        }
    }

    Ok(tokens)
}
