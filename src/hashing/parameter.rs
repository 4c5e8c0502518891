use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Custom check run after coercion and before the bounds checks.
pub type Validator = fn(&ParamValue) -> Result<(), String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Invalid value for parameter {name}: {value}")]
    Invalid { name: String, value: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Length of parameter {name} cannot be less than {min}: {value}")]
    TooShort {
        name: String,
        min: usize,
        value: ParamValue,
    },

    #[error("Length of parameter {name} cannot be greater than {max}: {value}")]
    TooLong {
        name: String,
        max: usize,
        value: ParamValue,
    },

    #[error("Value of parameter {name} cannot be less than {min}: {value}")]
    TooSmall {
        name: String,
        min: i64,
        value: ParamValue,
    },

    #[error("Value of parameter {name} cannot be greater than {max}: {value}")]
    TooLarge {
        name: String,
        max: i64,
        value: ParamValue,
    },
}

/// Native setting a request property maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Setting {
    Salt,
    SaltSize,
    Rounds,
    MemoryCost,
    Parallelism,
    DigestSize,
    BlockSize,
    Ident,
    User,
    Algs,
    Encoding,
    Variant,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Salt => "salt",
            Setting::SaltSize => "salt_size",
            Setting::Rounds => "rounds",
            Setting::MemoryCost => "memory_cost",
            Setting::Parallelism => "parallelism",
            Setting::DigestSize => "digest_size",
            Setting::BlockSize => "block_size",
            Setting::Ident => "ident",
            Setting::User => "user",
            Setting::Algs => "algs",
            Setting::Encoding => "encoding",
            Setting::Variant => "variant",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coercion applied to the raw property value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Text,
    TextList,
}

impl ParamKind {
    /// Coerce a raw JSON value, returning `None` when it has the wrong shape.
    pub fn coerce(&self, raw: &Value) -> Option<ParamValue> {
        match self {
            ParamKind::Integer => coerce_integer(raw).map(ParamValue::Integer),
            ParamKind::Text => match raw {
                Value::String(s) => Some(ParamValue::Text(s.clone())),
                Value::Number(n) => Some(ParamValue::Text(n.to_string())),
                _ => None,
            },
            ParamKind::TextList => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>()
                    .map(ParamValue::TextList),
                Value::String(s) => Some(ParamValue::TextList(
                    s.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_owned)
                        .collect(),
                )),
                _ => None,
            },
        }
    }
}

/// Accepts JSON integers, integral floats and integer strings.
pub fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strict truth-value vocabulary for string booleans.
pub fn parse_truth_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
    TextList(Vec<String>),
}

impl ParamValue {
    fn len(&self) -> Option<usize> {
        match self {
            ParamValue::Integer(_) => None,
            ParamValue::Text(s) => Some(s.chars().count()),
            ParamValue::TextList(items) => Some(items.len()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(n) => write!(f, "{n}"),
            ParamValue::Text(s) => write!(f, "{s:?}"),
            ParamValue::TextList(items) => write!(f, "{items:?}"),
        }
    }
}

/// Declarative description of one scheme parameter
#[derive(Debug, Clone, Copy)]
pub struct HashParameter {
    pub setting: Setting,
    pub kind: ParamKind,
    pub validator: Option<Validator>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
}

impl HashParameter {
    pub const fn new(setting: Setting, kind: ParamKind) -> Self {
        Self {
            setting,
            kind,
            validator: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
        }
    }

    pub const fn integer(setting: Setting) -> Self {
        Self::new(setting, ParamKind::Integer)
    }

    pub const fn text(setting: Setting) -> Self {
        Self::new(setting, ParamKind::Text)
    }

    pub const fn text_list(setting: Setting) -> Self {
        Self::new(setting, ParamKind::TextList)
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    pub const fn min_value(mut self, min: i64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub const fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Coerce, run the custom validator, then check length and value bounds.
    pub fn validate(&self, name: &str, raw: &Value) -> Result<ParamValue, ParameterError> {
        let value = self
            .kind
            .coerce(raw)
            .ok_or_else(|| ParameterError::Invalid {
                name: name.to_string(),
                value: raw.to_string(),
            })?;

        if let Some(validator) = self.validator {
            validator(&value).map_err(ParameterError::Rejected)?;
        }

        if let Some(len) = value.len() {
            if let Some(min) = self.min_length {
                if len < min {
                    return Err(ParameterError::TooShort {
                        name: name.to_string(),
                        min,
                        value,
                    });
                }
            }
            if let Some(max) = self.max_length {
                if len > max {
                    return Err(ParameterError::TooLong {
                        name: name.to_string(),
                        max,
                        value,
                    });
                }
            }
        }

        if let Some(n) = value.as_integer() {
            if let Some(min) = self.min_value {
                if n < min {
                    return Err(ParameterError::TooSmall {
                        name: name.to_string(),
                        min,
                        value,
                    });
                }
            }
            if let Some(max) = self.max_value {
                if n > max {
                    return Err(ParameterError::TooLarge {
                        name: name.to_string(),
                        max,
                        value,
                    });
                }
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROUNDS: HashParameter = HashParameter::integer(Setting::Rounds).range(1, 32);
    const SALT: HashParameter = HashParameter::text(Setting::Salt).length(2, 2);

    fn reject_all(_: &ParamValue) -> Result<(), String> {
        Err("nope".to_string())
    }

    #[test]
    fn test_integer_coercion_accepts_strings() {
        assert_eq!(
            ROUNDS.validate("Rounds", &json!("12")).unwrap(),
            ParamValue::Integer(12)
        );
        assert_eq!(
            ROUNDS.validate("Rounds", &json!(12.0)).unwrap(),
            ParamValue::Integer(12)
        );
    }

    #[test]
    fn test_invalid_type_names_parameter() {
        let err = ROUNDS.validate("Rounds", &json!("lots")).unwrap_err();
        assert_eq!(err.to_string(), r#"Invalid value for parameter Rounds: "lots""#);

        let err = ROUNDS.validate("Rounds", &json!([1])).unwrap_err();
        assert!(matches!(err, ParameterError::Invalid { .. }));
    }

    #[test]
    fn test_value_bounds() {
        let err = ROUNDS.validate("Rounds", &json!(-1000)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value of parameter Rounds cannot be less than 1: -1000"
        );

        let err = ROUNDS.validate("Rounds", &json!(33)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value of parameter Rounds cannot be greater than 32: 33"
        );
    }

    #[test]
    fn test_length_bounds() {
        let err = SALT.validate("Salt", &json!("a")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Length of parameter Salt cannot be less than 2: "a""#
        );
        let err = SALT.validate("Salt", &json!("abc")).unwrap_err();
        assert!(matches!(err, ParameterError::TooLong { max: 2, .. }));
        assert!(SALT.validate("Salt", &json!("ab")).is_ok());
    }

    #[test]
    fn test_validator_runs_before_bounds() {
        let param = SALT.validator(reject_all);
        let err = param.validate("Salt", &json!("abc")).unwrap_err();
        assert_eq!(err, ParameterError::Rejected("nope".to_string()));
    }

    #[test]
    fn test_text_list_coercion() {
        let param = HashParameter::text_list(Setting::Algs);
        assert_eq!(
            param.validate("Algs", &json!("sha-1, sha-256")).unwrap(),
            ParamValue::TextList(vec!["sha-1".into(), "sha-256".into()])
        );
        assert!(param.validate("Algs", &json!([1, 2])).is_err());
    }

    #[test]
    fn test_truth_values() {
        assert_eq!(parse_truth_value("Yes"), Some(true));
        assert_eq!(parse_truth_value("off"), Some(false));
        assert_eq!(parse_truth_value("maybe"), None);
    }
}
