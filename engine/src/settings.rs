use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{AgentError, Result};

/// A flat `key=value` settings file: whitespace is stripped from every
/// line, blank lines and `;`-comments are skipped, and a later assignment
/// to the same key overwrites an earlier one.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for (line_no, raw_line) in text.lines().enumerate() {
            let stripped: String = raw_line.chars().filter(|c| !c.is_whitespace()).collect();
            if stripped.is_empty() || stripped.starts_with(';') {
                continue;
            }
            let eq = stripped.find('=').ok_or_else(|| AgentError::ConfigParse {
                line_no: line_no + 1,
                line: raw_line.to_string(),
            })?;
            let key = stripped[..eq].to_string();
            let value = stripped[eq + 1..].to_string();
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn get_string(&self, key: &str, strict: bool) -> Result<String> {
        match self.values.get(key) {
            Some(v) => Ok(v.clone()),
            None if strict => Err(AgentError::MissingStrictSetting {
                key: key.to_string(),
            }),
            None => Ok(String::new()),
        }
    }

    pub fn get_bool(&self, key: &str, strict: bool) -> Result<bool> {
        match self.values.get(key) {
            Some(v) => Ok(v == "1"),
            None if strict => Err(AgentError::MissingStrictSetting {
                key: key.to_string(),
            }),
            None => Ok(false),
        }
    }

    pub fn get_int(&self, key: &str, strict: bool) -> Result<i64> {
        match self.values.get(key) {
            Some(v) => v.parse().map_err(|_| AgentError::NumericFailure {
                detail: format!("setting {key} is not an integer: {v}"),
            }),
            None if strict => Err(AgentError::MissingStrictSetting {
                key: key.to_string(),
            }),
            None => Ok(-1),
        }
    }

    pub fn get_float(&self, key: &str, strict: bool) -> Result<f64> {
        match self.values.get(key) {
            Some(v) => v.parse().map_err(|_| AgentError::NumericFailure {
                detail: format!("setting {key} is not a number: {v}"),
            }),
            None if strict => Err(AgentError::MissingStrictSetting {
                key: key.to_string(),
            }),
            None => Ok(-1.0),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_duplicate_key_wins() {
        let s = Settings::parse(";comment\nk = 1\nk=2\n").unwrap();
        assert_eq!(s.get_int("k", true).unwrap(), 2);
    }

    #[test]
    fn missing_strict_key_is_fatal() {
        let s = Settings::parse("a=1\n").unwrap();
        assert!(matches!(
            s.get_int("b", true),
            Err(AgentError::MissingStrictSetting { .. })
        ));
    }

    #[test]
    fn missing_non_strict_key_yields_typed_default() {
        let s = Settings::parse("a=1\n").unwrap();
        assert_eq!(s.get_bool("flag", false).unwrap(), false);
        assert_eq!(s.get_int("n", false).unwrap(), -1);
        assert_eq!(s.get_float("x", false).unwrap(), -1.0);
        assert_eq!(s.get_string("s", false).unwrap(), "");
    }

    #[test]
    fn missing_equals_sign_is_a_parse_error() {
        let err = Settings::parse("not_an_assignment\n").unwrap_err();
        assert!(matches!(err, AgentError::ConfigParse { .. }));
    }

    #[test]
    fn boolean_is_true_only_for_literal_one() {
        let s = Settings::parse("a=1\nb=0\nc=true\n").unwrap();
        assert!(s.get_bool("a", true).unwrap());
        assert!(!s.get_bool("b", true).unwrap());
        assert!(!s.get_bool("c", true).unwrap());
    }

    #[test]
    fn whitespace_anywhere_is_stripped() {
        let s = Settings::parse("  sarsa _ alpha =  0.1 \n").unwrap();
        assert_eq!(s.get_float("sarsa_alpha", true).unwrap(), 0.1);
    }
}
