//! Contextual fields attached to loggers.

use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Value of a single contextual field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Str(value) if value.contains(char::is_whitespace) => {
                write!(f, "{value:?}")
            }
            FieldValue::Str(value) => f.write_str(value),
            FieldValue::I64(value) => write!(f, "{value}"),
            FieldValue::U64(value) => write!(f, "{value}"),
            FieldValue::F64(value) => write!(f, "{value}"),
            FieldValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Str(value.clone())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::I64(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::I64(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::U64(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::U64(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::U64(value as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::F64(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Ordered set of fields. Cloning is cheap and attaching a field never touches the original, so
/// loggers sharing a parent never observe each other's fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(Arc<Vec<(String, FieldValue)>>);

impl Fields {
    /// Returns a copy with the given field set. An existing field with the same key keeps its
    /// position, but takes the new value.
    pub fn with(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        let value = value.into();

        let mut fields = self.0.as_ref().clone();
        match fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value,
            None => fields.push((key, value)),
        }

        Self(Arc::new(fields))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Fields {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.iter()
                .format_with(" ", |(key, value), f| f(&format_args!("{key}={value}")))
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::field::{FieldValue, Fields};

    #[test]
    fn should_not_mutate_original() {
        let original = Fields::default().with("a", 1);
        let derived = original.with("b", true);

        assert_eq!(original.len(), 1);
        assert!(original.get("b").is_none());
        assert_eq!(derived.get("b"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn should_replace_existing_key_in_place() {
        let fields = Fields::default()
            .with("a", 1)
            .with("b", 2)
            .with("a", "x");

        assert_eq!(fields.to_string(), "a=x b=2");
    }

    #[test]
    fn should_quote_strings_with_whitespace() {
        let fields = Fields::default().with("sql_type", "select one");
        assert_eq!(fields.to_string(), "sql_type=\"select one\"");
    }
}
