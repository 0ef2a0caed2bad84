//! Building blocks for request payloads.
//!
//! Option structs hold one `Option<T>` per wire field and skip `None` on
//! serialization, so an unset field never reaches the wire as a zero value.
//! Required-field rules live in a single `Validate` impl per operation and run
//! once, after every setter has been applied and before any I/O.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, ValidationError};

/// A boolean the API documents as a `0`/`1` integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flag(pub bool);

impl Flag {
    pub fn as_query(self) -> &'static str {
        if self.0 {
            "1"
        } else {
            "0"
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag(value)
    }
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        flag.0
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.0))
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(u64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Bool(value) => Ok(Flag(value)),
            Raw::Int(0) => Ok(Flag(false)),
            Raw::Int(1) => Ok(Flag(true)),
            Raw::Int(other) => Err(de::Error::custom(format!("flag must be 0 or 1, got {other}"))),
        }
    }
}

/// Ids joined with commas, the form bulk endpoints take in their `ids` query
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdList<T>(Vec<T>);

impl<T> IdList<T> {
    pub fn new(ids: impl IntoIterator<Item = T>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for IdList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// Flatten the set fields of `params` into query pairs.
///
/// Unset (`None`) fields are skipped by the struct's own serializer and
/// `null`s are dropped here. Arrays are joined with commas.
pub fn to_query<P: Serialize>(params: &P) -> Result<Vec<(String, String)>, Error> {
    let value = serde_json::to_value(params).map_err(|e| Error::Serialization(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(Error::Serialization(
            "query parameters must serialize to an object".to_string(),
        ));
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| query_value(value).map(|value| (key, value)))
        .collect())
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(query_value).collect();
            Some(parts.join(","))
        }
        other => Some(other.to_string()),
    }
}

/// Required-field rules for one operation's options.
pub trait Validate {
    /// Human-readable operation name used in error messages.
    const OPERATION: &'static str;

    /// Every rule the options currently break. Empty means valid.
    fn violations(&self) -> Vec<String>;

    fn validate(&self) -> Result<(), ValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                operation: Self::OPERATION,
                violations,
            })
        }
    }
}

/// Collects rule violations for a `Validate` impl.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` must be set.
    pub fn required<T>(mut self, name: &str, value: &Option<T>) -> Self {
        if value.is_none() {
            self.0.push(format!("{name} is required"));
        }
        self
    }

    /// At least one of the named fields must be set.
    pub fn any_of(mut self, fields: &[(&str, bool)]) -> Self {
        if !fields.iter().any(|(_, set)| *set) {
            let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
            self.0.push(format!("one of {} is required", names.join(", ")));
        }
        self
    }

    /// Record a violation when `broken` holds.
    pub fn check(mut self, broken: bool, message: impl Into<String>) -> Self {
        if broken {
            self.0.push(message.into());
        }
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Flag(true)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Flag(false)).unwrap(), "0");
        assert_eq!(Flag(true).as_query(), "1");
    }

    #[test]
    fn flag_decodes_integers_and_booleans() {
        assert_eq!(serde_json::from_str::<Flag>("1").unwrap(), Flag(true));
        assert_eq!(serde_json::from_str::<Flag>("false").unwrap(), Flag(false));
        assert!(serde_json::from_str::<Flag>("2").is_err());
    }

    #[test]
    fn id_list_joins_with_commas() {
        assert_eq!(IdList::new([1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(IdList::new([7]).to_string(), "7");
        assert_eq!(IdList::<i64>::new([]).to_string(), "");
    }

    #[derive(Serialize)]
    struct Query {
        #[serde(skip_serializing_if = "Option::is_none")]
        term: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        search_by_email: Option<Flag>,
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        ids: Vec<i64>,
    }

    #[test]
    fn query_skips_unset_fields() {
        let mut pairs = to_query(&Query {
            term: Some("ann".to_string()),
            search_by_email: Some(Flag(true)),
            start: None,
            ids: vec![4, 5],
        })
        .unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "4,5".to_string()),
                ("search_by_email".to_string(), "1".to_string()),
                ("term".to_string(), "ann".to_string()),
            ]
        );
    }

    struct Sample {
        name: Option<String>,
        a: Option<i64>,
        b: Option<i64>,
    }

    impl Validate for Sample {
        const OPERATION: &'static str = "sample";

        fn violations(&self) -> Vec<String> {
            Violations::new()
                .required("name", &self.name)
                .any_of(&[("a", self.a.is_some()), ("b", self.b.is_some())])
                .into_vec()
        }
    }

    #[test]
    fn all_violations_are_reported_together() {
        let err = Sample {
            name: None,
            a: None,
            b: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.operation, "sample");
        assert_eq!(
            err.violations,
            vec!["name is required".to_string(), "one of a, b is required".to_string()]
        );
    }

    #[test]
    fn one_member_of_group_is_enough() {
        let sample = Sample {
            name: Some(String::new()),
            a: None,
            b: Some(0),
        };
        assert!(sample.validate().is_ok());
    }
}
