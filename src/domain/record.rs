//! Raw input records: one JSON object per line.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::domain::entities::SentimentCounts;

/// Presence of an optional key in a record.
///
/// Distinguishes a key that is absent from one that is explicitly `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declared<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Declared<T> {
    fn default() -> Self {
        Declared::Missing
    }
}

impl<T> Declared<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Declared::Value(v) => Some(v),
            Declared::Missing | Declared::Null => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Declared::Missing)
    }
}

// Only invoked when the key is present; `#[serde(default)]` covers the missing case.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declared<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Declared::Value(v),
            None => Declared::Null,
        })
    }
}

/// Nullable but required: the key must be present, its value may be `null`.
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// A single line of input as written by the clustering pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub level: i64,
    pub level_id: i64,
    pub weight_dict: BTreeMap<String, i64>,
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub label: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub description: Option<String>,
    #[serde(default)]
    pub sentiment_dict: Declared<BTreeMap<String, SentimentCounts>>,
    #[serde(default)]
    pub children: Declared<Vec<String>>,
}

impl NodeRecord {
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Child reference token `"<level>/<level_id>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildRef {
    pub level: i64,
    pub level_id: i64,
}

impl FromStr for ChildRef {
    type Err = ();

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (level, level_id) = token.split_once('/').ok_or(())?;
        Ok(Self {
            level: level.trim().parse().map_err(|_| ())?,
            level_id: level_id.trim().parse().map_err(|_| ())?,
        })
    }
}

impl fmt::Display for ChildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.level, self.level_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#""name":"1_0","level":1,"level_id":0,"weight_dict":{"total":4},"keywords":["a"],"label":null,"description":"d""#;

    #[test]
    fn given_no_children_key_when_parsing_then_missing() {
        let rec = NodeRecord::from_json(&format!("{{{}}}", BASE)).unwrap();
        assert_eq!(rec.children, Declared::Missing);
        assert!(rec.sentiment_dict.is_missing());
        assert_eq!(rec.label, None);
        assert_eq!(rec.description.as_deref(), Some("d"));
    }

    #[test]
    fn given_null_children_when_parsing_then_null() {
        let rec = NodeRecord::from_json(&format!("{{{},\"children\":null}}", BASE)).unwrap();
        assert_eq!(rec.children, Declared::Null);
    }

    #[test]
    fn given_empty_children_when_parsing_then_empty_value() {
        let rec = NodeRecord::from_json(&format!("{{{},\"children\":[]}}", BASE)).unwrap();
        assert_eq!(rec.children, Declared::Value(vec![]));
    }

    #[test]
    fn given_missing_label_key_when_parsing_then_fails() {
        let line = r#"{"name":"0_0","level":0,"level_id":0,"weight_dict":{},"keywords":[],"description":null}"#;
        let err = NodeRecord::from_json(line).unwrap_err();
        assert!(err.to_string().contains("label"), "{}", err);
    }

    #[test]
    fn given_child_tokens_when_parsing_then_splits_into_integers() {
        assert_eq!(
            "2/17".parse::<ChildRef>(),
            Ok(ChildRef { level: 2, level_id: 17 })
        );
        assert!("2".parse::<ChildRef>().is_err());
        assert!("a/1".parse::<ChildRef>().is_err());
        assert!("1/2/3".parse::<ChildRef>().is_err());
    }
}
