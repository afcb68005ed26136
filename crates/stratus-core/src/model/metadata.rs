use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An open string-keyed metadata bag with ordered keys.
///
/// Ordered keys keep equality and shallow-merge well-defined across builds.
pub type Metadata = BTreeMap<String, MetaValue>;

/// The closed set of value kinds a metadata bag may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<String>),
}

impl MetaValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Shallow-merge `other` into `base`; values from `other` win per key.
pub fn merge_into(base: &mut Metadata, other: &Metadata) {
    for (key, value) in other {
        base.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaValue, Metadata, merge_into};

    #[test]
    fn merge_later_values_win_per_key() {
        let mut base = Metadata::new();
        base.insert("region".to_string(), "us-east-1".into());
        base.insert("count".to_string(), MetaValue::Num(2.0));

        let mut other = Metadata::new();
        other.insert("region".to_string(), "eu-west-1".into());
        other.insert("managed".to_string(), MetaValue::Bool(true));

        merge_into(&mut base, &other);

        assert_eq!(base["region"].as_str(), Some("eu-west-1"));
        assert_eq!(base["count"].as_num(), Some(2.0));
        assert_eq!(base["managed"].as_bool(), Some(true));
    }

    #[test]
    fn untagged_serde_round_trip() {
        let mut bag = Metadata::new();
        bag.insert("name".to_string(), "vpc".into());
        bag.insert("cidr_count".to_string(), MetaValue::Num(3.0));
        bag.insert("tags".to_string(), MetaValue::List(vec!["prod".to_string()]));

        let json = serde_json::to_string(&bag).expect("serialize");
        let back: Metadata = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(bag, back);
    }
}
