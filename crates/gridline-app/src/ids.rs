// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Value;

macro_rules! position_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(usize);

        impl $name {
            pub const fn new(value: usize) -> Self {
                Self(value)
            }

            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value)
            }
        }
    };
}

// Position of a row in the full source data, stable across filtering and sorting.
position_id!(RowIndex);
// Slot of a node in a tree arena.
position_id!(NodeIndex);

/// Identity of a tree row, read from the configured id field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    Int(i64),
    Text(String),
}

impl NodeKey {
    /// Reads a key out of a cell value. Null, empty text, booleans and
    /// composite values carry no identity. Keys compare by their text, so
    /// `1` and `"1"` name the same node.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(value) => Some(Self::Int(*value)),
            Value::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(Self::Int(*value as i64))
            }
            Value::Float(value) => Some(Self::Text(value.to_string())),
            Value::Text(value) if !value.is_empty() => Some(Self::from_text(value)),
            _ => None,
        }
    }

    /// Integer-looking text becomes `Int` when it prints back unchanged.
    fn from_text(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(value) if value.to_string() == text => Self::Int(value),
            _ => Self::Text(text.to_owned()),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::NodeKey;
    use crate::Value;

    #[test]
    fn node_key_ignores_values_without_identity() {
        assert_eq!(NodeKey::from_value(&Value::Null), None);
        assert_eq!(NodeKey::from_value(&Value::Text(String::new())), None);
        assert_eq!(NodeKey::from_value(&Value::Bool(true)), None);
        assert_eq!(NodeKey::from_value(&Value::Int(0)), Some(NodeKey::Int(0)));
        assert_eq!(NodeKey::from_value(&Value::Float(3.0)), Some(NodeKey::Int(3)));
        assert_eq!(
            NodeKey::from_value(&Value::from("svc")),
            Some(NodeKey::Text("svc".to_owned()))
        );
    }

    #[test]
    fn integer_text_and_numbers_share_a_key() {
        assert_eq!(NodeKey::from_value(&Value::from("42")), Some(NodeKey::Int(42)));
        assert_eq!(NodeKey::from_value(&Value::from("-7")), Some(NodeKey::Int(-7)));
        assert_eq!(NodeKey::from("42"), NodeKey::Int(42));
        assert_eq!(
            NodeKey::from_value(&Value::from("007")),
            Some(NodeKey::Text("007".to_owned()))
        );
        assert_eq!(
            NodeKey::from_value(&Value::from("+1")),
            Some(NodeKey::Text("+1".to_owned()))
        );
    }
}
