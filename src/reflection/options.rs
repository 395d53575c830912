//! The dynamic `options` bag carried by every reflection object. Protobuf
//! option values are heterogeneous (a bool here, a nested map there), so
//! this is a small closed variant type rather than a generic `Any`.

use crate::ordered_map::OrderedMap;

/// A single option value. Nested maps reuse this same variant so option
/// trees can be arbitrarily deep, matching the shape JSON allows.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Map(OrderedMap<OptionValue>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap<OptionValue>> {
        match self {
            OptionValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Converts a parsed JSON option value into the internal variant.
    /// Arrays aren't a valid option shape and are rejected by the caller
    /// before this is reached.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(OptionValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(OptionValue::Int(i))
                } else {
                    n.as_f64().map(OptionValue::Float)
                }
            }
            serde_json::Value::String(s) => Some(OptionValue::String(s.clone())),
            serde_json::Value::Object(obj) => {
                let mut map = OrderedMap::new();
                for (k, v) in obj {
                    map.insert(k.clone(), OptionValue::from_json(v)?);
                }
                Some(OptionValue::Map(map))
            }
            serde_json::Value::Null | serde_json::Value::Array(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Bool(b) => serde_json::Value::Bool(*b),
            OptionValue::Int(i) => serde_json::json!(*i),
            OptionValue::Float(f) => serde_json::json!(*f),
            OptionValue::String(s) => serde_json::Value::String(s.clone()),
            OptionValue::Map(m) => {
                let mut obj = serde_json::Map::new();
                for (k, v) in m.iter() {
                    obj.insert(k.to_string(), v.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }
}

/// Options map type reused by every reflection object kind.
pub type OptionMap = OrderedMap<OptionValue>;
