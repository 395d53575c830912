//! The flat JSON schema dialect used to build and export the reflection
//! tree. These types model the wire shape only — they are converted into
//! arena nodes by `Namespace::add_json` and produced back out by
//! `Namespace::to_json`; the tree itself never stores these structs
//! directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldJson {
    pub id: i64,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub map: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumJson {
    pub values: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceJson {
    pub methods: BTreeMap<String, MethodJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub type_: Option<String>,
    #[serde(rename = "requestType")]
    pub request_type: String,
    #[serde(rename = "responseType")]
    pub response_type: String,
    #[serde(default, skip_serializing_if = "is_false", rename = "requestStream")]
    pub request_stream: bool,
    #[serde(default, skip_serializing_if = "is_false", rename = "responseStream")]
    pub response_stream: bool,
}

/// Classifies a raw JSON object in `testJSON` order: a Field has `id`; an
/// Enum has `values`; a Type has `fields`; a Service has `methods`; a
/// Method has `requestType`; otherwise it's a Namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Field,
    Enum,
    Type,
    Service,
    Method,
    Namespace,
}

pub fn classify(body: &Value) -> JsonKind {
    let obj = match body.as_object() {
        Some(obj) => obj,
        None => return JsonKind::Namespace,
    };
    if obj.contains_key("id") {
        JsonKind::Field
    } else if obj.contains_key("values") {
        JsonKind::Enum
    } else if obj.contains_key("fields") {
        JsonKind::Type
    } else if obj.contains_key("methods") {
        JsonKind::Service
    } else if obj.contains_key("requestType") {
        JsonKind::Method
    } else {
        JsonKind::Namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_field_before_everything_else() {
        let body = serde_json::json!({ "id": 1, "type": "int32", "values": {} });
        assert_eq!(classify(&body), JsonKind::Field);
    }

    #[test]
    fn classifies_plain_object_as_namespace() {
        let body = serde_json::json!({ "nested": {} });
        assert_eq!(classify(&body), JsonKind::Namespace);
    }

    #[test]
    fn method_json_round_trips() {
        let json = serde_json::json!({
            "requestType": "Ping",
            "responseType": "Pong",
            "responseStream": true
        });
        let method: MethodJson = serde_json::from_value(json).unwrap();
        assert_eq!(method.request_type, "Ping");
        assert!(method.response_stream);
        assert!(!method.request_stream);
    }
}
