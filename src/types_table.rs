//! Static registry of the fourteen scalar protobuf types, keyed by name.
//! Built once with `once_cell::sync::Lazy` and consulted by `Field::resolve`
//! to classify a field's declared type string without re-deriving the same
//! facts on every lookup.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::wire_type::WireType;

/// Default value, wire type, and the two predicates `Field` needs to pick
/// an encoding strategy: `is_long` (the 8-byte integer family, which may
/// need string conversion in JSON output) and `is_packable` (every numeric
/// and `bool`; used when a repeated field requests `packed`).
#[derive(Debug, Clone, Copy)]
pub struct ScalarTypeInfo {
    pub default: ScalarDefault,
    pub wire_type: WireType,
    pub is_long: bool,
    pub is_packable: bool,
}

/// The default value for a scalar type, before any `options.default`
/// override. Kept as an enum rather than a `serde_json::Value` so callers
/// that only need the wire type don't pay for JSON machinery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarDefault {
    Number(f64),
    Bool(bool),
    String,
    Bytes,
}

static SCALAR_TYPES: Lazy<HashMap<&'static str, ScalarTypeInfo>> = Lazy::new(|| {
    use ScalarDefault::*;
    use WireType::*;
    let mut m = HashMap::new();
    m.insert(
        "double",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed64, is_long: false, is_packable: true },
    );
    m.insert(
        "float",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed32, is_long: false, is_packable: true },
    );
    m.insert(
        "int32",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: false, is_packable: true },
    );
    m.insert(
        "uint32",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: false, is_packable: true },
    );
    m.insert(
        "sint32",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: false, is_packable: true },
    );
    m.insert(
        "fixed32",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed32, is_long: false, is_packable: true },
    );
    m.insert(
        "sfixed32",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed32, is_long: false, is_packable: true },
    );
    m.insert(
        "int64",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: true, is_packable: true },
    );
    m.insert(
        "uint64",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: true, is_packable: true },
    );
    m.insert(
        "sint64",
        ScalarTypeInfo { default: Number(0.0), wire_type: Varint, is_long: true, is_packable: true },
    );
    m.insert(
        "fixed64",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed64, is_long: true, is_packable: true },
    );
    m.insert(
        "sfixed64",
        ScalarTypeInfo { default: Number(0.0), wire_type: Fixed64, is_long: true, is_packable: true },
    );
    m.insert(
        "bool",
        ScalarTypeInfo { default: Bool(false), wire_type: Varint, is_long: false, is_packable: true },
    );
    m.insert(
        "string",
        ScalarTypeInfo { default: String, wire_type: LengthDelimited, is_long: false, is_packable: false },
    );
    m.insert(
        "bytes",
        ScalarTypeInfo { default: Bytes, wire_type: LengthDelimited, is_long: false, is_packable: false },
    );
    m
});

/// Looks up a scalar type by its protobuf type-name string. Returns `None`
/// for message/enum type names, which aren't in this table — callers fall
/// through to `Namespace::lookup` in that case.
pub fn lookup(name: &str) -> Option<ScalarTypeInfo> {
    SCALAR_TYPES.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_all_fourteen_scalar_names() {
        for name in [
            "double", "float", "int32", "uint32", "sint32", "fixed32", "sfixed32", "int64",
            "uint64", "sint64", "fixed64", "sfixed64", "bool", "string", "bytes",
        ] {
            assert!(lookup(name).is_some(), "missing scalar type {name}");
        }
    }

    #[test]
    fn message_type_name_is_not_scalar() {
        assert!(lookup("MyMessage").is_none());
    }

    #[test]
    fn sixty_four_bit_family_is_marked_long() {
        for name in ["int64", "uint64", "sint64", "fixed64", "sfixed64"] {
            assert!(lookup(name).unwrap().is_long, "{name} should be long");
        }
        for name in ["int32", "float", "bool"] {
            assert!(!lookup(name).unwrap().is_long, "{name} should not be long");
        }
    }

    #[test]
    fn string_and_bytes_are_not_packable() {
        assert!(!lookup("string").unwrap().is_packable);
        assert!(!lookup("bytes").unwrap().is_packable);
        assert!(lookup("bool").unwrap().is_packable);
    }
}
