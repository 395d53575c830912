//! Field resolution and per-value encoding.
//!
//! Field values are carried as `serde_json::Value` so the same dynamic
//! shape serves JSON ingestion/export and in-memory encoding without a
//! second typed value representation — the reflection-tree-over-dynamic-
//! values approach the `serde-protobuf` runtime model takes, adapted here
//! to drive encoding rather than decoding.

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::reflection::arena::{DefaultValue, NodeId, NodeKind, Rule};
use crate::reflection::Root;
use crate::sink::ScalarWrite;
use crate::types_table::{self, ScalarDefault};
use crate::wire_type::WireType;
use crate::writer::Writer;

impl Root {
    /// Resolves `field`'s symbolic `type` string to either a scalar table
    /// entry or a `Type`/`Enum` node, then computes its default value.
    /// No-op if already resolved.
    pub fn resolve_field(&mut self, field: NodeId) -> Result<()> {
        if self.resolved(field) {
            return Ok(());
        }
        let (type_name, rule, map, explicit_default) = match &self.node(field).kind {
            NodeKind::Field(f) => (
                f.type_name.clone(),
                f.rule,
                f.map,
                self.node(field).options.get("default").cloned(),
            ),
            _ => return Err(Error::invalid_type(self.name(field), "not a field")),
        };

        let (resolved_type, type_default) = if let Some(info) = types_table::lookup(&type_name) {
            (None, Some(scalar_default_value(info.default)))
        } else {
            let parent = self.parent(field).ok_or_else(|| Error::Unresolvable {
                field: self.name(field).to_string(),
                type_name: type_name.clone(),
            })?;
            let target = self.lookup(parent, &type_name, false).ok_or_else(|| {
                Error::Unresolvable {
                    field: self.name(field).to_string(),
                    type_name: type_name.clone(),
                }
            })?;
            match self.node(target).kind {
                NodeKind::Type(_) => (Some(target), None),
                NodeKind::Enum(_) => (Some(target), Some(DefaultValue::EnumValue(0))),
                _ => {
                    return Err(Error::Unresolvable {
                        field: self.name(field).to_string(),
                        type_name: type_name.clone(),
                    })
                }
            }
        };

        let default_value = if map {
            Some(DefaultValue::EmptyMap)
        } else if rule == Rule::Repeated {
            Some(DefaultValue::EmptySequence)
        } else if let Some(explicit) = explicit_default.and_then(|v| json_to_default(&v)) {
            Some(explicit)
        } else {
            type_default.clone()
        };

        if let NodeKind::Field(f) = &mut self.node_mut(field).kind {
            f.resolved_type = resolved_type;
            f.type_default = type_default;
            f.default_value = default_value;
        }
        Ok(())
    }

    /// Encodes a present field value onto `writer`. Callers must skip
    /// absent optional fields before calling this.
    pub fn encode_field(&self, field: NodeId, value: &Json, writer: &mut Writer) -> Result<()> {
        let f = match &self.node(field).kind {
            NodeKind::Field(f) => f,
            _ => return Err(Error::invalid_type(self.name(field), "not a field")),
        };
        let id = f.id as u32;
        let is_enum = matches!(
            f.resolved_type.map(|t| &self.node(t).kind),
            Some(NodeKind::Enum(_))
        );
        let effective_type: &str = if is_enum { "uint32" } else { &f.type_name };
        let wire_type = scalar_wire_type(effective_type);
        let packable = types_table::lookup(effective_type)
            .map(|info| info.is_packable)
            .unwrap_or(false);

        if f.repeated() {
            let elements = value.as_array().cloned().unwrap_or_default();
            if packable && f.packed(&self.node(field).options) {
                writer.fork();
                for elem in &elements {
                    write_scalar(effective_type, elem, writer)?;
                }
                let body = writer.finish();
                if !body.is_empty() {
                    writer.tag(id, WireType::LengthDelimited).bytes(&body);
                }
                return Ok(());
            }
            for elem in &elements {
                if let Some(resolved) = f.resolved_type {
                    if matches!(self.node(resolved).kind, NodeKind::Type(_)) {
                        writer.tag(id, WireType::LengthDelimited);
                        self.encode_delimited(resolved, elem, writer)?;
                        continue;
                    }
                }
                writer.tag(id, wire_type);
                write_scalar(effective_type, elem, writer)?;
            }
            return Ok(());
        }

        if let Some(resolved) = f.resolved_type {
            if matches!(self.node(resolved).kind, NodeKind::Type(_)) {
                writer.tag(id, WireType::LengthDelimited);
                return self.encode_delimited(resolved, value, writer);
            }
        }
        writer.tag(id, wire_type);
        write_scalar(effective_type, value, writer)?;
        Ok(())
    }

    /// Converts an in-memory value to its JSON-safe form, honoring the
    /// field's options: enum values substitute the symbolic name when
    /// requested; 64-bit integer types convert to a decimal string or a
    /// native number per the caller's choice; repeated fields map
    /// elementwise.
    pub fn json_convert(&self, field: NodeId, value: &Json, enum_as_string: bool) -> Json {
        let f = match &self.node(field).kind {
            NodeKind::Field(f) => f,
            _ => return value.clone(),
        };
        if f.repeated() {
            if let Some(arr) = value.as_array() {
                return Json::Array(
                    arr.iter()
                        .map(|v| self.json_convert_scalar(field, v, enum_as_string))
                        .collect(),
                );
            }
        }
        self.json_convert_scalar(field, value, enum_as_string)
    }

    fn json_convert_scalar(&self, field: NodeId, value: &Json, enum_as_string: bool) -> Json {
        let f = match &self.node(field).kind {
            NodeKind::Field(f) => f,
            _ => return value.clone(),
        };
        if enum_as_string {
            if let Some(resolved) = f.resolved_type {
                if let NodeKind::Enum(e) = &self.node(resolved).kind {
                    if let Some(n) = value.as_i64() {
                        if let Some(name) = e.reverse.get(&(n as i32)) {
                            return Json::String(name.clone());
                        }
                    }
                }
            }
        }
        let is_long = types_table::lookup(&f.type_name)
            .map(|info| info.is_long)
            .unwrap_or(false);
        if is_long {
            if let Some(n) = value.as_i64() {
                return Json::String(n.to_string());
            }
            if let Some(n) = value.as_u64() {
                return Json::String(n.to_string());
            }
        }
        value.clone()
    }
}

fn scalar_wire_type(type_name: &str) -> WireType {
    types_table::lookup(type_name)
        .map(|info| info.wire_type)
        .unwrap_or(WireType::LengthDelimited)
}

fn scalar_default_value(default: ScalarDefault) -> DefaultValue {
    match default {
        ScalarDefault::Number(n) => DefaultValue::Number(n),
        ScalarDefault::Bool(b) => DefaultValue::Bool(b),
        ScalarDefault::String => DefaultValue::String(String::new()),
        ScalarDefault::Bytes => DefaultValue::Bytes,
    }
}

fn json_to_default(value: &Json) -> Option<DefaultValue> {
    match value {
        Json::Bool(b) => Some(DefaultValue::Bool(*b)),
        Json::Number(n) => n.as_f64().map(DefaultValue::Number),
        Json::String(s) => Some(DefaultValue::String(s.clone())),
        _ => None,
    }
}

fn write_scalar(type_name: &str, value: &Json, writer: &mut Writer) -> Result<()> {
    match type_name {
        "double" => {
            writer.double(value.as_f64().unwrap_or(0.0));
        }
        "float" => {
            writer.float(value.as_f64().unwrap_or(0.0) as f32);
        }
        "int32" => {
            writer.int32(as_i64(value) as i32);
        }
        "uint32" => {
            writer.uint32(as_i64(value) as u32);
        }
        "sint32" => {
            writer.sint32(as_i64(value) as i32);
        }
        "fixed32" => {
            writer.fixed32(as_i64(value) as u32);
        }
        "sfixed32" => {
            writer.sfixed32(as_i64(value) as i32);
        }
        "int64" => {
            writer.int64(as_i64(value));
        }
        "uint64" => {
            writer.uint64(as_i64(value) as u64);
        }
        "sint64" => {
            writer.sint64(as_i64(value));
        }
        "fixed64" => {
            writer.fixed64(as_i64(value) as u64);
        }
        "sfixed64" => {
            writer.sfixed64(as_i64(value));
        }
        "bool" => {
            writer.bool(value.as_bool().unwrap_or(false));
        }
        "string" => {
            writer.string(value.as_str().unwrap_or(""));
        }
        "bytes" => {
            let bytes: Vec<u8> = value
                .as_array()
                .map(|arr| arr.iter().filter_map(|v| v.as_u64()).map(|v| v as u8).collect())
                .unwrap_or_default();
            writer.bytes(&bytes);
        }
        _ => {
            return Err(Error::invalid_type(type_name, "not a scalar type"));
        }
    }
    Ok(())
}

fn as_i64(value: &Json) -> i64 {
    if let Some(n) = value.as_i64() {
        return n;
    }
    if let Some(n) = value.as_u64() {
        return n as i64;
    }
    if let Some(s) = value.as_str() {
        return s.parse().unwrap_or(0);
    }
    0
}
