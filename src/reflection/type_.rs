//! `Type`: a message descriptor. Extends `Namespace` with an ordered field
//! list and the two top-level encode entry points.

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::reflection::arena::{NodeId, NodeKind};
use crate::reflection::Root;
use crate::sink::ScalarWrite;
use crate::writer::Writer;

impl Root {
    /// Encodes every present field of `value` (a JSON object keyed by
    /// field name) in field declaration order, without a length prefix.
    /// Absent optional fields are skipped; the caller decides presence by
    /// whether `value` has a matching key.
    pub fn encode(&self, type_id: NodeId, value: &Json, writer: &mut Writer) -> Result<()> {
        let fields = match &self.node(type_id).kind {
            NodeKind::Type(t) => t.fields.clone(),
            _ => return Err(Error::invalid_type(self.name(type_id), "not a message type")),
        };
        let obj = value.as_object();
        for field_id in fields {
            let field_name = self.name(field_id);
            let present = obj.and_then(|o| o.get(field_name));
            if let Some(field_value) = present {
                if field_value.is_null() {
                    continue;
                }
                self.encode_field(field_id, field_value, writer)?;
            }
        }
        Ok(())
    }

    /// Emits `uint32(byteLength)` followed by the message body. Since the
    /// length isn't known up front, this forks the writer, encodes every
    /// field into the fork, finishes it to get the body bytes, and writes
    /// those bytes (length-prefixed) into the caller's writer. Callers
    /// that need a field tag in front of this (e.g. a message-typed field)
    /// write `writer.tag(id, WireType::LengthDelimited)` themselves before
    /// calling this.
    pub fn encode_delimited(&self, type_id: NodeId, value: &Json, writer: &mut Writer) -> Result<()> {
        writer.fork();
        if let Err(e) = self.encode(type_id, value, writer) {
            writer.reset();
            return Err(e);
        }
        let body = writer.finish();
        writer.bytes(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::arena::{FieldData, Node, Rule, TypeData};
    use crate::reflection::options::OptionMap;

    fn message_type(root: &mut Root, name: &str) -> NodeId {
        let id = root.alloc(Node {
            name: name.to_string(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Type(TypeData::default()),
        });
        root.add(root.root_id(), id).unwrap();
        id
    }

    fn add_scalar_field(root: &mut Root, parent: NodeId, name: &str, id: i64, type_name: &str) -> NodeId {
        let field = root.alloc(Node {
            name: name.to_string(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Field(FieldData {
                id,
                type_name: type_name.to_string(),
                rule: Rule::Optional,
                extend: None,
                map: false,
                resolved_type: None,
                type_default: None,
                default_value: None,
                part_of: None,
                declaring_field: None,
                extension_field: None,
            }),
        });
        root.add(parent, field).unwrap();
        field
    }

    #[test]
    fn encodes_fields_in_declaration_order() {
        let mut root = Root::new();
        let msg = message_type(&mut root, "Point");
        add_scalar_field(&mut root, msg, "x", 1, "int32");
        add_scalar_field(&mut root, msg, "y", 2, "int32");
        root.resolve_all(root.root_id()).unwrap();

        let mut w = Writer::new();
        root.encode(msg, &serde_json::json!({ "x": 1, "y": 2 }), &mut w)
            .unwrap();
        // field 1 varint tag 0x08, value 1; field 2 varint tag 0x10, value 2
        assert_eq!(w.finish(), vec![0x08, 0x01, 0x10, 0x02]);
    }

    #[test]
    fn absent_optional_field_is_skipped() {
        let mut root = Root::new();
        let msg = message_type(&mut root, "Point");
        add_scalar_field(&mut root, msg, "x", 1, "int32");
        add_scalar_field(&mut root, msg, "y", 2, "int32");
        root.resolve_all(root.root_id()).unwrap();

        let mut w = Writer::new();
        root.encode(msg, &serde_json::json!({ "x": 5 }), &mut w).unwrap();
        assert_eq!(w.finish(), vec![0x08, 0x05]);
    }

    #[test]
    fn nested_message_field_is_length_delimited() {
        let mut root = Root::new();
        let inner = message_type(&mut root, "Inner");
        add_scalar_field(&mut root, inner, "v", 1, "int32");

        let outer = message_type(&mut root, "Outer");
        let nested_field = root.alloc(Node {
            name: "inner".into(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Field(FieldData {
                id: 1,
                type_name: "Inner".into(),
                rule: Rule::Optional,
                extend: None,
                map: false,
                resolved_type: None,
                type_default: None,
                default_value: None,
                part_of: None,
                declaring_field: None,
                extension_field: None,
            }),
        });
        root.add(outer, nested_field).unwrap();
        root.resolve_all(root.root_id()).unwrap();

        let mut w = Writer::new();
        root.encode(outer, &serde_json::json!({ "inner": { "v": 7 } }), &mut w)
            .unwrap();
        // tag 0x0A (field 1, length-delimited), length 2, then inner's [0x08, 0x07]
        assert_eq!(w.finish(), vec![0x0A, 0x02, 0x08, 0x07]);
    }
}
