//! Namespace operations: `add`, `remove`, `lookup`, `define`, `add_json`,
//! `to_json`, `resolve_all`. Implemented as methods on `Root` parameterized
//! by the `NodeId` of the namespace-like node being operated on, since the
//! arena owns every node and there is no `self`-owning namespace object to
//! hang these off of directly.
//!
//! `Type` and `Service` both "extend Namespace" in the sketch this crate is
//! built from; concretely that means both carry a `NamespaceData` and are
//! accepted anywhere a namespace is expected by these operations.

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::reflection::arena::{
    EnumData, FieldData, MethodData, NamespaceData, Node, NodeId, NodeKind, Rule, ServiceData,
    TypeData,
};
use crate::reflection::json::{self, EnumJson, FieldJson, JsonKind, MethodJson, TypeJson};
use crate::reflection::options::{OptionMap, OptionValue};
use crate::reflection::Root;

impl Root {
    fn namespace_data(&self, id: NodeId) -> Option<&NamespaceData> {
        match &self.node(id).kind {
            NodeKind::Namespace(ns) => Some(ns),
            NodeKind::Type(t) => Some(&t.namespace),
            NodeKind::Service(s) => Some(&s.namespace),
            _ => None,
        }
    }

    fn namespace_data_mut(&mut self, id: NodeId) -> Option<&mut NamespaceData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Namespace(ns) => Some(ns),
            NodeKind::Type(t) => Some(&mut t.namespace),
            NodeKind::Service(s) => Some(&mut s.namespace),
            _ => None,
        }
    }

    /// Adds `child` under `ns`. Rejects anything not in the closed set
    /// {Enum, Type, Service, Field, Namespace}; a Field may only be added
    /// at namespace level if it carries an `extend` path. On a name
    /// collision where the existing entry is a plain Namespace and the new
    /// entry is a Type, re-parents the Namespace's children into the Type
    /// and drops the Namespace; any other collision is a hard error.
    pub fn add(&mut self, ns: NodeId, child: NodeId) -> Result<()> {
        if !matches!(
            self.node(child).kind,
            NodeKind::Enum(_)
                | NodeKind::Type(_)
                | NodeKind::Service(_)
                | NodeKind::Field(_)
                | NodeKind::Namespace(_)
        ) {
            return Err(Error::invalid_type(self.name(child), "not a reflection object"));
        }
        if let NodeKind::Field(f) = &self.node(child).kind {
            if f.extend.is_none() && matches!(self.node(ns).kind, NodeKind::Namespace(_)) {
                return Err(Error::RootlessExtension {
                    field: self.name(child).to_string(),
                });
            }
        }

        let child_name = self.name(child).to_string();
        let existing = self
            .namespace_data(ns)
            .and_then(|data| data.nested.get(&child_name))
            .copied();

        if let Some(existing_id) = existing {
            let existing_is_plain_namespace =
                matches!(self.node(existing_id).kind, NodeKind::Namespace(_));
            let incoming_is_type = matches!(self.node(child).kind, NodeKind::Type(_));
            if existing_is_plain_namespace && incoming_is_type {
                self.reparent_namespace_into_type(existing_id, child)?;
                self.on_remove(existing_id);
                self.namespace_data_mut(ns)
                    .unwrap()
                    .nested
                    .insert(child_name.clone(), child);
                self.on_add(child, ns);
                tracing::debug!(parent = %self.path_of(ns), name = %child_name, "re-parented namespace into type");
                return Ok(());
            }
            return Err(Error::NameConflict {
                parent: self.path_of(ns),
                name: child_name,
            });
        }

        self.namespace_data_mut(ns)
            .ok_or_else(|| Error::invalid_type(self.name(ns), "not a namespace"))?
            .nested
            .insert(child_name.clone(), child);
        if let NodeKind::Type(t) = &mut self.node_mut(ns).kind {
            if matches!(self.node(child).kind, NodeKind::Field(_)) {
                t.fields.push(child);
            }
        }
        self.on_add(child, ns);
        tracing::trace!(parent = %self.path_of(ns), name = %child_name, "added reflection object");
        Ok(())
    }

    /// Moves every child of the namespace at `from` into the type at
    /// `into`, then empties `from`'s nested map.
    fn reparent_namespace_into_type(&mut self, from: NodeId, into: NodeId) -> Result<()> {
        let children: Vec<NodeId> = self
            .namespace_data(from)
            .map(|ns| ns.nested.iter().map(|(_, id)| *id).collect())
            .unwrap_or_default();
        for grandchild in children {
            self.add(into, grandchild)?;
        }
        if let Some(ns) = self.namespace_data_mut(from) {
            ns.nested = Default::default();
        }
        Ok(())
    }

    /// Removes `child` from `ns`. Asserts membership.
    pub fn remove(&mut self, ns: NodeId, child: NodeId) -> Result<()> {
        let name = self.name(child).to_string();
        let removed = self
            .namespace_data_mut(ns)
            .and_then(|data| data.nested.remove(&name));
        if removed.is_none() {
            return Err(Error::invalid_type(name, "not a member of this namespace"));
        }
        if let NodeKind::Type(t) = &mut self.node_mut(ns).kind {
            t.fields.retain(|&id| id.0 != child.0);
        }
        self.on_remove(child);
        Ok(())
    }

    /// Resolves a dotted path (or absolute path starting with `.`) against
    /// `ns`. Absolute paths restart at the root. For a relative path: if
    /// the first segment matches a nested object, descend if more segments
    /// remain, else return the child directly. On no local match, and if
    /// the parent hasn't already been consulted, delegates to the parent.
    pub fn lookup(&self, ns: NodeId, path: &str, parent_already_checked: bool) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }
        if let Some(rest) = path.strip_prefix('.') {
            return self.lookup(self.root_id(), rest, true);
        }

        let (head, tail) = match path.split_once('.') {
            Some((h, t)) => (h, Some(t)),
            None => (path, None),
        };

        if let Some(data) = self.namespace_data(ns) {
            if let Some(&found) = data.nested.get(head) {
                return match tail {
                    Some(rest) => self.lookup(found, rest, true),
                    None => Some(found),
                };
            }
        }

        if !parent_already_checked {
            if let Some(parent) = self.parent(ns) {
                return self.lookup(parent, path, false);
            }
        }
        None
    }

    /// Creates missing namespaces along `path`, setting `visible` on each
    /// newly created segment, and returns the terminal namespace. If
    /// `json` is given, it seeds the terminal namespace's nested entries.
    pub fn define(
        &mut self,
        ns: NodeId,
        path: &str,
        json: Option<Json>,
        visible: Option<bool>,
    ) -> Result<NodeId> {
        let mut current = ns;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let existing = self
                .namespace_data(current)
                .and_then(|d| d.nested.get(segment))
                .copied();
            current = match existing {
                Some(id) => {
                    if self.namespace_data(id).is_none() {
                        return Err(Error::NameConflict {
                            parent: self.path_of(current),
                            name: segment.to_string(),
                        });
                    }
                    id
                }
                None => {
                    let node = Node {
                        name: segment.to_string(),
                        parent: None,
                        options: OptionMap::new(),
                        resolved: false,
                        visible,
                        kind: NodeKind::Namespace(NamespaceData::default()),
                    };
                    let id = self.alloc(node);
                    self.add(current, id)?;
                    id
                }
            };
        }
        if let Some(body) = json {
            if let Some(obj) = body.as_object() {
                self.add_json(current, obj.clone())?;
            }
        }
        Ok(current)
    }

    /// For each `(name, body)` entry, tries each candidate reflection kind
    /// in `testJSON` order; the first match is constructed and added. A
    /// classifier mismatch is only an error once every candidate kind has
    /// been tried, rather than on the first kind that doesn't match.
    pub fn add_json(&mut self, ns: NodeId, json: serde_json::Map<String, Json>) -> Result<()> {
        for (name, body) in json {
            let child = match json::classify(&body) {
                JsonKind::Field => self.field_from_json(name.clone(), &body)?,
                JsonKind::Enum => self.enum_from_json(name.clone(), &body)?,
                JsonKind::Type => self.type_from_json(name.clone(), &body)?,
                JsonKind::Service => self.service_from_json(name.clone(), &body)?,
                JsonKind::Method => self.method_from_json(name.clone(), &body)?,
                JsonKind::Namespace => self.namespace_from_json(name.clone(), &body)?,
            };
            self.add(ns, child)?;
        }
        Ok(())
    }

    fn field_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: FieldJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        if parsed.id < 0 {
            return Err(Error::InvalidFieldId { name, id: parsed.id });
        }
        let rule = match parsed.rule.as_deref() {
            None | Some("optional") => Rule::Optional,
            Some("required") => Rule::Required,
            Some("repeated") => Rule::Repeated,
            Some(_) => return Err(Error::InvalidRule { name }),
        };
        let mut options = OptionMap::new();
        if let Some(opts) = &parsed.options {
            for (k, v) in opts {
                if let Some(value) = OptionValue::from_json(v) {
                    options.insert(k.clone(), value);
                }
            }
        }
        let node = Node {
            name,
            parent: None,
            options,
            resolved: false,
            visible: None,
            kind: NodeKind::Field(FieldData {
                id: parsed.id,
                type_name: parsed.type_name,
                rule,
                extend: parsed.extend,
                map: parsed.map,
                resolved_type: None,
                type_default: None,
                default_value: None,
                part_of: None,
                declaring_field: None,
                extension_field: None,
            }),
        };
        Ok(self.alloc(node))
    }

    fn enum_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: EnumJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        let mut values = crate::ordered_map::OrderedMap::new();
        let mut reverse = std::collections::HashMap::new();
        for (k, v) in &parsed.values {
            let v32 = *v as i32;
            values.insert(k.clone(), v32);
            reverse.entry(v32).or_insert_with(|| k.clone());
        }
        let mut options = OptionMap::new();
        if let Some(opts) = &parsed.options {
            for (k, v) in opts {
                if let Some(value) = OptionValue::from_json(v) {
                    options.insert(k.clone(), value);
                }
            }
        }
        Ok(self.alloc(Node {
            name,
            parent: None,
            options,
            resolved: false,
            visible: None,
            kind: NodeKind::Enum(EnumData { values, reverse }),
        }))
    }

    fn type_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: TypeJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        let mut options = OptionMap::new();
        if let Some(opts) = &parsed.options {
            for (k, v) in opts {
                if let Some(value) = OptionValue::from_json(v) {
                    options.insert(k.clone(), value);
                }
            }
        }
        let type_id = self.alloc(Node {
            name,
            parent: None,
            options,
            resolved: false,
            visible: None,
            kind: NodeKind::Type(TypeData::default()),
        });
        if let Some(fields) = parsed.fields {
            for (fname, fbody) in fields {
                let field_json = serde_json::to_value(&fbody).unwrap();
                let field_id = self.field_from_json(fname, &field_json)?;
                self.add(type_id, field_id)?;
            }
        }
        if let Some(nested) = parsed.nested {
            let nested_map: serde_json::Map<String, Json> = nested.into_iter().collect();
            self.add_json(type_id, nested_map)?;
        }
        Ok(type_id)
    }

    fn service_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: crate::reflection::json::ServiceJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        let mut options = OptionMap::new();
        if let Some(opts) = &parsed.options {
            for (k, v) in opts {
                if let Some(value) = OptionValue::from_json(v) {
                    options.insert(k.clone(), value);
                }
            }
        }
        let service_id = self.alloc(Node {
            name,
            parent: None,
            options,
            resolved: false,
            visible: None,
            kind: NodeKind::Service(ServiceData::default()),
        });
        for (mname, mbody) in parsed.methods {
            let method_id = self.method_node(mname, mbody);
            self.add(service_id, method_id)?;
        }
        Ok(service_id)
    }

    fn method_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: MethodJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        Ok(self.method_node(name, parsed))
    }

    fn method_node(&mut self, name: String, parsed: MethodJson) -> NodeId {
        self.alloc(Node {
            name,
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Method(MethodData {
                type_: parsed.type_,
                request_type: parsed.request_type,
                response_type: parsed.response_type,
                request_stream: parsed.request_stream,
                response_stream: parsed.response_stream,
                resolved_request_type: None,
                resolved_response_type: None,
            }),
        })
    }

    fn namespace_from_json(&mut self, name: String, body: &Json) -> Result<NodeId> {
        let parsed: crate::reflection::json::NamespaceJson = serde_json::from_value(body.clone())
            .map_err(|_| Error::InvalidJsonShape { name: name.clone() })?;
        let mut options = OptionMap::new();
        if let Some(opts) = &parsed.options {
            for (k, v) in opts {
                if let Some(value) = OptionValue::from_json(v) {
                    options.insert(k.clone(), value);
                }
            }
        }
        let ns_id = self.alloc(Node {
            name,
            parent: None,
            options,
            resolved: false,
            visible: None,
            kind: NodeKind::Namespace(NamespaceData::default()),
        });
        if let Some(nested) = parsed.nested {
            let nested_map: serde_json::Map<String, Json> = nested.into_iter().collect();
            self.add_json(ns_id, nested_map)?;
        }
        Ok(ns_id)
    }

    /// If `visible`, emits every property; otherwise recursively emits
    /// only children that themselves yielded non-null JSON, returning
    /// `None` (so the parent omits this namespace) if none did.
    ///
    /// A Type's Field children are emitted under `fields` (their own
    /// flat JSON shape, not recursed into `to_json`) and a Service's
    /// Method children under `methods`, mirroring the ingestion dialect in
    /// `add_json` rather than folding everything into `nested`.
    pub fn to_json(&self, ns: NodeId) -> Option<Json> {
        let node = self.node(ns);
        let data = self.namespace_data(ns)?;
        let is_type = matches!(node.kind, NodeKind::Type(_));
        let is_service = matches!(node.kind, NodeKind::Service(_));

        let mut fields = serde_json::Map::new();
        let mut methods = serde_json::Map::new();
        let mut nested = serde_json::Map::new();
        for (name, &child) in data.nested.iter() {
            if is_type && matches!(self.node(child).kind, NodeKind::Field(_)) {
                if let Some(json) = self.node_to_json(child) {
                    fields.insert(name.to_string(), json);
                }
            } else if is_service && matches!(self.node(child).kind, NodeKind::Method(_)) {
                if let Some(json) = self.node_to_json(child) {
                    methods.insert(name.to_string(), json);
                }
            } else if let Some(json) = self.node_to_json(child) {
                nested.insert(name.to_string(), json);
            }
        }

        let empty = nested.is_empty() && fields.is_empty() && methods.is_empty() && node.options.is_empty();
        if node.visible != Some(true) && empty {
            return None;
        }
        let mut obj = serde_json::Map::new();
        if !node.options.is_empty() {
            obj.insert("options".into(), node.options.to_json_map());
        }
        if !fields.is_empty() {
            obj.insert("fields".into(), Json::Object(fields));
        }
        if !methods.is_empty() {
            obj.insert("methods".into(), Json::Object(methods));
        }
        if !nested.is_empty() {
            obj.insert("nested".into(), Json::Object(nested));
        }
        Some(Json::Object(obj))
    }

    fn node_to_json(&self, id: NodeId) -> Option<Json> {
        match &self.node(id).kind {
            NodeKind::Namespace(_) | NodeKind::Type(_) | NodeKind::Service(_) => {
                self.to_json(id)
            }
            NodeKind::Enum(e) => {
                let mut obj = serde_json::Map::new();
                let mut values = serde_json::Map::new();
                for (name, value) in e.values.iter() {
                    values.insert(name.to_string(), serde_json::json!(*value));
                }
                obj.insert("values".into(), Json::Object(values));
                Some(Json::Object(obj))
            }
            NodeKind::Field(f) => {
                let mut obj = serde_json::Map::new();
                obj.insert("id".into(), serde_json::json!(f.id));
                obj.insert("type".into(), Json::String(f.type_name.clone()));
                match f.rule {
                    Rule::Required => {
                        obj.insert("rule".into(), Json::String("required".into()));
                    }
                    Rule::Repeated => {
                        obj.insert("rule".into(), Json::String("repeated".into()));
                    }
                    Rule::Optional => {}
                }
                if let Some(extend) = &f.extend {
                    obj.insert("extend".into(), Json::String(extend.clone()));
                }
                Some(Json::Object(obj))
            }
            NodeKind::Method(m) => {
                let mut obj = serde_json::Map::new();
                obj.insert("requestType".into(), Json::String(m.request_type.clone()));
                obj.insert("responseType".into(), Json::String(m.response_type.clone()));
                if m.request_stream {
                    obj.insert("requestStream".into(), Json::Bool(true));
                }
                if m.response_stream {
                    obj.insert("responseStream".into(), Json::Bool(true));
                }
                Some(Json::Object(obj))
            }
        }
    }

    /// Depth-first: resolves every descendant, then resolves `self`.
    pub fn resolve_all(&mut self, id: NodeId) -> Result<()> {
        let children: Vec<NodeId> = match self.namespace_data(id) {
            Some(data) => data.nested.iter().map(|(_, c)| *c).collect(),
            None => Vec::new(),
        };
        for child in children {
            self.resolve_all(child)?;
        }
        self.resolve(id)?;
        tracing::debug!(path = %self.path_of(id), "resolved");
        Ok(())
    }

    /// Dispatches to the kind-specific resolution logic; all kinds are
    /// idempotent no-ops once `resolved` is set.
    pub fn resolve(&mut self, id: NodeId) -> Result<()> {
        if self.resolved(id) {
            return Ok(());
        }
        if matches!(self.node(id).kind, NodeKind::Field(_)) {
            self.resolve_field(id)?;
        }
        if matches!(self.node(id).kind, NodeKind::Method(_)) {
            self.resolve_method(id)?;
        }
        self.node_mut(id).resolved = true;
        Ok(())
    }

    fn resolve_method(&mut self, id: NodeId) -> Result<()> {
        let parent = self.parent(id);
        let (request, response) = match &self.node(id).kind {
            NodeKind::Method(m) => (m.request_type.clone(), m.response_type.clone()),
            _ => return Ok(()),
        };
        let resolved_request = parent.and_then(|p| self.lookup(p, &request, false));
        let resolved_response = parent.and_then(|p| self.lookup(p, &response, false));
        if let NodeKind::Method(m) = &mut self.node_mut(id).kind {
            m.resolved_request_type = resolved_request;
            m.resolved_response_type = resolved_response;
        }
        Ok(())
    }
}

impl OptionMap {
    fn to_json_map(&self) -> Json {
        let mut obj = serde_json::Map::new();
        for (k, v) in self.iter() {
            obj.insert(k.to_string(), v.to_json());
        }
        Json::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace(root: &mut Root, name: &str) -> NodeId {
        root.alloc(Node {
            name: name.to_string(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Namespace(NamespaceData::default()),
        })
    }

    fn ty(root: &mut Root, name: &str) -> NodeId {
        root.alloc(Node {
            name: name.to_string(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Type(TypeData::default()),
        })
    }

    #[test]
    fn lookup_of_empty_path_returns_none() {
        let root = Root::new();
        assert!(root.lookup(root.root_id(), "", false).is_none());
    }

    #[test]
    fn absolute_path_restarts_at_root() {
        let mut root = Root::new();
        let a = namespace(&mut root, "A");
        root.add(root.root_id(), a).unwrap();
        let b = namespace(&mut root, "B");
        root.add(a, b).unwrap();

        let found = root.lookup(b, ".A.B", false);
        assert_eq!(found, Some(b));
    }

    #[test]
    fn relative_lookup_climbs_to_parent_when_not_found_locally() {
        let mut root = Root::new();
        let a = namespace(&mut root, "A");
        root.add(root.root_id(), a).unwrap();
        let sibling = namespace(&mut root, "Sibling");
        root.add(root.root_id(), sibling).unwrap();
        let child = namespace(&mut root, "Child");
        root.add(a, child).unwrap();

        let found = root.lookup(child, "Sibling", false);
        assert_eq!(found, Some(sibling));
    }

    #[test]
    fn reparenting_moves_namespace_children_into_new_type() {
        let mut root = Root::new();
        let old_ns = namespace(&mut root, "Foo");
        root.add(root.root_id(), old_ns).unwrap();
        let nested = namespace(&mut root, "Bar");
        root.add(old_ns, nested).unwrap();

        let new_type = ty(&mut root, "Foo");
        root.add(root.root_id(), new_type).unwrap();

        let found = root.lookup(root.root_id(), "Foo.Bar", false);
        assert_eq!(found, Some(nested));
        assert_eq!(root.parent(nested), Some(new_type));
    }

    #[test]
    fn add_json_tries_every_kind_before_erroring() {
        let mut root = Root::new();
        let json = serde_json::json!({
            "Greeter": { "methods": { "SayHi": { "requestType": "Req", "responseType": "Res" } } },
            "Req": { "fields": {} },
            "Res": { "fields": {} },
        });
        let obj = json.as_object().unwrap().clone();
        root.add_json(root.root_id(), obj).unwrap();
        assert!(root.lookup(root.root_id(), "Greeter", false).is_some());
    }
}
