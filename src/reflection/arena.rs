//! The arena that backs the reflection tree.
//!
//! `Root` owns every node in a single `Vec<Node>`; all parent links and
//! weak back-references (`resolved_type`, `part_of`, `declaring_field`,
//! `extension_field`) are plain `NodeId` indices rather than `Rc`/`Weak`
//! smart pointers. An index carries no drop semantics, so there is no risk
//! of the ownership tree accidentally keeping a removed subtree alive —
//! the systems-language rendering of the "weak back-references" design
//! note.

use crate::ordered_map::OrderedMap;
use crate::reflection::options::OptionMap;

/// An index into `Root`'s node arena. Cheap to copy, not meaningful across
/// different `Root` instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub options: OptionMap,
    pub resolved: bool,
    /// `None` means "inherit from context" (a nullable tri-state, not a
    /// plain bool); `Some` is an explicit override.
    pub visible: Option<bool>,
    pub kind: NodeKind,
}

#[derive(Debug)]
pub enum NodeKind {
    Namespace(NamespaceData),
    Type(TypeData),
    Enum(EnumData),
    Field(FieldData),
    Service(ServiceData),
    Method(MethodData),
}

/// Shared shape for anything that nests named reflection objects
/// (Namespace, Type, Service all have one of these).
#[derive(Debug, Default)]
pub struct NamespaceData {
    pub nested: OrderedMap<NodeId>,
}

#[derive(Debug, Default)]
pub struct TypeData {
    pub namespace: NamespaceData,
    /// Field ids in declaration order. Kept separate from
    /// `namespace.nested` (which also holds non-field children such as
    /// nested messages/enums).
    pub fields: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct EnumData {
    pub values: OrderedMap<i32>,
    pub reverse: std::collections::HashMap<i32, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Optional,
    Required,
    Repeated,
}

/// A field's resolved default, computed once during `resolve`.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Number(f64),
    Bool(bool),
    String(String),
    Bytes,
    EmptyMap,
    EmptySequence,
    EnumValue(i32),
}

#[derive(Debug)]
pub struct FieldData {
    pub id: i64,
    pub type_name: String,
    pub rule: Rule,
    pub extend: Option<String>,
    pub map: bool,
    pub resolved_type: Option<NodeId>,
    pub type_default: Option<DefaultValue>,
    pub default_value: Option<DefaultValue>,
    pub part_of: Option<NodeId>,
    pub declaring_field: Option<NodeId>,
    pub extension_field: Option<NodeId>,
}

impl FieldData {
    pub fn required(&self) -> bool {
        self.rule == Rule::Required
    }

    pub fn optional(&self) -> bool {
        self.rule == Rule::Optional
    }

    pub fn repeated(&self) -> bool {
        self.rule == Rule::Repeated
    }

    /// `packed` defaults to `true` for packable repeated fields unless
    /// explicitly overridden via `options.packed`.
    pub fn packed(&self, options: &OptionMap) -> bool {
        options
            .get("packed")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}

#[derive(Debug, Default)]
pub struct ServiceData {
    pub namespace: NamespaceData,
}

#[derive(Debug)]
pub struct MethodData {
    pub type_: Option<String>,
    pub request_type: String,
    pub response_type: String,
    pub request_stream: bool,
    pub response_stream: bool,
    pub resolved_request_type: Option<NodeId>,
    pub resolved_response_type: Option<NodeId>,
}

/// Owns every reflection node reachable from the root namespace.
#[derive(Debug)]
pub struct Root {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    pub fn new() -> Self {
        let root_node = Node {
            name: String::new(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Namespace(NamespaceData::default()),
        };
        Root {
            nodes: vec![root_node],
            root: NodeId(0),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn resolved(&self, id: NodeId) -> bool {
        self.node(id).resolved
    }

    /// Full dotted path from the root to `id`, for error messages.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n.0 == self.root.0 {
                break;
            }
            parts.push(self.name(n).to_string());
            cur = self.parent(n);
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn set_option(
        &mut self,
        id: NodeId,
        name: String,
        value: crate::reflection::options::OptionValue,
        if_not_set: bool,
    ) {
        let node = self.node_mut(id);
        if if_not_set && node.options.contains_key(&name) {
            return;
        }
        node.options.insert(name, value);
    }

    pub fn get_option<'a>(
        &'a self,
        id: NodeId,
        name: &str,
    ) -> Option<&'a crate::reflection::options::OptionValue> {
        self.node(id).options.get(name)
    }

    /// Invalidates the resolution cache and sets the parent link; called
    /// whenever a node is added under a new namespace.
    pub(crate) fn on_add(&mut self, id: NodeId, parent: NodeId) {
        let node = self.node_mut(id);
        node.parent = Some(parent);
        node.resolved = false;
    }

    pub(crate) fn on_remove(&mut self, id: NodeId) {
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_starts_with_an_empty_root_namespace() {
        let root = Root::new();
        match &root.node(root.root_id()).kind {
            NodeKind::Namespace(ns) => assert!(ns.nested.is_empty()),
            _ => panic!("expected namespace"),
        }
    }

    #[test]
    fn path_of_joins_ancestor_names() {
        let mut root = Root::new();
        let child = root.alloc(Node {
            name: "Outer".into(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Namespace(NamespaceData::default()),
        });
        root.on_add(child, root.root_id());
        let grandchild = root.alloc(Node {
            name: "Inner".into(),
            parent: None,
            options: OptionMap::new(),
            resolved: false,
            visible: None,
            kind: NodeKind::Namespace(NamespaceData::default()),
        });
        root.on_add(grandchild, child);
        assert_eq!(root.path_of(grandchild), "Outer.Inner");
    }
}
