//! The schema reflection tree: namespaces nesting messages, enums,
//! services, and fields, with scoped name resolution and per-field
//! encoding dispatch. See `arena` for how the tree is represented.

pub mod arena;
mod enum_;
mod field;
pub mod json;
mod method;
mod namespace;
pub mod options;
mod service;
mod type_;

pub use arena::{
    DefaultValue, EnumData, FieldData, MethodData, NamespaceData, Node, NodeId, NodeKind, Root,
    Rule, ServiceData, TypeData,
};
pub use options::OptionValue;
