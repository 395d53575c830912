//! `Enum`: an ordered `name -> i32` value table plus its reverse index,
//! consulted by `Field::encode`'s enum substitution path (scalar-coded as
//! `uint32` on the wire) and by `jsonConvert` when a caller wants the
//! symbolic name instead of the raw number.

use crate::reflection::arena::{NodeId, NodeKind};
use crate::reflection::Root;

impl Root {
    /// The numeric value for `name`, if `id` names an Enum and it declares
    /// that value.
    pub fn enum_value(&self, id: NodeId, name: &str) -> Option<i32> {
        match &self.node(id).kind {
            NodeKind::Enum(e) => e.values.get(name).copied(),
            _ => None,
        }
    }

    /// The symbolic name for `value`, if more than one name doesn't map to
    /// it (ties keep whichever was declared first, mirroring the reverse
    /// index built at JSON-ingestion time).
    pub fn enum_name(&self, id: NodeId, value: i32) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Enum(e) => e.reverse.get(&value).map(String::as_str),
            _ => None,
        }
    }
}
