//! `Service`: a `Namespace` that nests `Method`s. Exists so a JSON
//! document containing RPC service definitions classifies, ingests, and
//! round-trips through `addJSON`/`toJSON` without being mistaken for a
//! message `Type` or a plain `Namespace`. RPC dispatch itself is out of
//! scope; see `method.rs`.

use crate::reflection::arena::{NodeId, NodeKind};
use crate::reflection::Root;

impl Root {
    /// The methods nested directly under the service at `id`, in
    /// declaration order.
    pub fn service_methods(&self, id: NodeId) -> Vec<NodeId> {
        match &self.node(id).kind {
            NodeKind::Service(s) => s.namespace.nested.iter().map(|(_, m)| *m).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_service_with_methods_in_order() {
        let mut root = Root::new();
        let json = serde_json::json!({
            "Greeter": {
                "methods": {
                    "SayHello": { "requestType": "HelloRequest", "responseType": "HelloReply" },
                    "SayBye": { "requestType": "ByeRequest", "responseType": "ByeReply" }
                }
            }
        });
        root.add_json(root.root_id(), json.as_object().unwrap().clone())
            .unwrap();
        let service = root.lookup(root.root_id(), "Greeter", false).unwrap();
        assert!(matches!(root.node(service).kind, NodeKind::Service(_)));
        let names: Vec<&str> = root
            .service_methods(service)
            .iter()
            .map(|&m| root.name(m))
            .collect();
        assert_eq!(names, vec!["SayHello", "SayBye"]);
    }
}
