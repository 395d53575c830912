//! `Method`: request/response type references nested under a `Service`.
//! Resolution reuses `Namespace::lookup` exactly like `Field::resolve`,
//! but method dispatch/RPC plumbing itself is out of scope — this type
//! exists only so the tree shape and `testJSON` classifier are complete.

use crate::reflection::arena::{NodeId, NodeKind};
use crate::reflection::Root;

impl Root {
    pub fn method_request_type(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::Method(m) => m.resolved_request_type,
            _ => None,
        }
    }

    pub fn method_response_type(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::Method(m) => m.resolved_response_type,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_request_and_response_types_by_name() {
        let mut root = Root::new();
        let json = serde_json::json!({
            "Greeter": {
                "methods": {
                    "SayHello": { "requestType": "HelloRequest", "responseType": "HelloReply" }
                }
            },
            "HelloRequest": { "fields": {} },
            "HelloReply": { "fields": {} },
        });
        root.add_json(root.root_id(), json.as_object().unwrap().clone())
            .unwrap();
        root.resolve_all(root.root_id()).unwrap();

        let service = root.lookup(root.root_id(), "Greeter", false).unwrap();
        let method = root.service_methods(service)[0];
        let request = root.method_request_type(method).unwrap();
        assert_eq!(root.name(request), "HelloRequest");
    }
}
