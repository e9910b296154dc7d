//! Parameter-order serialization.
//!
//! The legacy endpoints validate request bodies against closed, positional
//! XML schemas: elements must appear in the schema-mandated order and
//! unknown elements are rejected. Callers hand over free-form parameter
//! objects; this module rebuilds them as an explicitly ordered tree driven
//! by the static per-operation field-path table, never by the input
//! object's own key order.
//!
//! The table is the only process-wide structure in the adaptation layer
//! and is read-only after initialization.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{CodecError, CodecResult};

/// Ordered field paths per legacy operation, in schema-mandated order.
///
/// Dotted paths address nested elements (`customerInfo.INN`). An unknown
/// operation name is a configuration error, not a recoverable condition.
static OPERATION_ORDER: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        // Supplier personal cabinet (ELACT)
        (
            "lkpGetContractsList",
            &[
                "regNum",
                "contractRegNum",
                "fromDate",
                "toDate",
                "customerInfo.INN",
                "customerInfo.KPP",
            ][..],
        ),
        ("lkpGetParticipantInfo", &["regNum"][..]),
        (
            "lkpGetObjectList",
            &[
                "regNum",
                "documentKind",
                "externalId",
                "objectId",
                "contractRegNum",
                "fromDate",
                "toDate",
                "customerInfo.INN",
                "customerInfo.KPP",
            ][..],
        ),
        (
            "lkpGetObjectInfo",
            &["regNum", "documentUid", "documentKind"][..],
        ),
        // EIS document storage: ordering applies to the selection block
        ("getDocsByReestrNumber", &["subsystemType", "reestrNumber"][..]),
        (
            "getDocsByOrgRegion",
            &[
                "orgRegion",
                "subsystemType",
                "documentType44",
                "documentType223",
                "periodInfo.exactDate",
                "reestrNumber",
            ][..],
        ),
        ("getNsi", &["nsiCode44", "nsiCode223", "nsiKind"][..]),
        ("getDocSignaturesByUrl", &["archiveUrl"][..]),
    ])
});

/// A value inside an [`OrderedNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum OrderedValue {
    /// Scalar or array leaf, copied verbatim from the input
    Leaf(Value),
    /// Nested ordered element
    Node(OrderedNode),
}

/// Insertion-ordered key/value tree.
///
/// Built fresh per call and discarded after XML serialization. Iteration
/// order is exactly insertion order, which in turn is exactly the order of
/// the operation's field-path list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedNode {
    entries: IndexMap<String, OrderedValue>,
}

impl OrderedNode {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf under `key`. Later inserts with the same key replace
    /// the value but keep the original position.
    pub fn insert_leaf(&mut self, key: &str, value: Value) {
        self.entries
            .insert(key.to_string(), OrderedValue::Leaf(value));
    }

    /// Append a prebuilt subtree under `key`.
    pub fn insert_node(&mut self, key: &str, node: OrderedNode) {
        self.entries
            .insert(key.to_string(), OrderedValue::Node(node));
    }

    /// Get or lazily create the child node at `key`, reusing an existing
    /// node so paths sharing a prefix land in one subtree.
    pub fn child(&mut self, key: &str) -> &mut OrderedNode {
        let slot = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| OrderedValue::Node(OrderedNode::new()));
        if !matches!(slot, OrderedValue::Node(_)) {
            // A leaf and a node at the same path cannot both be in the
            // schema table; tolerate by promoting to a node.
            *slot = OrderedValue::Node(OrderedNode::new());
        }
        match slot {
            OrderedValue::Node(node) => node,
            OrderedValue::Leaf(_) => unreachable!("slot promoted to node above"),
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &OrderedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value at `key`, if present.
    pub fn get(&self, key: &str) -> Option<&OrderedValue> {
        self.entries.get(key)
    }

    /// True when the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Flatten to `(dotted path, leaf value)` pairs in serialization order.
    pub fn leaf_paths(&self) -> Vec<(String, Value)> {
        fn walk(node: &OrderedNode, prefix: &str, out: &mut Vec<(String, Value)>) {
            for (key, value) in node.entries() {
                let path = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };
                match value {
                    OrderedValue::Leaf(leaf) => out.push((path, leaf.clone())),
                    OrderedValue::Node(child) => walk(child, &path, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(self, "", &mut out);
        out
    }
}

/// Ordered field-path list for `operation`, if it is registered.
pub fn operation_order(operation: &str) -> Option<&'static [&'static str]> {
    OPERATION_ORDER.get(operation).copied()
}

/// Build the serialization-ordered tree for a registered operation.
///
/// Unknown operation names indicate code/schema drift and are fatal.
pub fn order_parameters(operation: &str, params: &Value) -> CodecResult<OrderedNode> {
    let order = operation_order(operation).ok_or_else(|| CodecError::UnknownOperation {
        operation: operation.to_string(),
    })?;
    Ok(order_by_paths(order, params))
}

/// Build an ordered tree from an explicit path list.
///
/// Walks the list path by path: a path whose segments all exist in
/// `params` is copied into the output, preserving nesting and creating
/// intermediate nodes lazily; a path with any absent segment is skipped
/// entirely. Fields of `params` not named by any path never appear in the
/// output — the legacy schema is closed and rejects unknown elements.
pub fn order_by_paths(paths: &[&str], params: &Value) -> OrderedNode {
    let mut root = OrderedNode::new();
    for path in paths {
        let parts: Vec<&str> = path.split('.').collect();
        let Some(leaf) = lookup(params, &parts) else {
            continue;
        };
        let mut node = &mut root;
        for part in &parts[..parts.len() - 1] {
            node = node.child(part);
        }
        node.insert_leaf(parts[parts.len() - 1], leaf.clone());
    }
    root
}

/// Resolve a dotted path against a free-form value, `None` on any absent
/// segment or non-object intermediate.
fn lookup<'a>(params: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    let mut current = params;
    for part in parts {
        current = current.as_object()?.get(*part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_order_follows_schema_not_input() {
        // Input carries reestrNumber first; the schema mandates
        // subsystemType first.
        let params = json!({ "reestrNumber": "12345678", "subsystemType": "RGK" });
        let tree = order_parameters("getDocsByReestrNumber", &params).unwrap();
        assert_eq!(
            tree.leaf_paths(),
            vec![
                ("subsystemType".to_string(), json!("RGK")),
                ("reestrNumber".to_string(), json!("12345678")),
            ]
        );
    }

    #[test]
    fn deterministic_across_input_key_order() {
        let a = json!({
            "regNum": "12345678",
            "customerInfo": { "KPP": "770101001", "INN": "7701234567" },
            "fromDate": "2024-01-01",
        });
        let b = json!({
            "fromDate": "2024-01-01",
            "customerInfo": { "INN": "7701234567", "KPP": "770101001" },
            "regNum": "12345678",
        });
        let ta = order_parameters("lkpGetContractsList", &a).unwrap();
        let tb = order_parameters("lkpGetContractsList", &b).unwrap();
        assert_eq!(ta, tb);
        assert_eq!(
            ta.leaf_paths()
                .into_iter()
                .map(|(p, _)| p)
                .collect::<Vec<_>>(),
            vec!["regNum", "fromDate", "customerInfo.INN", "customerInfo.KPP"]
        );
    }

    #[test]
    fn unlisted_fields_never_appear() {
        // Schema closure: [a, b.c] against {a, b: {c, d}, z}.
        let params = json!({ "a": 1, "b": { "c": 2, "d": 3 }, "z": 9 });
        let tree = order_by_paths(&["a", "b.c"], &params);
        assert_eq!(
            tree.leaf_paths(),
            vec![("a".to_string(), json!(1)), ("b.c".to_string(), json!(2))]
        );
    }

    #[test]
    fn absent_intermediate_skips_whole_path() {
        let params = json!({ "regNum": "12345678" });
        let tree = order_parameters("lkpGetContractsList", &params).unwrap();
        // customerInfo.* skipped without creating an empty customerInfo node
        assert!(tree.get("customerInfo").is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn unknown_operation_is_fatal() {
        let err = order_parameters("lkpGetNothing", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnknownOperation { ref operation } if operation == "lkpGetNothing"
        ));
    }

    #[test]
    fn shared_prefix_reuses_one_subtree() {
        let params = json!({ "b": { "c": 1, "e": 2 } });
        let tree = order_by_paths(&["b.c", "b.e"], &params);
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.leaf_paths(),
            vec![
                ("b.c".to_string(), json!(1)),
                ("b.e".to_string(), json!(2)),
            ]
        );
    }

    #[test]
    fn array_leaves_are_copied_verbatim() {
        let params = json!({ "archiveUrl": ["http://a", "http://b"] });
        let tree = order_parameters("getDocSignaturesByUrl", &params).unwrap();
        assert_eq!(
            tree.leaf_paths(),
            vec![("archiveUrl".to_string(), json!(["http://a", "http://b"]))]
        );
    }
}
