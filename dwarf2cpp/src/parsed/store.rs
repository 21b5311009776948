use std::collections::BTreeMap;

use error_stack::{report, Result};

use super::{ModelError, Node, NodeId};

/// Arena of every node produced by a parse, plus the resolver bookkeeping:
/// the DIE-identity memo table, the child-to-parent map for genuine nesting,
/// and the global namespace the compile units merge into.
#[derive(Debug)]
pub struct NodeStore {
    nodes: Vec<Node>,
    /// `.debug_info` global offset -> node. An entry is inserted before the
    /// handler for its DIE runs, so reference cycles terminate here.
    parsed: BTreeMap<usize, NodeId>,
    /// Recorded for class members and non-global namespace members only,
    /// never for referential edges like a pointer's target
    parents: BTreeMap<NodeId, NodeId>,
    global: NodeId,
}

impl NodeStore {
    pub fn new() -> Self {
        let global = Node::Namespace {
            name: String::new(),
            children: BTreeMap::new(),
        };
        Self {
            nodes: vec![global],
            parsed: BTreeMap::new(),
            parents: BTreeMap::new(),
            global: NodeId::new(0),
        }
    }

    /// The global namespace all compile units merge into
    pub fn global(&self) -> NodeId {
        self.global
    }

    /// Number of nodes in the arena, the global namespace included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Look up the node already produced for a DIE identity
    pub fn lookup(&self, global_offset: usize) -> Option<NodeId> {
        self.parsed.get(&global_offset).copied()
    }

    /// Memoize `node` as the result for a DIE identity. Call this with the
    /// placeholder before parsing the DIE's payload.
    pub fn insert(&mut self, global_offset: usize, node: Node) -> NodeId {
        let id = self.alloc(node);
        self.parsed.insert(global_offset, id);
        id
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Swap in the fully parsed payload for a placeholder
    pub fn replace(&mut self, id: NodeId, node: Node) {
        self.nodes[id.index()] = node;
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        self.get(id).display_name()
    }

    /// Set the display name of a node that is still being parsed, so that
    /// cyclic references observe the final name before the payload lands
    pub fn set_name(&mut self, id: NodeId, new_name: String) {
        match self.get_mut(id) {
            Node::Enumerator { name, .. } => *name = new_name,
            Node::Ignored => {}
            Node::Namespace { name, .. } => *name = new_name,
            Node::SubProgram { name, .. } => *name = new_name,
            Node::Typed { name, .. } => *name = new_name,
            Node::Value { name, .. } => *name = Some(new_name),
        }
    }

    pub fn record_parent(&mut self, child: NodeId, parent: NodeId) {
        self.parents.entry(child).or_insert(parent);
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Replace a subprogram's parameter list. Used when a later definition
    /// DIE carries the parameters for an earlier declaration.
    pub fn set_subprogram_params(&mut self, id: NodeId, new_params: Vec<NodeId>) {
        if let Node::SubProgram { params, .. } = self.get_mut(id) {
            params.clear();
            params.extend(new_params);
        }
    }

    fn namespace_display_name(&self, ns: NodeId) -> &str {
        let name = self.name_of(ns);
        if name.is_empty() {
            "::"
        } else {
            name
        }
    }

    /// Add `child` to the namespace `ns` under the child's display name.
    ///
    /// The same symbol shows up in many compile units; a duplicate
    /// non-namespace entry is silently dropped, duplicate namespaces are
    /// folded together, and a namespace colliding with a non-namespace of
    /// the same name is an error. Anonymous children are skipped.
    pub fn merge_into(&mut self, ns: NodeId, child: NodeId) -> Result<(), ModelError> {
        let name = self.get(child).display_name().to_string();
        if name.is_empty() {
            return Ok(());
        }
        let existing = match self.get(ns) {
            Node::Namespace { children, .. } => children.get(&name).copied(),
            _ => return Err(report!(ModelError::NotANamespace(ns))),
        };
        let existing = match existing {
            None => {
                if let Node::Namespace { children, .. } = self.get_mut(ns) {
                    children.insert(name, child);
                }
                if ns != self.global {
                    self.record_parent(child, ns);
                }
                return Ok(());
            }
            Some(existing) => existing,
        };
        match (
            self.get(existing).is_namespace(),
            self.get(child).is_namespace(),
        ) {
            (true, true) => {
                // fold the new namespace's children into the old one
                let grandchildren: Vec<NodeId> = match self.get(child) {
                    Node::Namespace { children, .. } => children.values().copied().collect(),
                    _ => Vec::new(),
                };
                for grandchild in grandchildren {
                    self.merge_into(existing, grandchild)?;
                }
                Ok(())
            }
            (false, false) => Ok(()),
            _ => {
                let ns_name = self.namespace_display_name(ns).to_string();
                Err(report!(ModelError::SymbolTypeMismatch(name, ns_name)))
            }
        }
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::parsed::TypeKind;

    fn namespace(name: &str) -> Node {
        Node::Namespace {
            name: name.to_string(),
            children: BTreeMap::new(),
        }
    }

    fn basic(name: &str) -> Node {
        Node::Typed {
            name: name.to_string(),
            kind: TypeKind::Basic,
        }
    }

    fn names_in(store: &NodeStore, ns: NodeId) -> Vec<String> {
        match store.get(ns) {
            Node::Namespace { children, .. } => children.keys().cloned().collect(),
            _ => panic!("not a namespace"),
        }
    }

    #[test]
    fn merge_inserts_named_child() {
        let mut store = NodeStore::new();
        let global = store.global();
        let int = store.alloc(basic("int"));
        store.merge_into(global, int).unwrap();
        assert_eq!(names_in(&store, global), vec!["int"]);
    }

    #[test]
    fn merge_ignores_anonymous_children() {
        let mut store = NodeStore::new();
        let global = store.global();
        let value = store.alloc(Node::Value {
            name: None,
            ty: NodeId::INVALID,
        });
        store.merge_into(global, value).unwrap();
        assert!(names_in(&store, global).is_empty());
    }

    #[test]
    fn merge_drops_duplicate_symbols() {
        let mut store = NodeStore::new();
        let global = store.global();
        let first = store.alloc(basic("size_t"));
        let second = store.alloc(basic("size_t"));
        store.merge_into(global, first).unwrap();
        store.merge_into(global, second).unwrap();
        match store.get(global) {
            Node::Namespace { children, .. } => {
                assert_eq!(children.get("size_t"), Some(&first));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn merge_folds_namespaces() {
        let mut store = NodeStore::new();
        let global = store.global();
        let ns_a = store.alloc(namespace("std"));
        let ns_b = store.alloc(namespace("std"));
        let size_t = store.alloc(basic("size_t"));
        let ptrdiff_t = store.alloc(basic("ptrdiff_t"));
        store.merge_into(global, ns_a).unwrap();
        store.merge_into(ns_a, size_t).unwrap();
        store.merge_into(ns_b, ptrdiff_t).unwrap();
        store.merge_into(global, ns_b).unwrap();
        assert_eq!(names_in(&store, ns_a), vec!["ptrdiff_t", "size_t"]);
    }

    #[test]
    fn merge_rejects_kind_conflict() {
        let mut store = NodeStore::new();
        let global = store.global();
        let ns = store.alloc(namespace("std"));
        let ty = store.alloc(basic("std"));
        store.merge_into(global, ns).unwrap();
        let err = store.merge_into(global, ty).unwrap_err();
        assert!(matches!(
            err.current_context(),
            ModelError::SymbolTypeMismatch(name, ns) if name == "std" && ns == "::"
        ));
    }

    #[test]
    fn parent_recorded_only_under_non_global_namespaces() {
        let mut store = NodeStore::new();
        let global = store.global();
        let ns = store.alloc(namespace("util"));
        let at_root = store.alloc(basic("int"));
        let nested = store.alloc(basic("long"));
        store.merge_into(global, ns).unwrap();
        store.merge_into(global, at_root).unwrap();
        store.merge_into(ns, nested).unwrap();
        assert_eq!(store.parent_of(at_root), None);
        assert_eq!(store.parent_of(nested), Some(ns));
    }

    #[test]
    fn merge_order_does_not_change_final_names() {
        let build = |flip: bool| {
            let mut store = NodeStore::new();
            let global = store.global();
            let ns_a = store.alloc(namespace("std"));
            let ns_b = store.alloc(namespace("std"));
            let size_t = store.alloc(basic("size_t"));
            let ptrdiff_t = store.alloc(basic("ptrdiff_t"));
            store.merge_into(ns_a, size_t).unwrap();
            store.merge_into(ns_b, ptrdiff_t).unwrap();
            let (first, second) = if flip { (ns_b, ns_a) } else { (ns_a, ns_b) };
            store.merge_into(global, first).unwrap();
            store.merge_into(global, second).unwrap();
            names_in(&store, first)
        };
        assert_eq!(build(false), build(true));
    }
}
