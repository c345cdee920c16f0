// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph walker: discovers every addressable leaf of a ViewModel graph.
//!
//! Leaves are probed against the **root** instance with the full compound
//! path, because the runtime resolves the chain itself from the root. Nested
//! instances and list items are followed on the current instance.
//!
//! Termination relies on an "active" set holding the identities of the
//! instances on the current traversal stack. An instance is removed from the
//! set when its subtree is done, so the same instance can be walked again
//! through an unrelated path, but never inside its own subtree.

use crate::accessor::probe;
use crate::hierarchy::{Descriptor, HierarchyNode, NodeKind};
use crate::runtime::{probe_call, InstanceId, ListProperty, ViewModelInstance};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Who recorded a path first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Root,
    Nested,
}

struct Walk<'a> {
    root: &'a dyn ViewModelInstance,
    active: HashSet<InstanceId>,
    seen: HashMap<String, Owner>,
    total: usize,
}

/// Build the ViewModel hierarchy rooted at `root`.
///
/// Returns `None` when there is no root instance. The root node's path is
/// empty. Subtrees without any leaves are dropped.
pub fn build_hierarchy(root: Option<&dyn ViewModelInstance>) -> Option<HierarchyNode> {
    let root = root?;
    let mut walk = Walk {
        root,
        active: HashSet::new(),
        seen: HashMap::new(),
        total: 0,
    };

    let mut node = HierarchyNode::new("ViewModel", "", NodeKind::ViewModel);
    walk.visit(root, "", &mut node);

    // A root-level leaf also reached below is kept only at the deeper node.
    let before = node.inputs.len();
    node.inputs
        .retain(|descriptor| walk.seen.get(&descriptor.path) == Some(&Owner::Root));
    let moved = before - node.inputs.len();

    tracing::debug!(
        "ViewModel hierarchy built: {} inputs ({} root duplicates folded)",
        walk.total - moved,
        moved
    );
    Some(node)
}

impl Walk<'_> {
    fn visit(&mut self, instance: &dyn ViewModelInstance, base: &str, node: &mut HierarchyNode) {
        let id = instance.instance_id();
        if !self.active.insert(id) {
            return;
        }

        let properties = match instance.properties() {
            Ok(properties) => properties,
            Err(error) => {
                tracing::trace!("properties({}) failed: {error}", node.display_path());
                Vec::new()
            }
        };

        for property in properties {
            let name = property.name.as_str();
            if name.is_empty() {
                continue;
            }
            let full_path = if base.is_empty() {
                name.to_string()
            } else {
                format!("{base}/{name}")
            };

            self.record_leaf(name, &full_path, base.is_empty(), node);

            if let Some(nested) = nested_instance(instance, name) {
                if nested.instance_id() != id {
                    self.visit_child(nested.as_ref(), name.to_string(), &full_path, NodeKind::Instance, node);
                }
            }

            if let Some(list) = probe_call("list", name, || instance.list(name)) {
                self.visit_list(list.as_ref(), name, &full_path, node);
            }
        }

        self.active.remove(&id);
    }

    fn record_leaf(&mut self, name: &str, full_path: &str, at_root: bool, node: &mut HierarchyNode) {
        let Some(accessor) = probe(self.root, full_path) else {
            return;
        };
        let owner = if at_root { Owner::Root } else { Owner::Nested };
        match self.seen.get(full_path) {
            None => {}
            // The root copy is filtered out once the walk finishes.
            Some(Owner::Root) if !at_root => {}
            Some(_) => return,
        }
        self.seen.insert(full_path.to_string(), owner);
        node.inputs.push(Descriptor::view_model(name, full_path, accessor.kind()));
        self.total += 1;
    }

    fn visit_child(
        &mut self,
        instance: &dyn ViewModelInstance,
        label: String,
        path: &str,
        kind: NodeKind,
        parent: &mut HierarchyNode,
    ) {
        if self.active.contains(&instance.instance_id()) {
            tracing::trace!("cycle at {path}; not descending");
            return;
        }
        let mut child = HierarchyNode::new(label, path, kind);
        self.visit(instance, path, &mut child);
        if !child.is_empty() {
            parent.children.push(child);
        }
    }

    fn visit_list(&mut self, list: &dyn ListProperty, name: &str, path: &str, parent: &mut HierarchyNode) {
        if list.is_empty() {
            return;
        }
        let mut list_node = HierarchyNode::new(name, path, NodeKind::List);
        for index in 0..list.len() {
            let Some(item) = probe_call("instanceAt", path, || list.instance_at(index)) else {
                continue;
            };
            self.visit_child(
                item.as_ref(),
                format!("{name}[{index}]"),
                &format!("{path}/{index}"),
                NodeKind::Instance,
                &mut list_node,
            );
        }
        if !list_node.is_empty() {
            parent.children.push(list_node);
        }
    }
}

/// Nested instance under `name`, via `view_model_instance` then `view_model`.
pub(crate) fn nested_instance(instance: &dyn ViewModelInstance, name: &str) -> Option<Rc<dyn ViewModelInstance>> {
    probe_call("viewModelInstance", name, || instance.view_model_instance(name))
        .or_else(|| probe_call("viewModel", name, || instance.view_model(name)))
}
