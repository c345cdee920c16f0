// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot tree of discovered inputs.

use crate::accessor::InputKind;
use serde::{Deserialize, Serialize};

/// Where a descriptor's value lives in the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputSource {
    /// Data-binding graph
    #[serde(rename = "viewmodel")]
    ViewModel,
    /// State-machine input list
    StateMachine,
}

/// Immutable record of one discovered leaf.
///
/// Holds no live accessor; the resolver re-acquires one on every access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Bare property or input name
    pub name: String,
    /// Full slash-joined address
    pub path: String,
    /// Classified kind
    pub kind: InputKind,
    /// Value source
    pub source: InputSource,
    /// Owning state machine, for state-machine inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_machine_name: Option<String>,
}

impl Descriptor {
    /// Descriptor for a ViewModel leaf
    pub fn view_model(name: impl Into<String>, path: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            source: InputSource::ViewModel,
            state_machine_name: None,
        }
    }

    /// Descriptor for a state-machine input
    pub fn state_machine(
        machine: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        kind: InputKind,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            source: InputSource::StateMachine,
            state_machine_name: Some(machine.into()),
        }
    }
}

/// What a hierarchy node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// The root ViewModel instance
    #[serde(rename = "vm")]
    ViewModel,
    /// A nested instance or list item
    Instance,
    /// A list of instances
    List,
    /// Group of all state machines
    StateMachines,
    /// One state machine
    StateMachine,
}

/// One nesting level of discovered inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Section label
    pub label: String,
    /// Address prefix; empty for the root
    pub path: String,
    /// Node kind
    pub kind: NodeKind,
    /// Leaves at this level
    pub inputs: Vec<Descriptor>,
    /// Nested levels
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Create an empty node
    pub fn new(label: impl Into<String>, path: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            kind,
            inputs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Path for display; the root shows as `<root>`
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }

    /// Leaves in this node and every descendant
    pub fn count_all_inputs(&self) -> usize {
        self.inputs.len() + self.children.iter().map(Self::count_all_inputs).sum::<usize>()
    }

    /// Whether the subtree holds no leaves
    pub fn is_empty(&self) -> bool {
        self.count_all_inputs() == 0
    }

    /// Every descriptor in the subtree, depth first, own inputs before children
    pub fn descriptors(&self) -> Vec<&Descriptor> {
        let mut out = Vec::new();
        self.collect_descriptors(&mut out);
        out
    }

    fn collect_descriptors<'a>(&'a self, out: &mut Vec<&'a Descriptor>) {
        out.extend(self.inputs.iter());
        for child in &self.children {
            child.collect_descriptors(out);
        }
    }

    /// Keep only the leaves `keep` accepts, dropping children left empty
    pub fn retain_inputs(&mut self, keep: &mut impl FnMut(&Descriptor) -> bool) {
        self.inputs.retain(|descriptor| keep(descriptor));
        for child in &mut self.children {
            child.retain_inputs(keep);
        }
        self.children.retain(|child| !child.is_empty());
    }

    /// Find a node by path
    pub fn find(&self, path: &str) -> Option<&HierarchyNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}
