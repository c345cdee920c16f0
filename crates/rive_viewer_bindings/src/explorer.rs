// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive ViewModel explorer: browse one level, get and set by path.

use crate::accessor::{InputKind, InputValue};
use crate::error::BindingError;
use crate::hierarchy::HierarchyNode;
use crate::resolver::resolve_accessor;
use crate::runtime::ViewModelInstance;
use serde::Serialize;

/// One row of an explored level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExploreRow {
    /// A leaf with its live value
    Scalar {
        /// Property name
        name: String,
        /// Full path
        path: String,
        /// Leaf kind
        #[serde(rename = "type")]
        input_kind: InputKind,
        /// Live value; triggers and unresolved leaves have none
        value: Option<InputValue>,
    },
    /// A nested instance, list or list item
    Group {
        /// Label
        name: String,
        /// Full path
        path: String,
        /// Number of child groups
        children: usize,
        /// Whether the group holds leaves directly
        has_scalars: bool,
    },
}

/// Rows at one hierarchy level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreLevel {
    /// Explored prefix, `<root>` for the top
    pub prefix: String,
    /// Leaves first, then groups
    pub rows: Vec<ExploreRow>,
}

/// List the level at `prefix` (empty or `<root>` for the top).
///
/// Returns `None` if no node has that path.
pub fn explore(hierarchy: &HierarchyNode, root: &dyn ViewModelInstance, prefix: &str) -> Option<ExploreLevel> {
    let clean = prefix.trim().trim_matches('/');
    let clean = if clean == "<root>" { "" } else { clean };
    let Some(node) = hierarchy.find(clean) else {
        tracing::warn!("No tree node for prefix: {clean}");
        return None;
    };

    let scalars = node.inputs.iter().map(|descriptor| ExploreRow::Scalar {
        name: descriptor.name.clone(),
        path: descriptor.path.clone(),
        input_kind: descriptor.kind,
        value: get(root, &descriptor.path),
    });
    let groups = node.children.iter().map(|child| ExploreRow::Group {
        name: child.label.clone(),
        path: child.path.clone(),
        children: child.children.len(),
        has_scalars: !child.inputs.is_empty(),
    });

    Some(ExploreLevel {
        prefix: node.display_path().to_string(),
        rows: scalars.chain(groups).collect(),
    })
}

/// Current value at `path`
pub fn get(root: &dyn ViewModelInstance, path: &str) -> Option<InputValue> {
    let path = path.trim();
    if path.is_empty() {
        tracing::warn!("Path is empty; must end with a property name");
        return None;
    }
    resolve_accessor(root, path, None)?.read()
}

/// Write `value` at `path` and return the value read back
pub fn set(root: &dyn ViewModelInstance, path: &str, value: InputValue) -> Result<Option<InputValue>, BindingError> {
    let path = path.trim();
    let accessor = resolve_accessor(root, path, None).ok_or_else(|| BindingError::NotAvailable {
        path: path.to_string(),
    })?;
    accessor.write(path, value)?;
    Ok(accessor.read())
}

/// Parse explorer input text as a value of `kind`
pub fn parse_value(kind: InputKind, text: &str) -> Option<InputValue> {
    let text = text.trim();
    match kind {
        InputKind::Number => text.parse::<f64>().ok().filter(|v| v.is_finite()).map(InputValue::Number),
        InputKind::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Some(InputValue::Boolean(true)),
            "false" | "0" | "off" => Some(InputValue::Boolean(false)),
            _ => None,
        },
        InputKind::String => Some(InputValue::String(text.to_string())),
        InputKind::Enum => Some(InputValue::Enum(text.to_string())),
        InputKind::Color => {
            let hex = text.trim_start_matches('#').trim_start_matches("0x");
            u32::from_str_radix(hex, 16).ok().map(InputValue::Color)
        }
        InputKind::Trigger => None,
    }
}

/// Serialise both hierarchies as the JSON payload bundled with exports
pub fn export_hierarchy_json(
    view_model: Option<&HierarchyNode>,
    state_machines: Option<&HierarchyNode>,
) -> serde_json::Result<String> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload<'a> {
        view_model: Option<&'a HierarchyNode>,
        state_machines: Option<&'a HierarchyNode>,
        total_inputs: usize,
    }

    let total_inputs = view_model.map_or(0, HierarchyNode::count_all_inputs)
        + state_machines.map_or(0, HierarchyNode::count_all_inputs);
    serde_json::to_string_pretty(&Payload {
        view_model,
        state_machines,
        total_inputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRuntime;
    use crate::walker::build_hierarchy;

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::from_ron(
            r#"(view_model: Some((properties: {
                "volume": Number(0.5),
                "settings": Nested((properties: {
                    "muted": Boolean(false),
                    "items": List([(properties: {"label": String("one")})]),
                })),
            })))"#,
        )
        .unwrap()
    }

    #[test]
    fn test_explore_levels() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        let tree = build_hierarchy(Some(root.as_ref())).unwrap();

        let top = explore(&tree, root.as_ref(), "<root>").unwrap();
        assert_eq!(top.prefix, "<root>");
        assert_eq!(
            top.rows[0],
            ExploreRow::Scalar {
                name: "volume".into(),
                path: "volume".into(),
                input_kind: InputKind::Number,
                value: Some(InputValue::Number(0.5)),
            }
        );
        assert_eq!(
            top.rows[1],
            ExploreRow::Group { name: "settings".into(), path: "settings".into(), children: 1, has_scalars: true }
        );

        let items = explore(&tree, root.as_ref(), "settings/items/").unwrap();
        assert_eq!(items.rows.len(), 1);
        assert!(explore(&tree, root.as_ref(), "nope").is_none());
    }

    #[test]
    fn test_get_and_set() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        assert_eq!(get(root.as_ref(), "settings/items/0/label"), Some(InputValue::String("one".into())));
        assert_eq!(get(root.as_ref(), "  "), None);

        let read_back = set(root.as_ref(), "settings/muted", InputValue::Boolean(true)).unwrap();
        assert_eq!(read_back, Some(InputValue::Boolean(true)));
        assert!(matches!(
            set(root.as_ref(), "settings/ghost", InputValue::Boolean(true)),
            Err(BindingError::NotAvailable { .. })
        ));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(InputKind::Number, " 0.8 "), Some(InputValue::Number(0.8)));
        assert_eq!(parse_value(InputKind::Number, "inf"), None);
        assert_eq!(parse_value(InputKind::Boolean, "On"), Some(InputValue::Boolean(true)));
        assert_eq!(parse_value(InputKind::Color, "#ff336699"), Some(InputValue::Color(0xFF33_6699)));
        assert_eq!(parse_value(InputKind::Trigger, "x"), None);
    }

    #[test]
    fn test_export_json() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        let tree = build_hierarchy(Some(root.as_ref())).unwrap();
        let json = export_hierarchy_json(Some(&tree), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalInputs"], 3);
        assert_eq!(value["viewModel"]["children"][0]["label"], "settings");
        assert!(value["stateMachines"].is_null());
    }
}
