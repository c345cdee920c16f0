// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bindings between rendered widgets and descriptors.
//!
//! A widget is modelled headlessly as a [`WidgetState`]; the egui drawer
//! reads and edits that state, and the live sync writes runtime values into
//! it. Bindings never hold accessors, only descriptors.

use crate::accessor::{Accessor, InputKind, InputValue};
use crate::color::argb_to_color_meta;
use crate::hierarchy::Descriptor;
use crate::resolver::resolve_live;
use crate::runtime::AnimationHandle;
use indexmap::IndexMap;
use uuid::Uuid;

/// Placeholder option shown by an enum control without values
pub const NO_ENUM_VALUES: &str = "(no enum values)";

/// Identifier of a registered binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub Uuid);

impl BindingId {
    /// Create a new unique ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Displayed state of one control
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    /// Numeric text field
    Number {
        /// Text currently shown
        text: String,
    },
    /// Checkbox
    Boolean {
        /// Checked
        checked: bool,
    },
    /// Free text field
    Text {
        /// Text currently shown
        text: String,
    },
    /// Selection list
    Enum {
        /// Legal values; empty shows a disabled placeholder
        options: Vec<String>,
        /// Current selection
        selected: String,
    },
    /// Swatch plus alpha percentage
    Color {
        /// Swatch colour
        rgb: [u8; 3],
        /// Alpha percentage text
        alpha_text: String,
    },
    /// Fire button
    Trigger,
}

impl WidgetState {
    /// Blank widget for a kind, before the first sync
    pub fn for_kind(kind: InputKind) -> Self {
        match kind {
            InputKind::Number => Self::Number { text: "0".to_string() },
            InputKind::Boolean => Self::Boolean { checked: false },
            InputKind::String => Self::Text { text: String::new() },
            InputKind::Enum => Self::Enum {
                options: Vec::new(),
                selected: String::new(),
            },
            InputKind::Color => Self::Color {
                rgb: [0, 0, 0],
                alpha_text: "100".to_string(),
            },
            InputKind::Trigger => Self::Trigger,
        }
    }

    /// Whether a focused widget of this type keeps its text during a
    /// non-forced sync
    pub fn preserves_focus(&self) -> bool {
        matches!(self, Self::Number { .. } | Self::Text { .. } | Self::Color { .. })
    }

    /// Overwrite the displayed state from a live accessor
    fn load_from(&mut self, accessor: &Accessor) {
        match (self, accessor.read()) {
            (Self::Number { text }, Some(InputValue::Number(value))) => {
                *text = if value.is_finite() { value.to_string() } else { "0".to_string() };
            }
            (Self::Boolean { checked }, Some(InputValue::Boolean(value))) => *checked = value,
            (Self::Text { text }, Some(InputValue::String(value))) => *text = value,
            (Self::Enum { options, selected }, Some(InputValue::Enum(value))) => {
                *options = accessor.enum_values();
                *selected = value;
            }
            (Self::Color { rgb, alpha_text }, Some(InputValue::Color(argb))) => {
                let meta = argb_to_color_meta(argb);
                *rgb = meta.rgb;
                *alpha_text = meta.alpha_percent.to_string();
            }
            _ => {}
        }
    }
}

/// Live association between a widget and a descriptor
#[derive(Debug, Clone)]
pub struct Binding {
    /// Binding ID
    pub id: BindingId,
    /// Leaf this widget edits
    pub descriptor: Descriptor,
    /// Displayed state
    pub widget: WidgetState,
    /// False while no accessor resolves
    pub enabled: bool,
    /// The user is editing this widget
    pub focused: bool,
}

impl Binding {
    /// Kind of the bound leaf
    pub fn kind(&self) -> InputKind {
        self.descriptor.kind
    }

    /// Whether the widget accepts input. Enum controls without values stay
    /// disabled even when resolvable.
    pub fn interactive(&self) -> bool {
        match &self.widget {
            WidgetState::Enum { options, .. } => self.enabled && !options.is_empty(),
            _ => self.enabled,
        }
    }
}

/// Counts from one sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Widgets refreshed from the runtime
    pub updated: usize,
    /// Widgets skipped because the user is editing them
    pub skipped_focused: usize,
    /// Widgets disabled because nothing resolved
    pub disabled: usize,
}

/// All bindings of the current render, in render order
#[derive(Debug, Default)]
pub struct BindingSet {
    bindings: IndexMap<BindingId, Binding>,
}

impl BindingSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget for `descriptor`
    pub fn register(&mut self, descriptor: Descriptor) -> BindingId {
        let id = BindingId::new();
        let widget = WidgetState::for_kind(descriptor.kind);
        self.bindings.insert(
            id,
            Binding {
                id,
                descriptor,
                widget,
                enabled: false,
                focused: false,
            },
        );
        id
    }

    /// Get a binding
    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Get a binding mutably
    pub fn get_mut(&mut self, id: BindingId) -> Option<&mut Binding> {
        self.bindings.get_mut(&id)
    }

    /// Find the binding for a path
    pub fn find_by_path(&self, path: &str) -> Option<&Binding> {
        self.bindings.values().find(|binding| binding.descriptor.path == path)
    }

    /// Iterate in render order
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Discard every binding
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Mark a widget as being edited (or not)
    pub fn set_focus(&mut self, id: BindingId, focused: bool) {
        if let Some(binding) = self.bindings.get_mut(&id) {
            binding.focused = focused;
        }
    }

    /// Re-resolve every binding and push live values into the widgets.
    ///
    /// Focused number, text and colour widgets are left alone unless
    /// `force` is set. Booleans and enums are always overwritten.
    pub fn sync_all(&mut self, handle: &dyn AnimationHandle, force: bool) -> SyncStats {
        let mut stats = SyncStats::default();
        for binding in self.bindings.values_mut() {
            let Some(accessor) = resolve_live(handle, &binding.descriptor) else {
                binding.enabled = false;
                stats.disabled += 1;
                continue;
            };
            binding.enabled = true;

            if binding.focused && !force && binding.widget.preserves_focus() {
                stats.skipped_focused += 1;
                continue;
            }
            binding.widget.load_from(&accessor);
            stats.updated += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRuntime;

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::from_ron(
            r#"(view_model: Some((properties: {
                "speed": Number(1.5),
                "on": Boolean(false),
                "tint": Color(2150852249),
                "mode": Enum(value: "a", values: ["a", "b"]),
                "none": Enum(value: "", values: []),
            })))"#,
        )
        .unwrap()
    }

    #[test]
    fn test_forced_sync_populates() {
        let runtime = runtime();
        let mut set = BindingSet::new();
        let speed = set.register(Descriptor::view_model("speed", "speed", InputKind::Number));
        let tint = set.register(Descriptor::view_model("tint", "tint", InputKind::Color));

        let stats = set.sync_all(&runtime, true);
        assert_eq!(stats.updated, 2);
        assert_eq!(set.get(speed).unwrap().widget, WidgetState::Number { text: "1.5".into() });
        assert_eq!(
            set.get(tint).unwrap().widget,
            WidgetState::Color { rgb: [0x33, 0x66, 0x99], alpha_text: "50".into() }
        );
    }

    #[test]
    fn test_focused_number_keeps_uncommitted_text() {
        let runtime = runtime();
        let mut set = BindingSet::new();
        let speed = set.register(Descriptor::view_model("speed", "speed", InputKind::Number));
        set.sync_all(&runtime, true);

        set.set_focus(speed, true);
        if let Some(binding) = set.get_mut(speed) {
            binding.widget = WidgetState::Number { text: "12".into() };
        }
        runtime.write("speed", InputValue::Number(3.0));

        let stats = set.sync_all(&runtime, false);
        assert_eq!(stats.skipped_focused, 1);
        assert_eq!(set.get(speed).unwrap().widget, WidgetState::Number { text: "12".into() });

        set.sync_all(&runtime, true);
        assert_eq!(set.get(speed).unwrap().widget, WidgetState::Number { text: "3".into() });
    }

    #[test]
    fn test_focused_boolean_is_still_overwritten() {
        let runtime = runtime();
        let mut set = BindingSet::new();
        let on = set.register(Descriptor::view_model("on", "on", InputKind::Boolean));
        set.set_focus(on, true);
        runtime.write("on", InputValue::Boolean(true));

        set.sync_all(&runtime, false);
        assert_eq!(set.get(on).unwrap().widget, WidgetState::Boolean { checked: true });
    }

    #[test]
    fn test_unresolved_binding_is_disabled() {
        let runtime = runtime();
        let mut set = BindingSet::new();
        let speed = set.register(Descriptor::view_model("speed", "speed", InputKind::Number));
        let ghost = set.register(Descriptor::view_model("ghost", "ghost", InputKind::Number));
        let none = set.register(Descriptor::view_model("none", "none", InputKind::Enum));

        let stats = set.sync_all(&runtime, true);
        assert_eq!(stats.disabled, 1);
        assert!(set.get(speed).unwrap().enabled);
        assert!(!set.get(ghost).unwrap().enabled);
        assert!(set.get(none).unwrap().enabled);
        assert!(!set.get(none).unwrap().interactive());

        runtime.remove("speed");
        set.sync_all(&runtime, false);
        assert!(!set.get(speed).unwrap().enabled);
    }
}
