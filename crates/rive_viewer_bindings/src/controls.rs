// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control panel model: sections, bindings, live sync and write-back.
//!
//! The panel is headless. [`ControlPanel::render`] turns the two hierarchies
//! into collapsible sections and registers one binding per leaf; the egui
//! drawer in [`crate::ui`] draws that model and reports [`ControlEdit`]s,
//! which [`ControlPanel::apply_edit`] writes back through a fresh resolve.

use crate::accessor::{InputKind, InputValue};
use crate::binding::{BindingId, BindingSet, SyncStats, WidgetState};
use crate::color::{hex_to_rgb, parse_alpha_percent, percent_to_alpha_byte};
use crate::error::BindingError;
use crate::hierarchy::{HierarchyNode, NodeKind};
use crate::resolver::{fire_trigger, resolve_live, FireReport};
use crate::runtime::{resolve_view_model_root, AnimationHandle};
use crate::scheduler::{SyncScheduler, DEFAULT_SYNC_INTERVAL};
use crate::state_machine::build_state_machine_hierarchy;
use crate::walker::build_hierarchy;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Shown before any animation is loaded and after cleanup
pub const MSG_NO_ANIMATION: &str = "No animation loaded.";
/// Shown while an animation is loading
pub const MSG_LOADING: &str = "Loading ViewModel inputs...";
/// Shown when neither a ViewModel nor state-machine inputs exist
pub const MSG_NO_BOUND_INPUTS: &str = "No bound ViewModel inputs detected.";
/// Shown when a ViewModel exists but nothing is controllable
pub const MSG_NO_WRITABLE_INPUTS: &str = "No writable ViewModel inputs were found.";

/// Default section accents, cycled by depth
pub const DEFAULT_ACCENTS: [[u8; 3]; 6] = [
    [0x4f, 0xa3, 0xf7],
    [0x7e, 0xd3, 0x21],
    [0xf5, 0xa6, 0x23],
    [0xbd, 0x10, 0xe0],
    [0x50, 0xe3, 0xc2],
    [0xf2, 0x5c, 0x54],
];

/// One collapsible section of the panel
#[derive(Debug, Clone)]
pub struct ControlSection {
    /// Header label
    pub label: String,
    /// Address prefix of the node
    pub path: String,
    /// Node kind
    pub kind: NodeKind,
    /// Nesting depth
    pub depth: usize,
    /// Accent colour, `palette[depth % len]`
    pub accent: [u8; 3],
    /// Whether the section starts expanded
    pub default_open: bool,
    /// Leaves in this section and below
    pub badge: usize,
    /// Widgets directly in this section
    pub controls: Vec<BindingId>,
    /// Nested sections
    pub children: Vec<ControlSection>,
}

/// A user action on a control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEdit {
    /// Focus entered or left a widget
    Focus {
        /// Widget
        id: BindingId,
        /// Focused
        focused: bool,
    },
    /// Numeric text committed
    Number {
        /// Widget
        id: BindingId,
        /// Text entered
        text: String,
    },
    /// Checkbox toggled
    Boolean {
        /// Widget
        id: BindingId,
        /// New state
        checked: bool,
    },
    /// Free text committed
    Text {
        /// Widget
        id: BindingId,
        /// Text entered
        text: String,
    },
    /// Enum option picked
    Enum {
        /// Widget
        id: BindingId,
        /// Chosen value
        selected: String,
    },
    /// Swatch or alpha changed
    Color {
        /// Widget
        id: BindingId,
        /// Swatch colour
        rgb: [u8; 3],
        /// Alpha percentage text
        alpha_text: String,
    },
    /// Trigger button pressed
    Fire {
        /// Widget
        id: BindingId,
    },
}

impl ControlEdit {
    /// Widget the edit targets
    pub fn id(&self) -> BindingId {
        match self {
            Self::Focus { id, .. }
            | Self::Number { id, .. }
            | Self::Boolean { id, .. }
            | Self::Text { id, .. }
            | Self::Enum { id, .. }
            | Self::Color { id, .. }
            | Self::Fire { id } => *id,
        }
    }
}

/// The live control surface for one loaded animation
#[derive(Debug)]
pub struct ControlPanel {
    sections: Vec<ControlSection>,
    bindings: BindingSet,
    scheduler: SyncScheduler,
    generation: u64,
    palette: Vec<[u8; 3]>,
    view_model: Option<HierarchyNode>,
    state_machines: Option<HierarchyNode>,
    empty_message: Option<String>,
    status: Option<String>,
}

impl ControlPanel {
    /// Create an empty panel
    pub fn new(palette: Vec<[u8; 3]>, sync_interval: Duration) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_ACCENTS.to_vec()
        } else {
            palette
        };
        Self {
            sections: Vec::new(),
            bindings: BindingSet::new(),
            scheduler: SyncScheduler::new(sync_interval),
            generation: 0,
            palette,
            view_model: None,
            state_machines: None,
            empty_message: Some(MSG_NO_ANIMATION.to_string()),
            status: None,
        }
    }

    /// Build a panel from `#rrggbb` accent strings
    pub fn with_accent_hex(accents: &[String], sync_interval: Duration) -> Self {
        Self::new(accents.iter().map(|hex| hex_to_rgb(hex)).collect(), sync_interval)
    }

    /// Discard all bindings and sections and stop the timer
    pub fn reset(&mut self, message: impl Into<String>) {
        self.scheduler.stop();
        self.generation = self.generation.wrapping_add(1);
        self.bindings.clear();
        self.sections.clear();
        self.view_model = None;
        self.state_machines = None;
        self.empty_message = Some(message.into());
        self.status = None;
    }

    /// Rebuild the panel against a loaded animation
    pub fn render(&mut self, handle: &dyn AnimationHandle, now: Instant) {
        self.reset(MSG_LOADING);

        let root = resolve_view_model_root(handle);
        let view_model = build_hierarchy(root.as_deref());
        let mut state_machines = build_state_machine_hierarchy(handle);

        if root.is_none() && state_machines.is_none() {
            self.empty_message = Some(MSG_NO_BOUND_INPUTS.to_string());
            tracing::info!("{MSG_NO_BOUND_INPUTS}");
            return;
        }

        // ViewModel paths win over state-machine inputs with the same address
        let mut shadowed = false;
        if let (Some(vm), Some(machines)) = (&view_model, &mut state_machines) {
            let taken: HashSet<&str> = vm.descriptors().into_iter().map(|d| d.path.as_str()).collect();
            machines.retain_inputs(&mut |descriptor| {
                let free = !taken.contains(descriptor.path.as_str());
                if !free {
                    tracing::warn!("State machine input {} shadowed by a ViewModel property", descriptor.path);
                }
                free
            });
            shadowed = machines.is_empty();
        }
        if shadowed {
            state_machines = None;
        }

        if let Some(node) = view_model.as_ref().filter(|node| !node.is_empty()) {
            let section = self.section_for(node, 0, true);
            self.sections.push(section);
        }
        if let Some(node) = &state_machines {
            let section = self.section_for(node, 0, false);
            self.sections.push(section);
        }
        self.view_model = view_model;
        self.state_machines = state_machines;

        if self.bindings.is_empty() {
            self.sections.clear();
            self.empty_message = Some(MSG_NO_WRITABLE_INPUTS.to_string());
            tracing::info!("{MSG_NO_WRITABLE_INPUTS}");
            return;
        }

        self.empty_message = None;
        self.bindings.sync_all(handle, true);
        self.scheduler.start(self.generation, now);
        tracing::info!("Rendered {} controls", self.bindings.len());
    }

    fn section_for(&mut self, node: &HierarchyNode, depth: usize, open: bool) -> ControlSection {
        let controls = node
            .inputs
            .iter()
            .map(|descriptor| self.bindings.register(descriptor.clone()))
            .collect();
        let children = node
            .children
            .iter()
            .map(|child| self.section_for(child, depth + 1, false))
            .collect();
        ControlSection {
            label: node.label.clone(),
            path: node.path.clone(),
            kind: node.kind,
            depth,
            accent: self.palette[depth % self.palette.len()],
            default_open: open,
            badge: node.count_all_inputs(),
            controls,
            children,
        }
    }

    /// Run the periodic sync if it is due
    pub fn tick(&mut self, handle: &dyn AnimationHandle, now: Instant) -> Option<SyncStats> {
        if !self.scheduler.poll(self.generation, now) {
            return None;
        }
        Some(self.bindings.sync_all(handle, false))
    }

    /// Sync immediately
    pub fn sync_now(&mut self, handle: &dyn AnimationHandle, force: bool) -> SyncStats {
        self.bindings.sync_all(handle, force)
    }

    /// Apply a user edit to the live runtime.
    ///
    /// Returns the fire report for trigger presses.
    pub fn apply_edit(
        &mut self,
        handle: &dyn AnimationHandle,
        edit: ControlEdit,
    ) -> Result<Option<FireReport>, BindingError> {
        let id = edit.id();
        let Some(binding) = self.bindings.get_mut(id) else {
            return Err(BindingError::NotAvailable {
                path: format!("binding {}", id.0),
            });
        };
        let path = binding.descriptor.path.clone();

        if let ControlEdit::Focus { focused, .. } = edit {
            binding.focused = focused;
            return Ok(None);
        }

        if let ControlEdit::Fire { .. } = edit {
            if binding.descriptor.kind != InputKind::Trigger {
                return Err(BindingError::KindMismatch {
                    path,
                    expected: InputKind::Trigger,
                    found: binding.descriptor.kind,
                });
            }
            let report = fire_trigger(handle, &binding.descriptor);
            self.status = Some(report.status(&path));
            return Ok(Some(report));
        }

        let Some(accessor) = resolve_live(handle, &binding.descriptor) else {
            binding.enabled = false;
            tracing::debug!("No live accessor for {path}; edit dropped");
            return Err(BindingError::NotAvailable { path });
        };

        match edit {
            ControlEdit::Number { text, .. } => {
                let value = text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
                    BindingError::InvalidValue {
                        path: path.clone(),
                        reason: format!("{text:?} is not a number"),
                    }
                })?;
                accessor.write(&path, InputValue::Number(value))?;
                binding.widget = WidgetState::Number { text };
            }
            ControlEdit::Boolean { checked, .. } => {
                accessor.write(&path, InputValue::Boolean(checked))?;
                binding.widget = WidgetState::Boolean { checked };
            }
            ControlEdit::Text { text, .. } => {
                accessor.write(&path, InputValue::String(text.clone()))?;
                binding.widget = WidgetState::Text { text };
            }
            ControlEdit::Enum { selected, .. } => {
                accessor.write(&path, InputValue::Enum(selected.clone()))?;
                if let WidgetState::Enum { selected: current, .. } = &mut binding.widget {
                    *current = selected;
                }
            }
            ControlEdit::Color { rgb, alpha_text, .. } => {
                let percent = parse_alpha_percent(&alpha_text);
                let alpha = percent_to_alpha_byte(percent);
                accessor.write_argb(&path, alpha, rgb[0], rgb[1], rgb[2])?;
                binding.widget = WidgetState::Color {
                    rgb,
                    alpha_text: format!("{percent}"),
                };
            }
            ControlEdit::Focus { .. } | ControlEdit::Fire { .. } => {}
        }
        tracing::trace!("Wrote {path}");
        Ok(None)
    }

    /// Top-level sections
    pub fn sections(&self) -> &[ControlSection] {
        &self.sections
    }

    /// Registered bindings
    pub fn bindings(&self) -> &BindingSet {
        &self.bindings
    }

    /// Registered bindings, for editing draft widget text
    pub fn bindings_mut(&mut self) -> &mut BindingSet {
        &mut self.bindings
    }

    /// Sections alongside mutable bindings, for drawing
    pub fn parts_mut(&mut self) -> (&[ControlSection], &mut BindingSet) {
        (&self.sections, &mut self.bindings)
    }

    /// ViewModel hierarchy of the current render
    pub fn view_model_hierarchy(&self) -> Option<&HierarchyNode> {
        self.view_model.as_ref()
    }

    /// State-machine hierarchy of the current render
    pub fn state_machine_hierarchy(&self) -> Option<&HierarchyNode> {
        self.state_machines.as_ref()
    }

    /// Total rendered controls
    pub fn total_controls(&self) -> usize {
        self.bindings.len()
    }

    /// Message to show instead of controls
    pub fn empty_message(&self) -> Option<&str> {
        self.empty_message.as_deref()
    }

    /// Result of the last trigger press
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Current binding generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the sync timer is armed
    pub fn is_syncing(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Time until the next sync tick
    pub fn next_sync_in(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(DEFAULT_ACCENTS.to_vec(), DEFAULT_SYNC_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::InputSource;
    use crate::memory::MemoryRuntime;

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {
                    "speed": Number(1.0),
                    "title": String("hi"),
                    "tint": Color(4278190080),
                    "go": Trigger(Fire),
                    "group": Nested((properties: {
                        "deep": Nested((properties: {"flag": Boolean(false)})),
                    })),
                })),
                state_machines: [(name: "Main", inputs: [(name: "go", value: Trigger)])],
            )"#,
        )
        .unwrap()
    }

    fn id_for(panel: &ControlPanel, path: &str) -> BindingId {
        panel.bindings().find_by_path(path).unwrap().id
    }

    #[test]
    fn test_sections_follow_depth() {
        let runtime = runtime();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        assert_eq!(panel.total_controls(), 6);
        assert!(panel.empty_message().is_none());
        assert!(panel.is_syncing());

        let sections = panel.sections();
        assert_eq!(sections.len(), 2);
        let vm = &sections[0];
        assert!(vm.default_open);
        assert_eq!(vm.badge, 5);
        let group = &vm.children[0];
        let deep = &group.children[0];
        assert_eq!((group.depth, deep.depth), (1, 2));
        assert!(!group.default_open);
        assert_eq!(deep.accent, DEFAULT_ACCENTS[2]);

        let machines = &sections[1];
        assert_eq!(machines.kind, NodeKind::StateMachines);
        assert!(!machines.default_open);
        assert!(!machines.children[0].default_open);
    }

    #[test]
    fn test_accent_cycles_with_small_palette() {
        let runtime = runtime();
        let mut panel = ControlPanel::new(vec![[1, 1, 1], [2, 2, 2]], DEFAULT_SYNC_INTERVAL);
        panel.render(&runtime, Instant::now());
        let deep = &panel.sections()[0].children[0].children[0];
        assert_eq!(deep.accent, [1, 1, 1]);
    }

    #[test]
    fn test_edits_write_back() {
        let runtime = runtime();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        let speed = id_for(&panel, "speed");
        panel
            .apply_edit(&runtime, ControlEdit::Number { id: speed, text: "2.25".into() })
            .unwrap();
        assert_eq!(runtime.read("speed"), Some(InputValue::Number(2.25)));
        assert!(panel
            .apply_edit(&runtime, ControlEdit::Number { id: speed, text: "abc".into() })
            .is_err());

        let flag = id_for(&panel, "group/deep/flag");
        panel
            .apply_edit(&runtime, ControlEdit::Boolean { id: flag, checked: true })
            .unwrap();
        assert_eq!(runtime.read("group/deep/flag"), Some(InputValue::Boolean(true)));

        let tint = id_for(&panel, "tint");
        panel
            .apply_edit(
                &runtime,
                ControlEdit::Color { id: tint, rgb: [0x33, 0x66, 0x99], alpha_text: "50".into() },
            )
            .unwrap();
        let Some(InputValue::Color(argb)) = runtime.read("tint") else {
            panic!("tint is not a colour");
        };
        let [a, r, g, b] = argb.to_be_bytes();
        assert!((i32::from(a) - 128).abs() <= 1);
        assert_eq!((r, g, b), (0x33, 0x66, 0x99));
    }

    #[test]
    fn test_fire_reports_state_machine_matches() {
        let runtime = runtime();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        let go = id_for(&panel, "go");
        let report = panel.apply_edit(&runtime, ControlEdit::Fire { id: go }).unwrap().unwrap();
        assert!(report.view_model_fired);
        assert_eq!(report.state_machine_matches, 1);
        assert_eq!(runtime.fire_count("go"), 1);
        assert!(panel.status().unwrap().contains("+1"));
    }

    #[test]
    fn test_merged_paths_are_unique() {
        let runtime = MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {
                    "stateMachine": Nested((properties: {
                        "Main": Nested((properties: {"jump": Trigger(Fire)})),
                    })),
                })),
                state_machines: [(name: "Main", inputs: [
                    (name: "jump", value: Trigger),
                    (name: "run", value: Trigger),
                ])],
            )"#,
        )
        .unwrap();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        let paths: Vec<_> = panel.bindings().iter().map(|b| b.descriptor.path.clone()).collect();
        let unique: HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), paths.len());
        assert_eq!(paths, vec!["stateMachine/Main/jump", "stateMachine/Main/run"]);

        let jump = panel.bindings().find_by_path("stateMachine/Main/jump").unwrap();
        assert_eq!(jump.descriptor.source, InputSource::ViewModel);
        let machines = panel.state_machine_hierarchy().unwrap();
        assert_eq!(machines.count_all_inputs(), 1);
    }

    #[test]
    fn test_fully_shadowed_state_machine_is_dropped() {
        let runtime = MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {
                    "stateMachine": Nested((properties: {
                        "Main": Nested((properties: {"jump": Trigger(Fire)})),
                    })),
                })),
                state_machines: [(name: "Main", inputs: [(name: "jump", value: Trigger)])],
            )"#,
        )
        .unwrap();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        assert_eq!(panel.total_controls(), 1);
        assert!(panel.state_machine_hierarchy().is_none());
        assert_eq!(panel.sections().len(), 1);
        assert_eq!(panel.sections()[0].kind, NodeKind::ViewModel);
    }

    #[test]
    fn test_fire_rejects_non_trigger_binding() {
        let runtime = MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {"jump": Number(1.0)})),
                state_machines: [(name: "Main", inputs: [(name: "jump", value: Trigger)])],
            )"#,
        )
        .unwrap();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        let jump = id_for(&panel, "jump");
        let result = panel.apply_edit(&runtime, ControlEdit::Fire { id: jump });
        assert!(matches!(
            result,
            Err(BindingError::KindMismatch { expected: InputKind::Trigger, found: InputKind::Number, .. })
        ));
        assert_eq!(runtime.state_machine_fire_count("Main", "jump"), 0);
        assert!(panel.status().is_none());
    }

    #[test]
    fn test_leafless_view_model_has_no_section() {
        let runtime = MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {"x": Faulty})),
                state_machines: [(name: "Main", inputs: [(name: "go", value: Trigger)])],
            )"#,
        )
        .unwrap();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());

        assert_eq!(panel.total_controls(), 1);
        assert_eq!(panel.sections().len(), 1);
        assert_eq!(panel.sections()[0].kind, NodeKind::StateMachines);
    }

    #[test]
    fn test_reset_cancels_sync() {
        let runtime = runtime();
        let start = Instant::now();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, start);
        let speed = id_for(&panel, "speed");

        assert!(panel.tick(&runtime, start + Duration::from_millis(100)).is_some());
        panel.reset(MSG_NO_ANIMATION);
        assert!(panel.tick(&runtime, start + Duration::from_secs(5)).is_none());
        assert_eq!(panel.total_controls(), 0);
        assert_eq!(panel.empty_message(), Some(MSG_NO_ANIMATION));
        assert!(panel.apply_edit(&runtime, ControlEdit::Fire { id: speed }).is_err());
    }

    #[test]
    fn test_empty_messages() {
        let mut panel = ControlPanel::default();

        let nothing = MemoryRuntime::from_ron("(artboard: None)").unwrap();
        panel.render(&nothing, Instant::now());
        assert_eq!(panel.empty_message(), Some(MSG_NO_BOUND_INPUTS));

        let bare = MemoryRuntime::from_ron(r#"(view_model: Some((properties: {"x": Faulty})))"#).unwrap();
        panel.render(&bare, Instant::now());
        assert_eq!(panel.empty_message(), Some(MSG_NO_WRITABLE_INPUTS));
        assert!(!panel.is_syncing());
    }
}
