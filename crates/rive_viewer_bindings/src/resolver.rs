// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path resolver: re-acquires live accessors from descriptor paths.
//!
//! Runtime accessor objects are not stable across frames, so every read,
//! write and fire goes through here instead of a cached handle.

use crate::accessor::{probe, Accessor, InputKind};
use crate::hierarchy::{Descriptor, InputSource};
use crate::runtime::{probe_call, resolve_view_model_root, AnimationHandle, ViewModelInstance};
use crate::state_machine::{fire_state_machine_inputs_named, resolve_state_machine_accessor};
use crate::walker::nested_instance;
use std::rc::Rc;

/// Outcome of firing a trigger descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireReport {
    /// A ViewModel trigger fired
    pub view_model_fired: bool,
    /// State-machine inputs that fired
    pub state_machine_matches: usize,
}

impl FireReport {
    /// Whether anything fired at all
    pub fn fired(&self) -> bool {
        self.view_model_fired || self.state_machine_matches > 0
    }

    /// One-line status for the panel
    pub fn status(&self, path: &str) -> String {
        match (self.view_model_fired, self.state_machine_matches) {
            (false, 0) => format!("No trigger fired for {path}"),
            (true, 0) => format!("Fired {path}"),
            (false, 1) => format!("Fired state machine input {path}"),
            (true, matches) => format!("Fired {path} (+{matches} state machine match(es))"),
            (false, matches) => format!("Fired {matches} state machine input(s) named {path}"),
        }
    }
}

/// Resolve `path` against `root`, optionally requiring a kind.
///
/// A bare name resolves directly on the root. Otherwise each parent segment
/// is followed as a nested instance, or as a list name followed by an index
/// segment. Any miss returns `None`.
pub fn resolve_accessor(root: &dyn ViewModelInstance, path: &str, expected: Option<InputKind>) -> Option<Accessor> {
    let accessor = match path.rsplit_once('/') {
        None => probe(root, path)?,
        Some((parents, leaf)) => {
            let terminal = navigate(root, parents)?;
            probe(terminal.as_ref(), leaf)?
        }
    };
    if expected.is_some_and(|expected| expected != accessor.kind()) {
        return None;
    }
    Some(accessor)
}

/// Follow `parents` from `root` to the instance owning the leaf.
fn navigate(root: &dyn ViewModelInstance, parents: &str) -> Option<Rc<dyn ViewModelInstance>> {
    let segments: Vec<&str> = parents.split('/').collect();
    let mut current: Option<Rc<dyn ViewModelInstance>> = None;
    let mut index = 0;

    while index < segments.len() {
        let segment = segments[index];
        let instance: &dyn ViewModelInstance = match &current {
            Some(current) => current.as_ref(),
            None => root,
        };

        if let Some(nested) = nested_instance(instance, segment) {
            current = Some(nested);
            index += 1;
            continue;
        }

        let item = segments
            .get(index + 1)
            .and_then(|raw| raw.parse::<usize>().ok())
            .and_then(|position| {
                let list = probe_call("list", segment, || instance.list(segment))?;
                probe_call("instanceAt", segment, || list.instance_at(position))
            });
        match item {
            Some(item) => {
                current = Some(item);
                index += 2;
            }
            None => {
                tracing::warn!("ViewModel path navigation failed at `{segment}` in `{parents}`");
                return None;
            }
        }
    }
    current
}

/// Live accessor for a descriptor, from whichever source it came from
pub fn resolve_live(handle: &dyn AnimationHandle, descriptor: &Descriptor) -> Option<Accessor> {
    match descriptor.source {
        InputSource::ViewModel => {
            let root = resolve_view_model_root(handle)?;
            resolve_accessor(root.as_ref(), &descriptor.path, Some(descriptor.kind))
        }
        InputSource::StateMachine => {
            let machine = descriptor.state_machine_name.as_deref()?;
            resolve_state_machine_accessor(handle, machine, &descriptor.name, Some(descriptor.kind))
        }
    }
}

/// Fire a trigger descriptor.
///
/// ViewModel triggers also fire every state-machine trigger input with the
/// same bare name. Never fails; the report says what happened.
pub fn fire_trigger(handle: &dyn AnimationHandle, descriptor: &Descriptor) -> FireReport {
    let mut report = FireReport::default();
    match descriptor.source {
        InputSource::ViewModel => {
            report.view_model_fired = resolve_live(handle, descriptor).is_some_and(|accessor| accessor.fire());
            report.state_machine_matches = fire_state_machine_inputs_named(handle, &descriptor.name);
        }
        InputSource::StateMachine => {
            if resolve_live(handle, descriptor).is_some_and(|accessor| accessor.fire()) {
                report.state_machine_matches = 1;
            }
        }
    }

    if report.fired() {
        tracing::info!("{}", report.status(&descriptor.path));
    } else {
        tracing::info!("Trigger {} did not fire", descriptor.path);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::InputValue;
    use crate::memory::MemoryRuntime;
    use crate::walker::build_hierarchy;

    const SCENE: &str = r#"(
        view_model: Some((properties: {
            "a": Number(1.0),
            "group": Nested((properties: {
                "b": Boolean(true),
                "mode": Enum(value: "idle", values: ["idle", "run"]),
                "list": List([
                    (properties: {"c": String("x")}),
                    (properties: {"c": String("y")}),
                ]),
            })),
            "jump": Trigger(Trigger),
            "legacy": Trigger(Fire),
            "dead": Trigger(Inert),
        })),
        state_machines: [
            (name: "Main", inputs: [(name: "jump", value: Trigger), (name: "dead", value: Trigger)]),
            (name: "Other", inputs: [(name: "jump", value: Trigger)]),
        ],
    )"#;

    #[test]
    fn test_resolves_every_walked_leaf() {
        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let root = runtime.root().unwrap();
        let tree = build_hierarchy(Some(root.as_ref())).unwrap();
        for descriptor in tree.descriptors() {
            let accessor = resolve_accessor(root.as_ref(), &descriptor.path, Some(descriptor.kind));
            assert!(accessor.is_some(), "{} did not resolve", descriptor.path);
        }
    }

    #[test]
    fn test_round_trip_through_fresh_resolves() {
        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let root = runtime.root().unwrap();
        let cases = [
            ("a", InputValue::Number(4.5)),
            ("group/b", InputValue::Boolean(false)),
            ("group/list/1/c", InputValue::String("changed".into())),
            ("group/mode", InputValue::Enum("run".into())),
        ];
        for (path, value) in cases {
            let accessor = resolve_accessor(root.as_ref(), path, Some(value.kind())).unwrap();
            accessor.write(path, value.clone()).unwrap();
            let fresh = resolve_accessor(root.as_ref(), path, None).unwrap();
            assert_eq!(fresh.read(), Some(value), "{path}");
        }
    }

    #[test]
    fn test_misses_return_none() {
        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let root = runtime.root().unwrap();
        assert!(resolve_accessor(root.as_ref(), "a", Some(InputKind::Boolean)).is_none());
        assert!(resolve_accessor(root.as_ref(), "group/list/9/c", None).is_none());
        assert!(resolve_accessor(root.as_ref(), "group/list/x/c", None).is_none());
        assert!(resolve_accessor(root.as_ref(), "nowhere/b", None).is_none());
        assert!(resolve_accessor(root.as_ref(), "missing", None).is_none());

        runtime.remove("group/b");
        assert!(resolve_accessor(root.as_ref(), "group/b", None).is_none());
    }

    #[test]
    fn test_trigger_fire_never_fails() {
        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let jump = Descriptor::view_model("jump", "jump", InputKind::Trigger);
        let legacy = Descriptor::view_model("legacy", "legacy", InputKind::Trigger);
        let dead = Descriptor::view_model("dead", "dead", InputKind::Trigger);

        for _ in 0..3 {
            let report = fire_trigger(&runtime, &jump);
            assert!(report.view_model_fired);
            assert_eq!(report.state_machine_matches, 2);

            assert!(fire_trigger(&runtime, &legacy).view_model_fired);

            let report = fire_trigger(&runtime, &dead);
            assert!(!report.view_model_fired);
            assert_eq!(report.state_machine_matches, 1);
        }
        assert_eq!(runtime.fire_count("jump"), 3);
        assert_eq!(runtime.fire_count("legacy"), 3);
        assert_eq!(runtime.fire_count("dead"), 0);
        assert_eq!(runtime.state_machine_fire_count("Other", "jump"), 3);
    }

    #[test]
    fn test_state_machine_descriptor_fires_only_itself() {
        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let descriptor = Descriptor::state_machine("Other", "jump", "stateMachine/Other/jump", InputKind::Trigger);
        let report = fire_trigger(&runtime, &descriptor);
        assert_eq!(report, FireReport { view_model_fired: false, state_machine_matches: 1 });
        assert_eq!(runtime.state_machine_fire_count("Main", "jump"), 0);
        assert_eq!(runtime.fire_count("jump"), 0);
    }

    #[test]
    fn test_report_status() {
        let report = FireReport { view_model_fired: true, state_machine_matches: 2 };
        assert_eq!(report.status("jump"), "Fired jump (+2 state machine match(es))");
        assert_eq!(FireReport::default().status("x"), "No trigger fired for x");
    }
}
