// SPDX-License-Identifier: MIT OR Apache-2.0
//! State-machine input bridge.
//!
//! State machines expose a flat, name-addressed list of boolean, number and
//! trigger inputs. They are addressed as `stateMachine/<machine>/<input>` and
//! wrapped in the same [`Accessor`] variants as ViewModel leaves.

use crate::accessor::{Accessor, InputKind};
use crate::error::ProbeError;
use crate::hierarchy::{Descriptor, HierarchyNode, NodeKind};
use crate::runtime::{
    probe_call, AnimationHandle, BooleanProperty, NumberProperty, StateMachineInput, StateMachineValue,
    TriggerProperty,
};
use std::collections::HashSet;
use std::rc::Rc;

/// Leading path segment of every state-machine input
pub const STATE_MACHINE_PATH_PREFIX: &str = "stateMachine";

/// Address of a state-machine input
pub fn state_machine_path(machine: &str, input: &str) -> String {
    format!("{STATE_MACHINE_PATH_PREFIX}/{machine}/{input}")
}

/// Classify an input: fire operation ⇒ trigger, then by value type.
/// Inputs of any other type are skipped.
pub fn classify_input(input: &dyn StateMachineInput) -> Option<InputKind> {
    if input.can_fire() {
        return Some(InputKind::Trigger);
    }
    match input.value()? {
        StateMachineValue::Boolean(_) => Some(InputKind::Boolean),
        StateMachineValue::Number(_) => Some(InputKind::Number),
        StateMachineValue::Other => None,
    }
}

fn machine_inputs(handle: &dyn AnimationHandle, machine: &str) -> Vec<Rc<dyn StateMachineInput>> {
    probe_call("stateMachineInputs", machine, || handle.state_machine_inputs(machine)).unwrap_or_default()
}

/// Build the state-machine group.
///
/// Returns `None` if no state machine has a classifiable input.
pub fn build_state_machine_hierarchy(handle: &dyn AnimationHandle) -> Option<HierarchyNode> {
    let mut group = HierarchyNode::new("State Machines", STATE_MACHINE_PATH_PREFIX, NodeKind::StateMachines);
    let mut seen = HashSet::new();

    for machine in handle.state_machine_names() {
        let mut node = HierarchyNode::new(
            machine.clone(),
            format!("{STATE_MACHINE_PATH_PREFIX}/{machine}"),
            NodeKind::StateMachine,
        );
        for input in machine_inputs(handle, &machine) {
            let name = input.name();
            let Some(kind) = classify_input(input.as_ref()) else {
                continue;
            };
            let path = state_machine_path(&machine, &name);
            if !seen.insert(path.clone()) {
                continue;
            }
            node.inputs.push(Descriptor::state_machine(&machine, name, path, kind));
        }
        if !node.inputs.is_empty() {
            group.children.push(node);
        }
    }

    if group.children.is_empty() {
        return None;
    }
    tracing::debug!("State machine inputs: {}", group.count_all_inputs());
    Some(group)
}

/// Re-acquire a live accessor for one state-machine input.
///
/// Re-fetches the input list on every call. A kind mismatch counts as absent.
pub fn resolve_state_machine_accessor(
    handle: &dyn AnimationHandle,
    machine: &str,
    input_name: &str,
    expected: Option<InputKind>,
) -> Option<Accessor> {
    let input = machine_inputs(handle, machine)
        .into_iter()
        .find(|input| input.name() == input_name)?;
    let kind = classify_input(input.as_ref())?;
    if expected.is_some_and(|expected| expected != kind) {
        return None;
    }
    Some(match kind {
        InputKind::Boolean => Accessor::Boolean(Rc::new(InputAdapter(input))),
        InputKind::Number => Accessor::Number(Rc::new(InputAdapter(input))),
        InputKind::Trigger => Accessor::Trigger(Rc::new(InputAdapter(input))),
        _ => return None,
    })
}

/// Fire every trigger input called `name`, across all state machines.
/// Returns how many fired.
pub fn fire_state_machine_inputs_named(handle: &dyn AnimationHandle, name: &str) -> usize {
    let mut fired = 0;
    for machine in handle.state_machine_names() {
        for input in machine_inputs(handle, &machine) {
            if input.name() != name || !input.can_fire() {
                continue;
            }
            match input.fire() {
                Ok(()) => fired += 1,
                Err(error) => tracing::trace!("fire({machine}/{name}) failed: {error}"),
            }
        }
    }
    fired
}

/// Presents a state-machine input through the scalar property traits
struct InputAdapter(Rc<dyn StateMachineInput>);

impl NumberProperty for InputAdapter {
    fn value(&self) -> f64 {
        match self.0.value() {
            Some(StateMachineValue::Number(value)) => value,
            _ => 0.0,
        }
    }

    fn set_value(&self, value: f64) {
        if !self.0.set_value(StateMachineValue::Number(value)) {
            tracing::trace!("state machine input {} rejected {value}", self.0.name());
        }
    }
}

impl BooleanProperty for InputAdapter {
    fn value(&self) -> bool {
        matches!(self.0.value(), Some(StateMachineValue::Boolean(true)))
    }

    fn set_value(&self, value: bool) {
        if !self.0.set_value(StateMachineValue::Boolean(value)) {
            tracing::trace!("state machine input {} rejected {value}", self.0.name());
        }
    }
}

impl TriggerProperty for InputAdapter {
    fn fire(&self) -> Result<(), ProbeError> {
        self.0.fire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::InputValue;
    use crate::memory::MemoryRuntime;

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::from_ron(
            r#"(state_machines: [
                (name: "Main", inputs: [
                    (name: "hover", value: Boolean(false)),
                    (name: "level", value: Number(2.0)),
                    (name: "jump", value: Trigger),
                    (name: "blob", value: Other),
                ]),
                (name: "Idle", inputs: [(name: "jump", value: Trigger)]),
                (name: "Empty", inputs: []),
            ])"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builds_flat_groups() {
        let runtime = runtime();
        let group = build_state_machine_hierarchy(&runtime).unwrap();
        assert_eq!(group.kind, NodeKind::StateMachines);
        assert_eq!(group.children.len(), 2);

        let main = &group.children[0];
        assert!(main.children.is_empty());
        let inputs: Vec<_> = main.inputs.iter().map(|d| (d.path.as_str(), d.kind)).collect();
        assert_eq!(
            inputs,
            vec![
                ("stateMachine/Main/hover", InputKind::Boolean),
                ("stateMachine/Main/level", InputKind::Number),
                ("stateMachine/Main/jump", InputKind::Trigger),
            ]
        );
        assert_eq!(main.inputs[0].state_machine_name.as_deref(), Some("Main"));
    }

    #[test]
    fn test_no_machines_yields_none() {
        let runtime = MemoryRuntime::from_ron("(state_machines: [])").unwrap();
        assert!(build_state_machine_hierarchy(&runtime).is_none());
    }

    #[test]
    fn test_live_accessors_write_through() {
        let runtime = runtime();
        let level = resolve_state_machine_accessor(&runtime, "Main", "level", Some(InputKind::Number)).unwrap();
        level.write("level", InputValue::Number(7.0)).unwrap();

        let again = resolve_state_machine_accessor(&runtime, "Main", "level", None).unwrap();
        assert_eq!(again.read(), Some(InputValue::Number(7.0)));

        assert!(resolve_state_machine_accessor(&runtime, "Main", "level", Some(InputKind::Boolean)).is_none());
        assert!(resolve_state_machine_accessor(&runtime, "Main", "blob", None).is_none());
        assert!(resolve_state_machine_accessor(&runtime, "Nope", "level", None).is_none());
    }

    #[test]
    fn test_fire_all_matches() {
        let runtime = runtime();
        assert_eq!(fire_state_machine_inputs_named(&runtime, "jump"), 2);
        assert_eq!(runtime.state_machine_fire_count("Main", "jump"), 1);
        assert_eq!(runtime.state_machine_fire_count("Idle", "jump"), 1);
        assert_eq!(fire_state_machine_inputs_named(&runtime, "hover"), 0);

        let jump = resolve_state_machine_accessor(&runtime, "Idle", "jump", Some(InputKind::Trigger)).unwrap();
        assert!(jump.fire());
        assert_eq!(runtime.state_machine_fire_count("Idle", "jump"), 2);
    }
}
