// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adapter traits over the externally owned animation runtime.
//!
//! The runtime exposes its data-binding graph as opaque objects with optional
//! capabilities. Each capability is a trait method returning a
//! [`ProbeResult`]: `Ok(None)` means "not present", `Err` means the runtime
//! failed while answering. Capabilities a runtime does not have keep the
//! default implementation, which reports absence.
//!
//! Everything here is single-threaded and reference counted; the runtime owns
//! the underlying state and these handles only read shape and write leaves.

use crate::error::{ProbeError, ProbeResult};
use std::rc::Rc;

/// Identity of a data-binding instance, used by the traversal cycle guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// One declared property of a data-binding instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    /// Property name as declared by the runtime
    pub name: String,
}

impl PropertyInfo {
    /// Create a property entry
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Numeric scalar property
pub trait NumberProperty {
    /// Current value
    fn value(&self) -> f64;
    /// Replace the value
    fn set_value(&self, value: f64);
}

/// Boolean scalar property
pub trait BooleanProperty {
    /// Current value
    fn value(&self) -> bool;
    /// Replace the value
    fn set_value(&self, value: bool);
}

/// String scalar property
pub trait StringProperty {
    /// Current value
    fn value(&self) -> String;
    /// Replace the value
    fn set_value(&self, value: &str);
}

/// Enumerated string property
pub trait EnumProperty {
    /// Current value
    fn value(&self) -> String;
    /// Replace the value
    fn set_value(&self, value: &str);
    /// Legal values, in declaration order
    fn values(&self) -> Vec<String>;
}

/// Colour property holding a packed 32-bit ARGB value
pub trait ColorProperty {
    /// Current packed ARGB value
    fn value(&self) -> u32;
    /// Replace the packed ARGB value
    fn set_value(&self, argb: u32);
    /// Component setter, alpha first. Runtimes without it report `Unsupported`.
    fn set_argb(&self, _alpha: u8, _red: u8, _green: u8, _blue: u8) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("argb"))
    }
}

/// Fire-only property
pub trait TriggerProperty {
    /// Preferred fire entry point
    fn trigger(&self) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("trigger"))
    }
    /// Older fire entry point
    fn fire(&self) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("fire"))
    }
}

/// Indexed list of sub-instances
pub trait ListProperty {
    /// Number of items
    fn len(&self) -> usize;
    /// Whether the list has no items
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Item at `index`
    fn instance_at(&self, index: usize) -> ProbeResult<Rc<dyn ViewModelInstance>>;
}

/// An externally owned data-binding ("ViewModel") instance.
///
/// Scalar lookups accept either a bare property name or, on a root instance,
/// a slash-delimited path that the runtime resolves itself.
pub trait ViewModelInstance {
    /// Stable identity of the underlying instance
    fn instance_id(&self) -> InstanceId;

    /// Declared properties in runtime order
    fn properties(&self) -> Result<Vec<PropertyInfo>, ProbeError>;

    /// Number accessor for `path`
    fn number(&self, _path: &str) -> ProbeResult<Rc<dyn NumberProperty>> {
        Ok(None)
    }
    /// Boolean accessor for `path`
    fn boolean(&self, _path: &str) -> ProbeResult<Rc<dyn BooleanProperty>> {
        Ok(None)
    }
    /// String accessor for `path`
    fn string(&self, _path: &str) -> ProbeResult<Rc<dyn StringProperty>> {
        Ok(None)
    }
    /// Enum accessor for `path`
    fn enumeration(&self, _path: &str) -> ProbeResult<Rc<dyn EnumProperty>> {
        Ok(None)
    }
    /// Colour accessor for `path`
    fn color(&self, _path: &str) -> ProbeResult<Rc<dyn ColorProperty>> {
        Ok(None)
    }
    /// Trigger accessor for `path`
    fn trigger(&self, _path: &str) -> ProbeResult<Rc<dyn TriggerProperty>> {
        Ok(None)
    }

    /// Nested instance stored under `name`
    fn view_model_instance(&self, _name: &str) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(None)
    }
    /// Legacy alias for [`ViewModelInstance::view_model_instance`]
    fn view_model(&self, _name: &str) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(None)
    }
    /// List of instances stored under `name`
    fn list(&self, _name: &str) -> ProbeResult<Rc<dyn ListProperty>> {
        Ok(None)
    }
}

/// A ViewModel definition, used when no instance was auto-bound
pub trait ViewModelDefinition {
    /// The definition's default instance
    fn default_instance(&self) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(None)
    }
    /// A fresh blank instance
    fn instance(&self) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(None)
    }
}

/// Value carried by a state-machine input
#[derive(Debug, Clone, PartialEq)]
pub enum StateMachineValue {
    /// Boolean input
    Boolean(bool),
    /// Number input
    Number(f64),
    /// Anything the bridge does not classify
    Other,
}

/// One input of a running state machine
pub trait StateMachineInput {
    /// Input name
    fn name(&self) -> String;
    /// Current value, if the input carries one
    fn value(&self) -> Option<StateMachineValue>;
    /// Replace the value. Returns false if the input rejected it.
    fn set_value(&self, _value: StateMachineValue) -> bool {
        false
    }
    /// Whether the input exposes a fire operation
    fn can_fire(&self) -> bool {
        false
    }
    /// Fire the input
    fn fire(&self) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("fire"))
    }
}

/// A loaded animation instance, as handed over by the loading pipeline.
pub trait AnimationHandle {
    /// The auto-bound root ViewModel instance, if any
    fn view_model_instance(&self) -> Option<Rc<dyn ViewModelInstance>>;

    /// The artboard's default ViewModel definition
    fn default_view_model(&self) -> ProbeResult<Rc<dyn ViewModelDefinition>> {
        Ok(None)
    }

    /// Names of the artboard's state machines
    fn state_machine_names(&self) -> Vec<String>;

    /// Inputs of the named state machine
    fn state_machine_inputs(&self, name: &str) -> ProbeResult<Vec<Rc<dyn StateMachineInput>>>;

    /// Name of the active artboard
    fn artboard_name(&self) -> Option<String> {
        None
    }

    /// Resume playback
    fn play(&self) {}
    /// Pause playback
    fn pause(&self) {}
    /// Restart from the initial state
    fn reset(&self) {}
    /// Release runtime resources
    fn cleanup(&self) {}
}

/// Run a capability call, folding errors into absence.
pub(crate) fn probe_call<T>(capability: &str, subject: &str, call: impl FnOnce() -> ProbeResult<T>) -> Option<T> {
    match call() {
        Ok(found) => found,
        Err(error) => {
            tracing::trace!("{capability}({subject}) failed: {error}");
            None
        }
    }
}

/// Resolve the root ViewModel instance of a loaded animation.
///
/// Uses the auto-bound instance first, then the default ViewModel's default
/// instance, then a fresh instance of it.
pub fn resolve_view_model_root(handle: &dyn AnimationHandle) -> Option<Rc<dyn ViewModelInstance>> {
    if let Some(instance) = handle.view_model_instance() {
        return Some(instance);
    }

    let definition = match handle.default_view_model() {
        Ok(Some(definition)) => definition,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!("Unable to resolve default ViewModel instance: {error}");
            return None;
        }
    };

    probe_call("defaultInstance", "", || definition.default_instance())
        .or_else(|| probe_call("instance", "", || definition.instance()))
}
