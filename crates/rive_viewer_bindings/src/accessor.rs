// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed accessors and the capability probe.
//!
//! [`probe`] is the only place that asks a runtime object "what is this
//! property?". It tries each scalar capability in a fixed order and wraps the
//! first hit in an [`Accessor`], so the rest of the crate works with one
//! closed enum instead of scattered capability calls.

use crate::error::BindingError;
use crate::runtime::{
    probe_call, BooleanProperty, ColorProperty, EnumProperty, NumberProperty, StringProperty,
    TriggerProperty, ViewModelInstance,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Classified kind of an addressable leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Free-form number
    Number,
    /// Checkbox
    Boolean,
    /// Free text
    String,
    /// One of an enumerated set of strings
    Enum,
    /// Packed ARGB colour
    Color,
    /// Fire-only, no readable value
    Trigger,
}

impl InputKind {
    /// Probe order; also the deterministic tie-break between kinds.
    pub const PROBE_ORDER: [InputKind; 6] = [
        InputKind::Number,
        InputKind::Boolean,
        InputKind::String,
        InputKind::Enum,
        InputKind::Color,
        InputKind::Trigger,
    ];

    /// Lowercase name, as shown next to control labels
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Color => "color",
            Self::Trigger => "trigger",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value read from or written to an accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    /// Number value
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// String value
    String(String),
    /// Enum value
    Enum(String),
    /// Packed ARGB colour
    Color(u32),
}

impl InputValue {
    /// Kind this value belongs to
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Number(_) => InputKind::Number,
            Self::Boolean(_) => InputKind::Boolean,
            Self::String(_) => InputKind::String,
            Self::Enum(_) => InputKind::Enum,
            Self::Color(_) => InputKind::Color,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::String(value) | Self::Enum(value) => write!(f, "{value:?}"),
            Self::Color(value) => write!(f, "0x{value:08X}"),
        }
    }
}

/// A live, capability-specific handle to one leaf.
///
/// Accessors are never cached across passes; callers re-probe through the
/// resolver every time they read, write or fire.
#[derive(Clone)]
pub enum Accessor {
    /// Number leaf
    Number(Rc<dyn NumberProperty>),
    /// Boolean leaf
    Boolean(Rc<dyn BooleanProperty>),
    /// String leaf
    String(Rc<dyn StringProperty>),
    /// Enum leaf
    Enum(Rc<dyn EnumProperty>),
    /// Colour leaf
    Color(Rc<dyn ColorProperty>),
    /// Trigger leaf
    Trigger(Rc<dyn TriggerProperty>),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor::{:?}", self.kind())
    }
}

impl Accessor {
    /// Kind of this accessor
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Number(_) => InputKind::Number,
            Self::Boolean(_) => InputKind::Boolean,
            Self::String(_) => InputKind::String,
            Self::Enum(_) => InputKind::Enum,
            Self::Color(_) => InputKind::Color,
            Self::Trigger(_) => InputKind::Trigger,
        }
    }

    /// Read the current value. Triggers have none.
    pub fn read(&self) -> Option<InputValue> {
        match self {
            Self::Number(acc) => Some(InputValue::Number(acc.value())),
            Self::Boolean(acc) => Some(InputValue::Boolean(acc.value())),
            Self::String(acc) => Some(InputValue::String(acc.value())),
            Self::Enum(acc) => Some(InputValue::Enum(acc.value())),
            Self::Color(acc) => Some(InputValue::Color(acc.value())),
            Self::Trigger(_) => None,
        }
    }

    /// Legal values of an enum accessor; empty for every other kind
    pub fn enum_values(&self) -> Vec<String> {
        match self {
            Self::Enum(acc) => acc.values(),
            _ => Vec::new(),
        }
    }

    /// Write a value of the matching kind.
    ///
    /// `path` is only used to describe failures.
    pub fn write(&self, path: &str, value: InputValue) -> Result<(), BindingError> {
        match (self, value) {
            (Self::Number(acc), InputValue::Number(number)) => {
                if !number.is_finite() {
                    return Err(BindingError::InvalidValue {
                        path: path.to_string(),
                        reason: format!("{number} is not a finite number"),
                    });
                }
                acc.set_value(number);
            }
            (Self::Boolean(acc), InputValue::Boolean(flag)) => acc.set_value(flag),
            (Self::String(acc), InputValue::String(text)) => acc.set_value(&text),
            (Self::Enum(acc), InputValue::Enum(choice)) => {
                let values = acc.values();
                if !values.is_empty() && !values.contains(&choice) {
                    return Err(BindingError::InvalidValue {
                        path: path.to_string(),
                        reason: format!("{choice:?} is not one of {values:?}"),
                    });
                }
                acc.set_value(&choice);
            }
            (Self::Color(acc), InputValue::Color(argb)) => acc.set_value(argb),
            (accessor, value) => {
                return Err(BindingError::KindMismatch {
                    path: path.to_string(),
                    expected: value.kind(),
                    found: accessor.kind(),
                });
            }
        }
        Ok(())
    }

    /// Write a colour from components, preferring the runtime's component
    /// setter and falling back to a packed ARGB write.
    pub fn write_argb(&self, path: &str, alpha: u8, red: u8, green: u8, blue: u8) -> Result<(), BindingError> {
        let Self::Color(acc) = self else {
            return Err(BindingError::KindMismatch {
                path: path.to_string(),
                expected: InputKind::Color,
                found: self.kind(),
            });
        };
        if acc.set_argb(alpha, red, green, blue).is_err() {
            acc.set_value(crate::color::rgb_alpha_to_argb(red, green, blue, alpha));
        }
        Ok(())
    }

    /// Fire a trigger accessor through `trigger()`, then `fire()`.
    ///
    /// Returns whether anything fired. Never fails: a trigger that exposes
    /// neither entry point simply does nothing.
    pub fn fire(&self) -> bool {
        let Self::Trigger(acc) = self else {
            return false;
        };
        if acc.trigger().is_ok() {
            return true;
        }
        acc.fire().is_ok()
    }
}

/// Probe `instance` for a scalar accessor at `name`.
///
/// Capabilities are tried in [`InputKind::PROBE_ORDER`]; a capability that
/// errors counts as absent. Returns `None` if nothing matches.
pub fn probe(instance: &dyn ViewModelInstance, name: &str) -> Option<Accessor> {
    InputKind::PROBE_ORDER
        .iter()
        .find_map(|kind| probe_kind(instance, name, *kind))
}

/// Probe a single capability.
pub fn probe_kind(instance: &dyn ViewModelInstance, name: &str, kind: InputKind) -> Option<Accessor> {
    match kind {
        InputKind::Number => probe_call("number", name, || instance.number(name)).map(Accessor::Number),
        InputKind::Boolean => probe_call("boolean", name, || instance.boolean(name)).map(Accessor::Boolean),
        InputKind::String => probe_call("string", name, || instance.string(name)).map(Accessor::String),
        InputKind::Enum => probe_call("enum", name, || instance.enumeration(name)).map(Accessor::Enum),
        InputKind::Color => probe_call("color", name, || instance.color(name)).map(Accessor::Color),
        InputKind::Trigger => probe_call("trigger", name, || instance.trigger(name)).map(Accessor::Trigger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRuntime, RuntimeDocument};

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::from_ron(
            r#"(
                view_model: Some((
                    properties: {
                        "speed": Number(2.5),
                        "visible": Boolean(true),
                        "title": String("hello"),
                        "mode": Enum(value: "idle", values: ["idle", "run"]),
                        "tint": Color(4281558681),
                        "go": Trigger(Trigger),
                        "broken": Faulty,
                    },
                )),
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn test_probe_classifies_each_kind() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        let kinds: Vec<_> = ["speed", "visible", "title", "mode", "tint", "go"]
            .iter()
            .map(|name| probe(root.as_ref(), name).map(|acc| acc.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(InputKind::Number),
                Some(InputKind::Boolean),
                Some(InputKind::String),
                Some(InputKind::Enum),
                Some(InputKind::Color),
                Some(InputKind::Trigger),
            ]
        );
    }

    #[test]
    fn test_probe_treats_errors_as_absent() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        assert!(probe(root.as_ref(), "broken").is_none());
        assert!(probe(root.as_ref(), "missing").is_none());
    }

    #[test]
    fn test_write_rejects_wrong_kind_and_bad_values() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        let speed = probe(root.as_ref(), "speed").unwrap();
        assert!(matches!(
            speed.write("speed", InputValue::Boolean(true)),
            Err(BindingError::KindMismatch { .. })
        ));
        assert!(matches!(
            speed.write("speed", InputValue::Number(f64::NAN)),
            Err(BindingError::InvalidValue { .. })
        ));

        let mode = probe(root.as_ref(), "mode").unwrap();
        assert!(mode.write("mode", InputValue::Enum("fly".into())).is_err());
        mode.write("mode", InputValue::Enum("run".into())).unwrap();
        assert_eq!(mode.read(), Some(InputValue::Enum("run".into())));
        assert_eq!(mode.enum_values(), vec!["idle".to_string(), "run".to_string()]);
    }

    #[test]
    fn test_trigger_has_no_value() {
        let runtime = runtime();
        let root = runtime.root().unwrap();
        let go = probe(root.as_ref(), "go").unwrap();
        assert_eq!(go.read(), None);
        assert!(go.fire());
        assert_eq!(runtime.fire_count("go"), 1);
    }

    #[test]
    fn test_document_default_is_empty() {
        let document = RuntimeDocument::default();
        assert!(document.view_model.is_none());
        assert!(document.state_machines.is_empty());
    }
}
