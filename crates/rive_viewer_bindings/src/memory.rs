// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory animation runtime.
//!
//! Implements the runtime adapter traits over an arena of instances, loaded
//! from a RON [`RuntimeDocument`]. The desktop app uses it as its runtime
//! backend and the tests use it as a fixture graph. Instances may be linked
//! by name, so documents can describe cyclic graphs.
//!
//! Like the real runtime, scalar lookups on any instance accept compound
//! slash paths (`group/list/0/label`) and resolve the chain themselves.

use crate::accessor::InputValue;
use crate::error::{ProbeError, ProbeResult, Result, ViewerError};
use crate::runtime::{
    AnimationHandle, BooleanProperty, ColorProperty, EnumProperty, InstanceId, ListProperty,
    NumberProperty, PropertyInfo, StateMachineInput, StateMachineValue, StringProperty,
    TriggerProperty, ViewModelDefinition, ViewModelInstance,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

// ============================================================================
// Document format
// ============================================================================

/// Serialized description of a loaded animation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeDocument {
    /// Artboard name
    pub artboard: Option<String>,
    /// Whether the root instance is auto-bound. When false it is only
    /// reachable through the default ViewModel definition.
    pub auto_bound: Option<bool>,
    /// Root ViewModel instance
    pub view_model: Option<InstanceDocument>,
    /// State machines and their inputs
    pub state_machines: Vec<StateMachineDocument>,
}

/// One ViewModel instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceDocument {
    /// Optional name other slots can link to
    pub id: Option<String>,
    /// Properties in declaration order
    pub properties: IndexMap<String, SlotDocument>,
}

/// How a trigger property can be fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerStyle {
    /// Exposes `trigger()`
    #[default]
    Trigger,
    /// Exposes only the older `fire()`
    Fire,
    /// Exposes neither
    Inert,
}

/// Value of one property slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SlotDocument {
    /// Number property
    Number(f64),
    /// Boolean property
    Boolean(bool),
    /// String property
    String(String),
    /// Enum property
    Enum {
        /// Current value
        value: String,
        /// Legal values
        values: Vec<String>,
    },
    /// Packed ARGB colour property
    Color(u32),
    /// Trigger property
    Trigger(TriggerStyle),
    /// Nested instance
    Nested(InstanceDocument),
    /// List of instances
    List(Vec<InstanceDocument>),
    /// Reference to an instance declared elsewhere with a matching `id`
    Link(String),
    /// Every capability call on this slot fails
    Faulty,
}

/// One state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateMachineDocument {
    /// State machine name
    pub name: String,
    /// Inputs in declaration order
    pub inputs: Vec<StateMachineInputDocument>,
}

/// One state-machine input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMachineInputDocument {
    /// Input name
    pub name: String,
    /// Input type and initial value
    pub value: StateMachineInputValue,
}

/// Type and initial value of a state-machine input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StateMachineInputValue {
    /// Boolean input
    Boolean(bool),
    /// Number input
    Number(f64),
    /// Trigger input
    Trigger,
    /// Input of a type the viewer does not support
    Other,
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Clone)]
enum Slot {
    Number(f64),
    Boolean(bool),
    String(String),
    Enum { value: String, values: Vec<String> },
    Color(u32),
    Trigger { style: TriggerStyle, fired: usize },
    Nested(usize),
    List(Vec<usize>),
    Link(String),
    Faulty,
}

#[derive(Debug, Default)]
struct InstanceData {
    properties: IndexMap<String, Slot>,
}

#[derive(Debug)]
struct MachineInput {
    name: String,
    value: StateMachineInputValue,
    fired: usize,
}

#[derive(Debug)]
struct Machine {
    name: String,
    inputs: Vec<MachineInput>,
}

#[derive(Debug, Default)]
struct Arena {
    instances: Vec<InstanceData>,
    named: HashMap<String, usize>,
    machines: Vec<Machine>,
}

impl Arena {
    fn add_instance(&mut self, document: &InstanceDocument) -> usize {
        let index = self.instances.len();
        self.instances.push(InstanceData::default());
        if let Some(id) = &document.id {
            self.named.insert(id.clone(), index);
        }

        let mut properties = IndexMap::with_capacity(document.properties.len());
        for (name, slot) in &document.properties {
            let slot = match slot {
                SlotDocument::Number(value) => Slot::Number(*value),
                SlotDocument::Boolean(value) => Slot::Boolean(*value),
                SlotDocument::String(value) => Slot::String(value.clone()),
                SlotDocument::Enum { value, values } => Slot::Enum {
                    value: value.clone(),
                    values: values.clone(),
                },
                SlotDocument::Color(value) => Slot::Color(*value),
                SlotDocument::Trigger(style) => Slot::Trigger { style: *style, fired: 0 },
                SlotDocument::Nested(child) => Slot::Nested(self.add_instance(child)),
                SlotDocument::List(items) => {
                    Slot::List(items.iter().map(|item| self.add_instance(item)).collect())
                }
                SlotDocument::Link(target) => Slot::Link(target.clone()),
                SlotDocument::Faulty => Slot::Faulty,
            };
            properties.insert(name.clone(), slot);
        }
        self.instances[index].properties = properties;
        index
    }

    fn validate_links(&self) -> Result<()> {
        for instance in &self.instances {
            for (name, slot) in &instance.properties {
                if let Slot::Link(target) = slot {
                    if !self.named.contains_key(target) {
                        return Err(ViewerError::Document(format!(
                            "property `{name}` links to unknown instance `{target}`"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn slot(&self, instance: usize, name: &str) -> Option<&Slot> {
        self.instances.get(instance)?.properties.get(name)
    }

    fn slot_mut(&mut self, instance: usize, name: &str) -> Option<&mut Slot> {
        self.instances.get_mut(instance)?.properties.get_mut(name)
    }

    /// Instance stored directly under `name` (nested or linked).
    fn child_instance(&self, instance: usize, name: &str) -> Option<usize> {
        match self.slot(instance, name)? {
            Slot::Nested(index) => Some(*index),
            Slot::Link(target) => self.named.get(target).copied(),
            _ => None,
        }
    }

    /// Find the instance and property name a path addresses, starting at
    /// `instance`. A literal property name wins over path navigation.
    fn locate(&self, instance: usize, path: &str) -> Option<(usize, String)> {
        if self.slot(instance, path).is_some() || !path.contains('/') {
            return Some((instance, path.to_string()));
        }

        let segments: Vec<&str> = path.split('/').collect();
        let (leaf, parents) = segments.split_last()?;
        let mut current = instance;
        let mut index = 0;
        while index < parents.len() {
            let segment = parents[index];
            if let Some(child) = self.child_instance(current, segment) {
                current = child;
                index += 1;
                continue;
            }
            if let (Some(Slot::List(items)), Some(position)) = (
                self.slot(current, segment),
                parents.get(index + 1).and_then(|raw| raw.parse::<usize>().ok()),
            ) {
                current = *items.get(position)?;
                index += 2;
                continue;
            }
            return None;
        }
        Some((current, (*leaf).to_string()))
    }
}

// ============================================================================
// Runtime
// ============================================================================

/// A loaded in-memory animation
pub struct MemoryRuntime {
    arena: Rc<RefCell<Arena>>,
    root: Option<usize>,
    auto_bound: bool,
    artboard: Option<String>,
    playing: Cell<bool>,
    cleaned_up: Cell<bool>,
}

impl MemoryRuntime {
    /// Build a runtime from a document
    pub fn from_document(document: &RuntimeDocument) -> Result<Self> {
        let mut arena = Arena::default();
        let root = document.view_model.as_ref().map(|root| arena.add_instance(root));
        arena.validate_links()?;

        for machine in &document.state_machines {
            if machine.name.trim().is_empty() {
                return Err(ViewerError::Document("state machine without a name".to_string()));
            }
            arena.machines.push(Machine {
                name: machine.name.clone(),
                inputs: machine
                    .inputs
                    .iter()
                    .map(|input| MachineInput {
                        name: input.name.clone(),
                        value: input.value.clone(),
                        fired: 0,
                    })
                    .collect(),
            });
        }

        Ok(Self {
            arena: Rc::new(RefCell::new(arena)),
            root,
            auto_bound: document.auto_bound.unwrap_or(true),
            artboard: document.artboard.clone(),
            playing: Cell::new(true),
            cleaned_up: Cell::new(false),
        })
    }

    /// Parse a RON document
    pub fn from_ron(source: &str) -> Result<Self> {
        let document: RuntimeDocument =
            ron::from_str(source).map_err(|e| ViewerError::Document(e.to_string()))?;
        Self::from_document(&document)
    }

    /// Load a RON document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// The root instance, regardless of binding mode
    pub fn root(&self) -> Option<Rc<dyn ViewModelInstance>> {
        self.root.map(|index| self.instance(index))
    }

    fn instance(&self, index: usize) -> Rc<dyn ViewModelInstance> {
        Rc::new(MemoryInstance {
            arena: self.arena.clone(),
            index,
        })
    }

    /// Write a value directly, the way the running animation would.
    /// Returns false if the path does not hold a matching scalar.
    pub fn write(&self, path: &str, value: InputValue) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut arena = self.arena.borrow_mut();
        let Some((instance, name)) = arena.locate(root, path) else {
            return false;
        };
        let Some(slot) = arena.slot_mut(instance, &name) else {
            return false;
        };
        match (slot, value) {
            (Slot::Number(current), InputValue::Number(next)) => *current = next,
            (Slot::Boolean(current), InputValue::Boolean(next)) => *current = next,
            (Slot::String(current), InputValue::String(next)) => *current = next,
            (Slot::Enum { value: current, .. }, InputValue::Enum(next)) => *current = next,
            (Slot::Color(current), InputValue::Color(next)) => *current = next,
            _ => return false,
        }
        true
    }

    /// Read a scalar value directly
    pub fn read(&self, path: &str) -> Option<InputValue> {
        let arena = self.arena.borrow();
        let (instance, name) = arena.locate(self.root?, path)?;
        match arena.slot(instance, &name)? {
            Slot::Number(value) => Some(InputValue::Number(*value)),
            Slot::Boolean(value) => Some(InputValue::Boolean(*value)),
            Slot::String(value) => Some(InputValue::String(value.clone())),
            Slot::Enum { value, .. } => Some(InputValue::Enum(value.clone())),
            Slot::Color(value) => Some(InputValue::Color(*value)),
            _ => None,
        }
    }

    /// Remove a property, invalidating any accessor that pointed at it
    pub fn remove(&self, path: &str) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let mut arena = self.arena.borrow_mut();
        let Some((instance, name)) = arena.locate(root, path) else {
            return false;
        };
        arena
            .instances
            .get_mut(instance)
            .and_then(|data| data.properties.shift_remove(&name))
            .is_some()
    }

    /// How many times the ViewModel trigger at `path` fired
    pub fn fire_count(&self, path: &str) -> usize {
        let arena = self.arena.borrow();
        let Some((instance, name)) = self.root.and_then(|root| arena.locate(root, path)) else {
            return 0;
        };
        match arena.slot(instance, &name) {
            Some(Slot::Trigger { fired, .. }) => *fired,
            _ => 0,
        }
    }

    /// How many times a state-machine input fired
    pub fn state_machine_fire_count(&self, machine: &str, input: &str) -> usize {
        let arena = self.arena.borrow();
        arena
            .machines
            .iter()
            .filter(|m| m.name == machine)
            .flat_map(|m| m.inputs.iter())
            .filter(|i| i.name == input)
            .map(|i| i.fired)
            .sum()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    /// Whether [`AnimationHandle::cleanup`] ran
    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up.get()
    }
}

impl AnimationHandle for MemoryRuntime {
    fn view_model_instance(&self) -> Option<Rc<dyn ViewModelInstance>> {
        if self.auto_bound {
            self.root()
        } else {
            None
        }
    }

    fn default_view_model(&self) -> ProbeResult<Rc<dyn ViewModelDefinition>> {
        Ok(self.root.map(|index| {
            Rc::new(MemoryDefinition {
                instance: self.instance(index),
            }) as Rc<dyn ViewModelDefinition>
        }))
    }

    fn state_machine_names(&self) -> Vec<String> {
        self.arena.borrow().machines.iter().map(|m| m.name.clone()).collect()
    }

    fn state_machine_inputs(&self, name: &str) -> ProbeResult<Vec<Rc<dyn StateMachineInput>>> {
        let arena = self.arena.borrow();
        let Some(machine) = arena.machines.iter().position(|m| m.name == name) else {
            return Ok(None);
        };
        let inputs = (0..arena.machines[machine].inputs.len())
            .map(|input| {
                Rc::new(MemoryStateMachineInput {
                    arena: self.arena.clone(),
                    machine,
                    input,
                }) as Rc<dyn StateMachineInput>
            })
            .collect();
        Ok(Some(inputs))
    }

    fn artboard_name(&self) -> Option<String> {
        self.artboard.clone()
    }

    fn play(&self) {
        self.playing.set(true);
    }

    fn pause(&self) {
        self.playing.set(false);
    }

    fn reset(&self) {
        self.playing.set(true);
    }

    fn cleanup(&self) {
        self.cleaned_up.set(true);
        self.playing.set(false);
    }
}

struct MemoryDefinition {
    instance: Rc<dyn ViewModelInstance>,
}

impl ViewModelDefinition for MemoryDefinition {
    fn default_instance(&self) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(Some(self.instance.clone()))
    }
}

// ============================================================================
// Instances and properties
// ============================================================================

#[derive(Clone)]
struct MemoryInstance {
    arena: Rc<RefCell<Arena>>,
    index: usize,
}

impl MemoryInstance {
    /// Accessor for a scalar slot matching `accepts`.
    fn scalar(&self, path: &str, accepts: fn(&Slot) -> bool) -> ProbeResult<Rc<MemoryProperty>> {
        let arena = self.arena.borrow();
        let Some((instance, name)) = arena.locate(self.index, path) else {
            return Ok(None);
        };
        match arena.slot(instance, &name) {
            Some(Slot::Faulty) => Err(ProbeError::Failed(format!("property `{path}` is faulty"))),
            Some(slot) if accepts(slot) => Ok(Some(Rc::new(MemoryProperty {
                arena: self.arena.clone(),
                instance,
                name,
            }))),
            _ => Ok(None),
        }
    }
}

impl ViewModelInstance for MemoryInstance {
    fn instance_id(&self) -> InstanceId {
        InstanceId(self.index as u64)
    }

    fn properties(&self) -> std::result::Result<Vec<PropertyInfo>, ProbeError> {
        let arena = self.arena.borrow();
        let data = arena
            .instances
            .get(self.index)
            .ok_or_else(|| ProbeError::Failed("instance was released".to_string()))?;
        Ok(data.properties.keys().map(PropertyInfo::new).collect())
    }

    fn number(&self, path: &str) -> ProbeResult<Rc<dyn NumberProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::Number(_)))?
            .map(|p| p as Rc<dyn NumberProperty>))
    }

    fn boolean(&self, path: &str) -> ProbeResult<Rc<dyn BooleanProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::Boolean(_)))?
            .map(|p| p as Rc<dyn BooleanProperty>))
    }

    fn string(&self, path: &str) -> ProbeResult<Rc<dyn StringProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::String(_)))?
            .map(|p| p as Rc<dyn StringProperty>))
    }

    fn enumeration(&self, path: &str) -> ProbeResult<Rc<dyn EnumProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::Enum { .. }))?
            .map(|p| p as Rc<dyn EnumProperty>))
    }

    fn color(&self, path: &str) -> ProbeResult<Rc<dyn ColorProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::Color(_)))?
            .map(|p| p as Rc<dyn ColorProperty>))
    }

    fn trigger(&self, path: &str) -> ProbeResult<Rc<dyn TriggerProperty>> {
        Ok(self
            .scalar(path, |slot| matches!(slot, Slot::Trigger { .. }))?
            .map(|p| p as Rc<dyn TriggerProperty>))
    }

    fn view_model_instance(&self, name: &str) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        let arena = self.arena.borrow();
        if matches!(arena.slot(self.index, name), Some(Slot::Faulty)) {
            return Err(ProbeError::Failed(format!("property `{name}` is faulty")));
        }
        Ok(arena.child_instance(self.index, name).map(|index| {
            Rc::new(MemoryInstance {
                arena: self.arena.clone(),
                index,
            }) as Rc<dyn ViewModelInstance>
        }))
    }

    fn list(&self, name: &str) -> ProbeResult<Rc<dyn ListProperty>> {
        let arena = self.arena.borrow();
        match arena.slot(self.index, name) {
            Some(Slot::List(items)) => Ok(Some(Rc::new(MemoryList {
                arena: self.arena.clone(),
                items: items.clone(),
            }))),
            Some(Slot::Faulty) => Err(ProbeError::Failed(format!("property `{name}` is faulty"))),
            _ => Ok(None),
        }
    }
}

struct MemoryList {
    arena: Rc<RefCell<Arena>>,
    items: Vec<usize>,
}

impl ListProperty for MemoryList {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn instance_at(&self, index: usize) -> ProbeResult<Rc<dyn ViewModelInstance>> {
        Ok(self.items.get(index).map(|item| {
            Rc::new(MemoryInstance {
                arena: self.arena.clone(),
                index: *item,
            }) as Rc<dyn ViewModelInstance>
        }))
    }
}

/// One scalar slot. Reads of a slot that disappeared return defaults.
struct MemoryProperty {
    arena: Rc<RefCell<Arena>>,
    instance: usize,
    name: String,
}

impl MemoryProperty {
    fn with_slot<T>(&self, read: impl FnOnce(&mut Slot) -> T) -> Option<T> {
        let mut arena = self.arena.borrow_mut();
        arena.slot_mut(self.instance, &self.name).map(read)
    }
}

impl NumberProperty for MemoryProperty {
    fn value(&self) -> f64 {
        self.with_slot(|slot| match slot {
            Slot::Number(value) => *value,
            _ => 0.0,
        })
        .unwrap_or_default()
    }

    fn set_value(&self, value: f64) {
        self.with_slot(|slot| {
            if let Slot::Number(current) = slot {
                *current = value;
            }
        });
    }
}

impl BooleanProperty for MemoryProperty {
    fn value(&self) -> bool {
        self.with_slot(|slot| matches!(slot, Slot::Boolean(true)))
            .unwrap_or_default()
    }

    fn set_value(&self, value: bool) {
        self.with_slot(|slot| {
            if let Slot::Boolean(current) = slot {
                *current = value;
            }
        });
    }
}

impl StringProperty for MemoryProperty {
    fn value(&self) -> String {
        self.with_slot(|slot| match slot {
            Slot::String(value) => value.clone(),
            _ => String::new(),
        })
        .unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        self.with_slot(|slot| {
            if let Slot::String(current) = slot {
                *current = value.to_string();
            }
        });
    }
}

impl EnumProperty for MemoryProperty {
    fn value(&self) -> String {
        self.with_slot(|slot| match slot {
            Slot::Enum { value, .. } => value.clone(),
            _ => String::new(),
        })
        .unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        self.with_slot(|slot| {
            if let Slot::Enum { value: current, .. } = slot {
                *current = value.to_string();
            }
        });
    }

    fn values(&self) -> Vec<String> {
        self.with_slot(|slot| match slot {
            Slot::Enum { values, .. } => values.clone(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
    }
}

impl ColorProperty for MemoryProperty {
    fn value(&self) -> u32 {
        self.with_slot(|slot| match slot {
            Slot::Color(value) => *value,
            _ => crate::color::OPAQUE_BLACK,
        })
        .unwrap_or(crate::color::OPAQUE_BLACK)
    }

    fn set_value(&self, argb: u32) {
        self.with_slot(|slot| {
            if let Slot::Color(current) = slot {
                *current = argb;
            }
        });
    }

    fn set_argb(&self, alpha: u8, red: u8, green: u8, blue: u8) -> std::result::Result<(), ProbeError> {
        ColorProperty::set_value(self, crate::color::rgb_alpha_to_argb(red, green, blue, alpha));
        Ok(())
    }
}

impl MemoryProperty {
    fn fire_with(&self, style: TriggerStyle, capability: &'static str) -> std::result::Result<(), ProbeError> {
        let fired = self.with_slot(|slot| match slot {
            Slot::Trigger { style: actual, fired } if *actual == style => {
                *fired += 1;
                true
            }
            _ => false,
        });
        if fired == Some(true) {
            Ok(())
        } else {
            Err(ProbeError::Unsupported(capability))
        }
    }
}

impl TriggerProperty for MemoryProperty {
    fn trigger(&self) -> std::result::Result<(), ProbeError> {
        self.fire_with(TriggerStyle::Trigger, "trigger")
    }

    fn fire(&self) -> std::result::Result<(), ProbeError> {
        self.fire_with(TriggerStyle::Fire, "fire")
    }
}

struct MemoryStateMachineInput {
    arena: Rc<RefCell<Arena>>,
    machine: usize,
    input: usize,
}

impl MemoryStateMachineInput {
    fn with_input<T>(&self, f: impl FnOnce(&mut MachineInput) -> T) -> Option<T> {
        let mut arena = self.arena.borrow_mut();
        arena
            .machines
            .get_mut(self.machine)
            .and_then(|machine| machine.inputs.get_mut(self.input))
            .map(f)
    }
}

impl StateMachineInput for MemoryStateMachineInput {
    fn name(&self) -> String {
        self.with_input(|input| input.name.clone()).unwrap_or_default()
    }

    fn value(&self) -> Option<StateMachineValue> {
        self.with_input(|input| match input.value {
            StateMachineInputValue::Boolean(value) => Some(StateMachineValue::Boolean(value)),
            StateMachineInputValue::Number(value) => Some(StateMachineValue::Number(value)),
            StateMachineInputValue::Trigger => None,
            StateMachineInputValue::Other => Some(StateMachineValue::Other),
        })
        .flatten()
    }

    fn set_value(&self, value: StateMachineValue) -> bool {
        self.with_input(|input| match (&mut input.value, value) {
            (StateMachineInputValue::Boolean(current), StateMachineValue::Boolean(next)) => {
                *current = next;
                true
            }
            (StateMachineInputValue::Number(current), StateMachineValue::Number(next)) => {
                *current = next;
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    fn can_fire(&self) -> bool {
        self.with_input(|input| matches!(input.value, StateMachineInputValue::Trigger))
            .unwrap_or(false)
    }

    fn fire(&self) -> std::result::Result<(), ProbeError> {
        let fired = self.with_input(|input| {
            if matches!(input.value, StateMachineInputValue::Trigger) {
                input.fired += 1;
                true
            } else {
                false
            }
        });
        if fired == Some(true) {
            Ok(())
        } else {
            Err(ProbeError::Unsupported("fire"))
        }
    }
}
