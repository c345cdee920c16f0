// SPDX-License-Identifier: MIT OR Apache-2.0
//! ViewModel introspection and live binding for the Rive viewer.
//!
//! This crate discovers every bindable input of a loaded animation and keeps
//! a panel of editor controls in sync with it:
//! - ViewModel property trees, including nested instances and lists
//! - State-machine inputs, grouped by machine
//! - Two-way value sync with focus-aware polling
//! - Trigger firing across both sources
//!
//! ## Architecture
//!
//! The animation runtime is reached through the traits in [`runtime`]. A
//! walk of the live graph produces an immutable [`HierarchyNode`] snapshot
//! whose leaves carry slash-joined paths. Controls never hold live handles;
//! every read, write and fire re-resolves its path against the current
//! animation, so a disposed or reloaded file simply disables stale widgets.

pub mod accessor;
pub mod binding;
pub mod color;
pub mod config;
pub mod controls;
pub mod error;
pub mod explorer;
pub mod hierarchy;
pub mod memory;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod state_machine;
pub mod ui;
pub mod walker;

pub use accessor::{Accessor, InputKind, InputValue};
pub use binding::{Binding, BindingId, BindingSet, SyncStats, WidgetState};
pub use config::ViewerConfig;
pub use controls::{ControlEdit, ControlPanel, ControlSection};
pub use error::{BindingError, ProbeError, Result, ViewerError};
pub use hierarchy::{Descriptor, HierarchyNode, InputSource, NodeKind};
pub use memory::MemoryRuntime;
pub use resolver::{fire_trigger, resolve_accessor, resolve_live, FireReport};
pub use runtime::{AnimationHandle, ViewModelInstance};
pub use session::{LoadOutcome, ViewerSession};
pub use walker::build_hierarchy;
