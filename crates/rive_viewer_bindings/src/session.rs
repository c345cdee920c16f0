// SPDX-License-Identifier: MIT OR Apache-2.0
//! Load/unload lifecycle of the control panel.
//!
//! The loading pipeline reports three events: a load started, a load
//! finished with a live animation handle, and an explicit cleanup. The
//! session tears bindings down before anything new is built, so a stale
//! sync tick can never reach a disposed widget.

use crate::config::ViewerConfig;
use crate::controls::{ControlEdit, ControlPanel, MSG_LOADING, MSG_NO_ANIMATION};
use crate::error::BindingError;
use crate::registry::RuntimeRegistry;
use crate::resolver::FireReport;
use crate::runtime::AnimationHandle;
use std::rc::Rc;
use std::time::Instant;

/// What the loader should do after [`ViewerSession::loaded`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Controls are rendered; show the status line
    Ready {
        /// Status line
        status: String,
    },
    /// The state-machine selection was filled in; instantiate again
    ReloadRequested {
        /// State machine now selected
        state_machine: String,
    },
}

/// Owns the live animation handle and its control panel
pub struct ViewerSession {
    config: ViewerConfig,
    handle: Option<Rc<dyn AnimationHandle>>,
    panel: ControlPanel,
    file_name: Option<String>,
    has_auto_reloaded: bool,
    status: String,
    runtimes: RuntimeRegistry,
    runtime_warning: Option<String>,
}

impl ViewerSession {
    /// Create a session with no animation
    pub fn new(config: ViewerConfig) -> Self {
        let panel = ControlPanel::with_accent_hex(&config.accent_palette, config.sync_interval());
        Self {
            config,
            handle: None,
            panel,
            file_name: None,
            has_auto_reloaded: false,
            status: MSG_NO_ANIMATION.to_string(),
            runtimes: RuntimeRegistry::new(),
            runtime_warning: None,
        }
    }

    /// A load began: drop the old handle and bindings
    pub fn load_started(&mut self, file_name: impl Into<String>) {
        if let Some(handle) = self.handle.take() {
            handle.cleanup();
        }
        self.panel.reset(MSG_LOADING);
        self.runtime_warning = self.register_runtime();
        let file_name = file_name.into();
        self.status = match &self.runtime_warning {
            Some(warning) => format!("Loading {file_name}... {warning}"),
            None => format!("Loading {file_name}..."),
        };
        self.file_name = Some(file_name);
    }

    /// A load finished.
    ///
    /// The first time a file loads without its first state machine
    /// selected, the selection is filled in and a single reload is requested
    /// instead of rendering.
    pub fn loaded(&mut self, handle: Rc<dyn AnimationHandle>, now: Instant) -> LoadOutcome {
        let names = handle.state_machine_names();

        if let Some(primary) = self.auto_fill_state_machine(&names) {
            if !self.has_auto_reloaded {
                self.has_auto_reloaded = true;
                handle.cleanup();
                self.status = "Auto-reloading with correct state machine...".to_string();
                tracing::info!("Selected state machine {primary}; reloading");
                return LoadOutcome::ReloadRequested { state_machine: primary };
            }
        }

        let file_name = self.file_name.clone().unwrap_or_else(|| "animation".to_string());
        let runtime = self.config.runtime.name();
        let status = match names.first() {
            Some(first) => {
                let active = self.config.instance.primary_state_machine().unwrap_or(first.as_str());
                format!("Loaded: {file_name} ({runtime}) - default state machine ({active}) initialized")
            }
            None => format!("Loaded: {file_name} ({runtime}) - no state machines"),
        };
        let status = match &self.runtime_warning {
            Some(warning) => format!("{status} - {warning}"),
            None => status,
        };
        tracing::info!("{status}");

        self.has_auto_reloaded = false;
        self.panel.render(handle.as_ref(), now);
        self.handle = Some(handle);
        self.status = status.clone();
        LoadOutcome::Ready { status }
    }

    /// Re-resolve the configured runtime, dropping any cached entry.
    /// Returns the scripting warning the first time an old runtime is seen.
    fn register_runtime(&mut self) -> Option<String> {
        let name = self.config.runtime.name();
        self.runtimes.evict(name);
        let url = self.config.runtime_url.as_deref()?;
        self.runtimes.record(name, url, None, None);
        self.runtimes.scripting_warning(name)
    }

    /// Warning raised by the runtime resolved for the current load
    pub fn runtime_warning(&self) -> Option<&str> {
        self.runtime_warning.as_deref()
    }

    /// Select the first state machine if the selection does not already
    /// start with it. Returns the newly selected name.
    fn auto_fill_state_machine(&mut self, names: &[String]) -> Option<String> {
        if !self.config.instance.auto_fill_state_machine {
            return None;
        }
        let primary = names.first()?;
        if self.config.instance.primary_state_machine() == Some(primary.as_str()) {
            return None;
        }
        self.config.instance.state_machines = vec![primary.clone()];
        Some(primary.clone())
    }

    /// Tear down the animation and all bindings
    pub fn cleanup(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cleanup();
            tracing::info!("Animation cleaned up");
        }
        self.panel.reset(MSG_NO_ANIMATION);
        self.file_name = None;
        self.has_auto_reloaded = false;
        self.status = MSG_NO_ANIMATION.to_string();
    }

    /// Re-render the controls against the current handle
    pub fn refresh(&mut self, now: Instant) {
        match &self.handle {
            Some(handle) => self.panel.render(handle.as_ref(), now),
            None => self.panel.reset(MSG_NO_ANIMATION),
        }
    }

    /// Per-frame sync tick
    pub fn tick(&mut self, now: Instant) {
        if let Some(handle) = &self.handle {
            self.panel.tick(handle.as_ref(), now);
        }
    }

    /// Apply a widget edit to the live animation
    pub fn apply_edit(&mut self, edit: ControlEdit) -> Result<Option<FireReport>, BindingError> {
        let Some(handle) = &self.handle else {
            return Err(BindingError::NotAvailable {
                path: "<no animation>".to_string(),
            });
        };
        let outcome = self.panel.apply_edit(handle.as_ref(), edit);
        if let Ok(Some(report)) = &outcome {
            if let Some(status) = self.panel.status() {
                self.status = status.to_string();
            }
            if !report.fired() {
                tracing::info!("Trigger press had no effect");
            }
        }
        outcome
    }

    /// Resume playback
    pub fn play(&mut self) {
        if let Some(handle) = &self.handle {
            handle.play();
            self.status = "Playing".to_string();
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if let Some(handle) = &self.handle {
            handle.pause();
            self.status = "Paused".to_string();
        }
    }

    /// Restart playback
    pub fn reset_playback(&mut self) {
        if let Some(handle) = &self.handle {
            handle.reset();
            self.status = "Reset".to_string();
        }
    }

    /// The control panel
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// The control panel, mutably
    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    /// The live animation handle
    pub fn handle(&self) -> Option<&Rc<dyn AnimationHandle>> {
        self.handle.as_ref()
    }

    /// Current settings, including any auto-filled state machine
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current settings, mutably
    pub fn config_mut(&mut self) -> &mut ViewerConfig {
        &mut self.config
    }

    /// Resolved runtimes
    pub fn runtimes(&self) -> &RuntimeRegistry {
        &self.runtimes
    }

    /// Name of the loaded file
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{MSG_NO_BOUND_INPUTS, MSG_NO_WRITABLE_INPUTS};
    use crate::memory::MemoryRuntime;

    const SCENE: &str = r#"(
        view_model: Some((properties: {"speed": Number(1.0)})),
        state_machines: [(name: "State Machine 1", inputs: [(name: "hover", value: Boolean(false))])],
    )"#;

    fn load(session: &mut ViewerSession, source: &str) -> (Rc<MemoryRuntime>, LoadOutcome) {
        let runtime = Rc::new(MemoryRuntime::from_ron(source).unwrap());
        session.load_started("scene.riv");
        let outcome = session.loaded(runtime.clone(), Instant::now());
        (runtime, outcome)
    }

    #[test]
    fn test_auto_fill_reloads_once() {
        let mut session = ViewerSession::default();
        let (first, outcome) = load(&mut session, SCENE);
        assert_eq!(
            outcome,
            LoadOutcome::ReloadRequested { state_machine: "State Machine 1".into() }
        );
        assert!(first.is_cleaned_up());
        assert_eq!(session.panel().total_controls(), 0);
        assert_eq!(session.config().instance.state_machines, vec!["State Machine 1".to_string()]);

        let (_, outcome) = load(&mut session, SCENE);
        let LoadOutcome::Ready { status } = outcome else {
            panic!("second load should render");
        };
        assert!(status.contains("default state machine (State Machine 1) initialized"));
        assert_eq!(session.panel().total_controls(), 2);
    }

    #[test]
    fn test_reload_is_not_repeated_within_a_sequence() {
        let mut config = ViewerConfig::default();
        config.instance.state_machines = vec!["Other".into()];
        let mut session = ViewerSession::new(config);

        let (_, outcome) = load(&mut session, SCENE);
        assert!(matches!(outcome, LoadOutcome::ReloadRequested { .. }));

        // A file whose first machine differs again renders instead of looping.
        let (_, outcome) = load(
            &mut session,
            r#"(state_machines: [(name: "Another", inputs: [(name: "x", value: Number(0.0))])])"#,
        );
        assert!(matches!(outcome, LoadOutcome::Ready { .. }));
    }

    #[test]
    fn test_no_state_machines_status() {
        let mut session = ViewerSession::default();
        let (_, outcome) = load(&mut session, r#"(view_model: Some((properties: {"x": Faulty})))"#);
        assert_eq!(
            outcome,
            LoadOutcome::Ready { status: "Loaded: scene.riv (webgl2) - no state machines".into() }
        );
        assert_eq!(session.panel().empty_message(), Some(MSG_NO_WRITABLE_INPUTS));
    }

    #[test]
    fn test_cleanup_discards_everything() {
        let mut config = ViewerConfig::default();
        config.instance.auto_fill_state_machine = false;
        let mut session = ViewerSession::new(config);
        let (runtime, _) = load(&mut session, SCENE);
        assert!(session.panel().is_syncing());

        session.pause();
        assert!(!runtime.is_playing());
        assert_eq!(session.status(), "Paused");

        session.cleanup();
        assert!(runtime.is_cleaned_up());
        assert!(session.handle().is_none());
        assert!(!session.panel().is_syncing());
        assert_eq!(session.panel().empty_message(), Some(MSG_NO_ANIMATION));
        assert!(session
            .apply_edit(ControlEdit::Fire { id: crate::binding::BindingId::new() })
            .is_err());
    }

    #[test]
    fn test_load_started_tears_down_previous() {
        let mut config = ViewerConfig::default();
        config.instance.auto_fill_state_machine = false;
        let mut session = ViewerSession::new(config);
        let (runtime, _) = load(&mut session, SCENE);

        session.load_started("next.riv");
        assert!(runtime.is_cleaned_up());
        assert_eq!(session.panel().empty_message(), Some(MSG_LOADING));
        assert_eq!(session.file_name(), Some("next.riv"));

        let empty = Rc::new(MemoryRuntime::from_ron("(artboard: None)").unwrap());
        session.loaded(empty, Instant::now());
        assert_eq!(session.panel().empty_message(), Some(MSG_NO_BOUND_INPUTS));
    }

    #[test]
    fn test_runtime_is_reresolved_per_load() {
        let mut config = ViewerConfig::default();
        config.runtime_url = Some("https://unpkg.com/@rive-app/webgl2@2.30.1".into());
        let mut session = ViewerSession::new(config);

        session.load_started("a.riv");
        assert_eq!(session.runtimes().version("webgl2"), Some("2.30.1"));

        session.config_mut().runtime_url = None;
        session.load_started("b.riv");
        assert!(session.runtimes().is_empty());
    }

    #[test]
    fn test_old_runtime_warning_reaches_status() {
        let mut config = ViewerConfig::default();
        config.instance.auto_fill_state_machine = false;
        config.runtime_url = Some("https://unpkg.com/@rive-app/webgl2@2.30.1".into());
        let mut session = ViewerSession::new(config);

        session.load_started("a.ron");
        let warning = session.runtime_warning().unwrap().to_string();
        assert!(warning.contains("webgl2@2.30.1"));
        assert!(session.status().contains(&warning));

        let runtime = MemoryRuntime::from_ron(SCENE).unwrap();
        let LoadOutcome::Ready { status } = session.loaded(Rc::new(runtime), Instant::now()) else {
            panic!("expected a rendered load");
        };
        assert!(status.contains(&warning));

        session.load_started("b.ron");
        assert!(session.runtime_warning().is_none());
        assert_eq!(session.status(), "Loading b.ron...");
    }
}
