// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console panel - log output and explorer commands.

use rive_viewer_bindings::controls::ControlEdit;
use rive_viewer_bindings::explorer::{self, ExploreRow};
use rive_viewer_bindings::resolver::resolve_accessor;
use rive_viewer_bindings::runtime::resolve_view_model_root;
use rive_viewer_bindings::session::ViewerSession;
use std::collections::VecDeque;
use std::sync::mpsc;

/// A tracing event captured by the [`TracingBridge`] layer.
#[derive(Debug, Clone)]
pub struct TracingEvent {
    /// The log level.
    pub level: LogLevel,
    /// The formatted message.
    pub message: String,
    /// Optional target (module path).
    pub target: Option<String>,
    /// Optional file path.
    pub file: Option<String>,
    /// Optional line number.
    pub line: Option<u32>,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc` channel
/// so the [`ConsolePanel`] can display them.
pub struct TracingBridge {
    sender: mpsc::Sender<TracingEvent>,
}

impl TracingBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<TracingEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for TracingBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = LogLevel::from(*event.metadata().level());

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let message = if visitor.message.is_empty() {
            "(empty)".to_string()
        } else {
            visitor.message
        };

        let meta = event.metadata();
        // The receiver is gone once the window closes
        let _ = self.sender.send(TracingEvent {
            level,
            message,
            target: Some(meta.target().to_string()),
            file: meta.file().map(str::to_string),
            line: meta.line(),
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = value;
        } else if self.message.is_empty() {
            self.message = format!("{name} = {value}");
        } else {
            self.message.push_str(&format!(", {name} = {value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push_field(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push_field(field.name(), value.to_string());
    }
}

/// Format a SystemTime as HH:MM:SS
fn format_system_time(time: &std::time::SystemTime) -> String {
    let duration = time.duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
    let secs = duration.as_secs();
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Probe misses and other chatter
    Trace,
    /// Traversal summaries
    Debug,
    /// Load, reset and fire reports
    Info,
    /// Navigation misses and failed writes
    Warn,
    /// Failures
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [Self::Trace, Self::Debug, Self::Info, Self::Warn, Self::Error];

    fn name(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Self::Trace => "T",
            Self::Debug => "D",
            Self::Info => "I",
            Self::Warn => "W",
            Self::Error => "E",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn color(&self) -> egui::Color32 {
        match self {
            Self::Trace => egui::Color32::from_rgb(100, 100, 100),
            Self::Debug => egui::Color32::from_rgb(150, 150, 150),
            Self::Info => egui::Color32::from_rgb(200, 200, 200),
            Self::Warn => egui::Color32::from_rgb(255, 200, 80),
            Self::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }

    fn bg_color(&self) -> egui::Color32 {
        match self {
            Self::Trace | Self::Debug | Self::Info => egui::Color32::TRANSPARENT,
            Self::Warn => egui::Color32::from_rgba_unmultiplied(255, 200, 80, 20),
            Self::Error => egui::Color32::from_rgba_unmultiplied(255, 100, 100, 30),
        }
    }
}

/// A log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity
    pub level: LogLevel,
    /// Message text, prefixed with the target for tracing events
    pub message: String,
    /// Wall-clock time of the latest occurrence
    pub timestamp: String,
    /// `file:line` of the emitting code
    pub source: Option<String>,
    /// Occurrences collapsed into this entry
    pub count: u32,
}

/// The console panel
pub struct ConsolePanel {
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    /// Log entries
    pub entries: VecDeque<LogEntry>,
    /// Maximum entries to keep
    pub max_entries: usize,
    /// Search filter
    pub search: String,
    /// Auto-scroll to bottom
    pub auto_scroll: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Collapse duplicate messages
    pub collapse_duplicates: bool,
    /// Command input
    pub command_input: String,
    /// Command history
    pub command_history: Vec<String>,
    history_index: Option<usize>,
    pending_copy: Option<String>,
    /// Per-level visibility, indexed by [`LogLevel`]
    pub visible: [bool; 5],
    counts: [usize; 5],
}

impl ConsolePanel {
    /// Create a console panel wired to a tracing receiver.
    pub fn with_tracing_receiver(tracing_rx: Option<mpsc::Receiver<TracingEvent>>) -> Self {
        Self {
            tracing_rx,
            entries: VecDeque::new(),
            max_entries: 1000,
            search: String::new(),
            auto_scroll: true,
            show_timestamps: false,
            collapse_duplicates: true,
            command_input: String::new(),
            command_history: Vec::new(),
            history_index: None,
            pending_copy: None,
            // Probe misses are too chatty to show by default
            visible: [false, true, true, true, true],
            counts: [0; 5],
        }
    }

    /// Add a log entry
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_internal(level, message.into(), None);
    }

    fn log_internal(&mut self, level: LogLevel, message: String, source: Option<String>) {
        let now = std::time::SystemTime::now();
        self.counts[level.index()] += 1;

        if self.collapse_duplicates {
            if let Some(last) = self.entries.back_mut() {
                if last.level == level && last.message == message {
                    last.count += 1;
                    last.timestamp = format_system_time(&now);
                    return;
                }
            }
        }

        self.entries.push_back(LogEntry {
            level,
            message,
            timestamp: format_system_time(&now),
            source,
            count: 1,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counts = [0; 5];
    }

    /// Entries seen at `level`, including collapsed duplicates
    pub fn count(&self, level: LogLevel) -> usize {
        self.counts[level.index()]
    }

    /// Drain any pending tracing events into the log.
    pub fn poll_tracing_events(&mut self) {
        let Some(rx) = &self.tracing_rx else {
            return;
        };

        // Drain events into a local buffer to avoid borrow conflict
        let events: Vec<_> = rx.try_iter().collect();

        for event in events {
            let source = match (event.file, event.line) {
                (Some(file), Some(line)) => Some(format!("{file}:{line}")),
                _ => None,
            };
            let message = match &event.target {
                Some(target) => format!("[{target}] {}", event.message),
                None => event.message,
            };
            self.log_internal(event.level, message, source);
        }
    }

    /// Render the console panel
    pub fn ui(&mut self, ui: &mut egui::Ui, session: &mut ViewerSession) {
        self.poll_tracing_events();

        ui.horizontal(|ui| {
            if ui.button("Clear").on_hover_text("Clear all logs").clicked() {
                self.clear();
            }

            ui.separator();

            for level in LogLevel::ALL {
                let show = self.visible[level.index()];
                let text = format!("{} {}", level.short_name(), self.count(level));
                let color = if show { level.color() } else { egui::Color32::GRAY };
                if ui
                    .add(egui::Button::new(egui::RichText::new(text).color(color).monospace()))
                    .on_hover_text(format!("{} messages", level.name()))
                    .clicked()
                {
                    self.visible[level.index()] = !show;
                }
            }

            ui.separator();

            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search...")
                    .desired_width(150.0),
            );
            if !self.search.is_empty() && ui.button("x").on_hover_text("Clear search").clicked() {
                self.search.clear();
            }

            ui.separator();

            ui.menu_button("Options", |ui| {
                ui.checkbox(&mut self.auto_scroll, "Auto-scroll");
                ui.checkbox(&mut self.show_timestamps, "Show timestamps");
                ui.checkbox(&mut self.collapse_duplicates, "Collapse duplicates");
            });
        });

        ui.separator();

        let bottom_height = ui.spacing().interact_size.y + 8.0;
        let search = self.search.to_lowercase();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .max_height((ui.available_height() - bottom_height).max(0.0))
            .stick_to_bottom(self.auto_scroll)
            .show(ui, |ui| {
                let visible = self.entries.iter().filter(|entry| {
                    self.visible[entry.level.index()]
                        && (search.is_empty() || entry.message.to_lowercase().contains(&search))
                });
                for entry in visible {
                    self.entry_ui(ui, entry);
                }
            });

        ui.separator();
        self.command_line_ui(ui, session);

        if let Some(text) = self.pending_copy.take() {
            ui.output_mut(|o| o.copied_text = text);
        }
    }

    fn entry_ui(&self, ui: &mut egui::Ui, entry: &LogEntry) {
        let bg_color = entry.level.bg_color();

        let response = ui.horizontal(|ui| {
            let rect = ui.available_rect_before_wrap();
            if bg_color != egui::Color32::TRANSPARENT {
                ui.painter().rect_filled(
                    egui::Rect::from_min_size(rect.min, egui::vec2(ui.available_width(), 18.0)),
                    0.0,
                    bg_color,
                );
            }

            if self.show_timestamps {
                ui.label(
                    egui::RichText::new(&entry.timestamp)
                        .monospace()
                        .size(11.0)
                        .color(egui::Color32::from_rgb(100, 100, 100)),
                );
            }

            ui.label(
                egui::RichText::new(format!("[{}]", entry.level.short_name()))
                    .monospace()
                    .size(11.0)
                    .color(entry.level.color()),
            );

            if entry.count > 1 {
                ui.label(
                    egui::RichText::new(format!("({})", entry.count))
                        .monospace()
                        .size(10.0)
                        .color(egui::Color32::from_rgb(150, 150, 200)),
                );
            }

            let message = ui.label(
                egui::RichText::new(&entry.message)
                    .monospace()
                    .size(12.0)
                    .color(entry.level.color()),
            );
            if let Some(source) = &entry.source {
                message.on_hover_text(source.as_str());
            }
        });

        response.response.context_menu(|ui| {
            if ui.button("Copy message").clicked() {
                ui.output_mut(|o| o.copied_text = entry.message.clone());
                ui.close_menu();
            }
            if let Some(source) = &entry.source {
                if ui.button("Copy source location").clicked() {
                    ui.output_mut(|o| o.copied_text = source.clone());
                    ui.close_menu();
                }
            }
        });
    }

    fn command_line_ui(&mut self, ui: &mut egui::Ui, session: &mut ViewerSession) {
        ui.horizontal(|ui| {
            ui.label(">");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.command_input)
                    .hint_text("Enter command...")
                    .desired_width(ui.available_width() - 60.0)
                    .font(egui::TextStyle::Monospace),
            );

            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let run_clicked = ui.button("Run").clicked();
            if (submitted || run_clicked) && !self.command_input.trim().is_empty() {
                let command = std::mem::take(&mut self.command_input);
                self.execute_command(&command, session);
                self.command_history.push(command);
                self.history_index = None;
            }

            if response.has_focus() {
                if ui.input(|i| i.key_pressed(egui::Key::ArrowUp)) {
                    self.step_history(true);
                }
                if ui.input(|i| i.key_pressed(egui::Key::ArrowDown)) {
                    self.step_history(false);
                }
            }
        });
    }

    fn step_history(&mut self, back: bool) {
        let len = self.command_history.len();
        if len == 0 {
            return;
        }
        self.history_index = match (self.history_index, back) {
            (None, true) => Some(len - 1),
            (Some(idx), true) => Some(idx.saturating_sub(1)),
            (Some(idx), false) if idx + 1 < len => Some(idx + 1),
            (_, false) => None,
        };
        self.command_input = self
            .history_index
            .and_then(|idx| self.command_history.get(idx).cloned())
            .unwrap_or_default();
    }

    /// Run one console command against the session
    pub fn execute_command(&mut self, command: &str, session: &mut ViewerSession) {
        self.log(LogLevel::Info, format!("> {command}"));

        let command = command.trim();
        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        let rest = rest.trim();

        match name {
            "help" => {
                self.log(LogLevel::Info, "Available commands:");
                self.log(LogLevel::Info, "  help               - Show this help");
                self.log(LogLevel::Info, "  clear              - Clear console");
                self.log(LogLevel::Info, "  explore [prefix]   - List one ViewModel level");
                self.log(LogLevel::Info, "  get <path>         - Read an input");
                self.log(LogLevel::Info, "  set <path> <value> - Write an input");
                self.log(LogLevel::Info, "  fire <path>        - Fire a trigger");
                self.log(LogLevel::Info, "  tree               - Copy the hierarchy as JSON");
                self.log(LogLevel::Info, "  stats              - Show input and log counts");
            }
            "clear" => self.clear(),
            "explore" => self.explore(session, rest),
            "get" => self.get(session, rest),
            "set" => self.set(session, rest),
            "fire" => self.fire(session, rest),
            "tree" => {
                let panel = session.panel();
                match explorer::export_hierarchy_json(panel.view_model_hierarchy(), panel.state_machine_hierarchy()) {
                    Ok(json) => {
                        self.log(LogLevel::Info, format!("Hierarchy JSON ({} bytes)", json.len()));
                        self.pending_copy = Some(json);
                    }
                    Err(e) => self.log(LogLevel::Error, format!("Failed to serialise hierarchy: {e}")),
                }
            }
            "stats" => {
                let panel = session.panel();
                let vm = panel.view_model_hierarchy().map_or(0, |h| h.count_all_inputs());
                let sm = panel.state_machine_hierarchy().map_or(0, |h| h.count_all_inputs());
                self.log(LogLevel::Info, format!("  ViewModel inputs:     {vm}"));
                self.log(LogLevel::Info, format!("  State machine inputs: {sm}"));
                self.log(LogLevel::Info, format!("  Controls:             {}", panel.total_controls()));
                self.log(LogLevel::Info, format!("  Log entries:          {}", self.entries.len()));
            }
            _ => {
                self.log(
                    LogLevel::Error,
                    format!("Unknown command: {name}. Type 'help' for available commands."),
                );
            }
        }
    }

    fn explore(&mut self, session: &ViewerSession, prefix: &str) {
        let (Some(hierarchy), Some(root)) = (
            session.panel().view_model_hierarchy(),
            session.handle().and_then(|handle| resolve_view_model_root(handle.as_ref())),
        ) else {
            self.log(LogLevel::Warn, "No ViewModel is bound");
            return;
        };
        let Some(level) = explorer::explore(hierarchy, root.as_ref(), prefix) else {
            self.log(LogLevel::Warn, format!("No tree node for prefix: {prefix}"));
            return;
        };

        self.log(LogLevel::Info, format!("{} ({} rows)", level.prefix, level.rows.len()));
        for row in level.rows {
            let line = match row {
                ExploreRow::Scalar { name, input_kind, value, .. } => match value {
                    Some(value) => format!("  {name}: {input_kind} = {value}"),
                    None => format!("  {name}: {input_kind}"),
                },
                ExploreRow::Group { name, path, children, has_scalars } => {
                    let scalars = if has_scalars { ", scalars" } else { "" };
                    format!("  {name}/ [{path}] ({children} groups{scalars})")
                }
            };
            self.log(LogLevel::Info, line);
        }
    }

    fn get(&mut self, session: &ViewerSession, path: &str) {
        let Some(root) = session.handle().and_then(|handle| resolve_view_model_root(handle.as_ref())) else {
            self.log(LogLevel::Warn, "No ViewModel is bound");
            return;
        };
        match explorer::get(root.as_ref(), path) {
            Some(value) => self.log(LogLevel::Info, format!("{path} = {value}")),
            None => self.log(LogLevel::Warn, format!("{path} is not readable")),
        }
    }

    fn set(&mut self, session: &ViewerSession, args: &str) {
        let Some((path, text)) = args.split_once(char::is_whitespace) else {
            self.log(LogLevel::Error, "Usage: set <path> <value>");
            return;
        };
        let Some(root) = session.handle().and_then(|handle| resolve_view_model_root(handle.as_ref())) else {
            self.log(LogLevel::Warn, "No ViewModel is bound");
            return;
        };
        let Some(kind) = resolve_accessor(root.as_ref(), path, None).map(|accessor| accessor.kind()) else {
            self.log(LogLevel::Warn, format!("{path} is not available"));
            return;
        };
        let Some(value) = explorer::parse_value(kind, text) else {
            self.log(LogLevel::Error, format!("'{}' is not a valid {kind} value", text.trim()));
            return;
        };
        match explorer::set(root.as_ref(), path, value) {
            Ok(Some(read_back)) => self.log(LogLevel::Info, format!("{path} = {read_back}")),
            Ok(None) => self.log(LogLevel::Info, format!("{path} written")),
            Err(e) => self.log(LogLevel::Error, e.to_string()),
        }
    }

    fn fire(&mut self, session: &mut ViewerSession, path: &str) {
        let Some(id) = session.panel().bindings().find_by_path(path).map(|binding| binding.id) else {
            self.log(LogLevel::Warn, format!("No control for {path}"));
            return;
        };
        match session.apply_edit(ControlEdit::Fire { id }) {
            Ok(Some(report)) => self.log(LogLevel::Info, report.status(path)),
            Ok(None) => {}
            Err(e) => self.log(LogLevel::Error, e.to_string()),
        }
    }
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::with_tracing_receiver(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rive_viewer_bindings::config::ViewerConfig;
    use rive_viewer_bindings::memory::MemoryRuntime;
    use std::rc::Rc;
    use std::time::Instant;

    fn session() -> (ViewerSession, Rc<MemoryRuntime>) {
        let mut config = ViewerConfig::default();
        config.instance.auto_fill_state_machine = false;
        let mut session = ViewerSession::new(config);
        let runtime = Rc::new(
            MemoryRuntime::from_ron(
                r#"(
                    view_model: Some((properties: {
                        "speed": Number(1.5),
                        "hud": Nested((properties: {"visible": Boolean(true), "go": Trigger(Fire)})),
                    })),
                )"#,
            )
            .unwrap(),
        );
        session.load_started("scene.ron");
        session.loaded(runtime.clone(), Instant::now());
        (session, runtime)
    }

    fn last_message(console: &ConsolePanel) -> &str {
        console.entries.back().map(|entry| entry.message.as_str()).unwrap_or_default()
    }

    #[test]
    fn test_collapses_duplicates() {
        let mut console = ConsolePanel::default();
        console.log(LogLevel::Warn, "same");
        console.log(LogLevel::Warn, "same");
        console.log(LogLevel::Info, "other");

        assert_eq!(console.entries.len(), 2);
        assert_eq!(console.entries[0].count, 2);
        assert_eq!(console.count(LogLevel::Warn), 2);

        console.clear();
        assert!(console.entries.is_empty());
        assert_eq!(console.count(LogLevel::Warn), 0);
    }

    #[test]
    fn test_get_and_set_commands() {
        let (mut session, runtime) = session();
        let mut console = ConsolePanel::default();

        console.execute_command("get speed", &mut session);
        assert_eq!(last_message(&console), "speed = 1.5");

        console.execute_command("set hud/visible off", &mut session);
        assert_eq!(last_message(&console), "hud/visible = false");
        assert_eq!(
            runtime.read("hud/visible"),
            Some(rive_viewer_bindings::InputValue::Boolean(false))
        );

        console.execute_command("set speed fast", &mut session);
        assert_eq!(console.entries.back().map(|e| e.level), Some(LogLevel::Error));
    }

    #[test]
    fn test_explore_and_fire_commands() {
        let (mut session, runtime) = session();
        let mut console = ConsolePanel::default();

        console.execute_command("explore", &mut session);
        assert!(console.entries.iter().any(|e| e.message == "  speed: number = 1.5"));
        assert!(console.entries.iter().any(|e| e.message.starts_with("  hud/ [hud]")));

        console.execute_command("fire hud/go", &mut session);
        assert_eq!(last_message(&console), "Fired hud/go");
        assert_eq!(runtime.fire_count("hud/go"), 1);

        console.execute_command("fire speed", &mut session);
        assert_eq!(console.entries.back().map(|e| e.level), Some(LogLevel::Error));
        assert_eq!(last_message(&console), "`speed` is a number input, not trigger");
    }

    #[test]
    fn test_unknown_command() {
        let mut session = ViewerSession::default();
        let mut console = ConsolePanel::default();
        console.execute_command("bogus 1 2", &mut session);
        assert!(last_message(&console).starts_with("Unknown command: bogus"));

        console.execute_command("get speed", &mut session);
        assert_eq!(last_message(&console), "No ViewModel is bound");
    }
}
