// SPDX-License-Identifier: MIT OR Apache-2.0
//! Explorer panel - browse the ViewModel one level at a time.

use rive_viewer_bindings::explorer::{self, ExploreLevel, ExploreRow};
use rive_viewer_bindings::resolver::resolve_accessor;
use rive_viewer_bindings::runtime::resolve_view_model_root;
use rive_viewer_bindings::session::ViewerSession;

/// Explorer panel state
#[derive(Debug, Default)]
pub struct ExplorerPanel {
    /// Level being shown; empty for the root
    pub prefix: String,
    /// Path of the value editor
    pub set_path: String,
    /// Text of the value editor
    pub set_value: String,
    /// Outcome of the last set or export
    pub message: Option<String>,
}

/// Prefix of the level above `prefix`
fn parent_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

impl ExplorerPanel {
    /// Create a new explorer panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows at the current prefix
    pub fn level(&self, session: &ViewerSession) -> Option<ExploreLevel> {
        let hierarchy = session.panel().view_model_hierarchy()?;
        let root = resolve_view_model_root(session.handle()?.as_ref())?;
        explorer::explore(hierarchy, root.as_ref(), &self.prefix)
    }

    /// Write the value editor's text to its path
    pub fn apply_set(&mut self, session: &ViewerSession) {
        let path = self.set_path.trim().to_string();
        let message = match session.handle().and_then(|handle| resolve_view_model_root(handle.as_ref())) {
            None => "No ViewModel is bound".to_string(),
            Some(root) => match resolve_accessor(root.as_ref(), &path, None) {
                None => format!("{path} is not available"),
                Some(accessor) => match explorer::parse_value(accessor.kind(), &self.set_value) {
                    None => format!("'{}' is not a valid {} value", self.set_value.trim(), accessor.kind()),
                    Some(value) => match explorer::set(root.as_ref(), &path, value) {
                        Ok(Some(read_back)) => format!("{path} = {read_back}"),
                        Ok(None) => format!("{path} written"),
                        Err(e) => e.to_string(),
                    },
                },
            },
        };
        tracing::info!("{message}");
        self.message = Some(message);
    }

    /// Render the explorer panel
    pub fn ui(&mut self, ui: &mut egui::Ui, session: &ViewerSession) {
        ui.horizontal(|ui| {
            if ui.add_enabled(!self.prefix.is_empty(), egui::Button::new("\u{2b06} Up")).clicked() {
                self.prefix = parent_prefix(&self.prefix);
            }
            ui.label("Prefix:");
            ui.add(
                egui::TextEdit::singleline(&mut self.prefix)
                    .hint_text("<root>")
                    .desired_width(200.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Copy JSON").on_hover_text("Copy both hierarchies as JSON").clicked() {
                    let panel = session.panel();
                    match explorer::export_hierarchy_json(
                        panel.view_model_hierarchy(),
                        panel.state_machine_hierarchy(),
                    ) {
                        Ok(json) => {
                            self.message = Some(format!("Copied hierarchy ({} bytes)", json.len()));
                            ui.output_mut(|o| o.copied_text = json);
                        }
                        Err(e) => {
                            tracing::error!("Failed to serialise hierarchy: {e}");
                        }
                    }
                }
            });
        });

        ui.separator();

        match self.level(session) {
            None => {
                ui.label(egui::RichText::new("Nothing to explore at this prefix.").weak());
            }
            Some(level) => {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .max_height((ui.available_height() - 60.0).max(0.0))
                    .show(ui, |ui| {
                        egui::Grid::new("explorer_rows")
                            .num_columns(3)
                            .striped(true)
                            .show(ui, |ui| {
                                for row in &level.rows {
                                    self.row_ui(ui, row);
                                    ui.end_row();
                                }
                            });
                    });
            }
        }

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Set");
            ui.add(
                egui::TextEdit::singleline(&mut self.set_path)
                    .hint_text("path")
                    .desired_width(180.0),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.set_value)
                    .hint_text("value")
                    .desired_width(120.0),
            );
            if ui.button("Apply").clicked() {
                self.apply_set(session);
            }
        });
        if let Some(message) = &self.message {
            ui.label(egui::RichText::new(message).small().weak());
        }
    }

    fn row_ui(&mut self, ui: &mut egui::Ui, row: &ExploreRow) {
        match row {
            ExploreRow::Scalar { name, path, input_kind, value } => {
                if ui.selectable_label(self.set_path == *path, name.as_str()).clicked() {
                    self.set_path = path.clone();
                    self.set_value = value.as_ref().map(ToString::to_string).unwrap_or_default();
                }
                ui.label(egui::RichText::new(input_kind.name()).weak());
                match value {
                    Some(value) => ui.monospace(value.to_string()),
                    None => ui.label(egui::RichText::new("-").weak()),
                };
            }
            ExploreRow::Group { name, path, children, has_scalars } => {
                if ui.link(format!("{name}/")).on_hover_text(path.as_str()).clicked() {
                    self.prefix = path.clone();
                }
                ui.label(egui::RichText::new("group").weak());
                let scalars = if *has_scalars { ", scalars" } else { "" };
                ui.label(format!("{children} groups{scalars}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rive_viewer_bindings::config::ViewerConfig;
    use rive_viewer_bindings::memory::MemoryRuntime;
    use std::rc::Rc;
    use std::time::Instant;

    fn session() -> ViewerSession {
        let mut config = ViewerConfig::default();
        config.instance.auto_fill_state_machine = false;
        let mut session = ViewerSession::new(config);
        let runtime = MemoryRuntime::from_ron(
            r#"(view_model: Some((properties: {
                "title": String("hello"),
                "menu": Nested((properties: {
                    "items": List([(properties: {"count": Number(3.0)})]),
                })),
            })))"#,
        )
        .unwrap();
        session.load_started("menu.ron");
        session.loaded(Rc::new(runtime), Instant::now());
        session
    }

    #[test]
    fn test_parent_prefix() {
        assert_eq!(parent_prefix("menu/items/0"), "menu/items");
        assert_eq!(parent_prefix("menu/"), "");
        assert_eq!(parent_prefix(""), "");
    }

    #[test]
    fn test_levels_follow_prefix() {
        let session = session();
        let mut panel = ExplorerPanel::new();

        let top = panel.level(&session).unwrap();
        assert_eq!(top.rows.len(), 2);

        panel.prefix = "menu/items/0".into();
        let item = panel.level(&session).unwrap();
        assert!(matches!(
            &item.rows[0],
            ExploreRow::Scalar { path, .. } if path == "menu/items/0/count"
        ));
    }

    #[test]
    fn test_apply_set() {
        let session = session();
        let mut panel = ExplorerPanel::new();

        panel.set_path = "menu/items/0/count".into();
        panel.set_value = "7".into();
        panel.apply_set(&session);
        assert_eq!(panel.message.as_deref(), Some("menu/items/0/count = 7"));

        panel.set_path = "menu/ghost".into();
        panel.apply_set(&session);
        assert_eq!(panel.message.as_deref(), Some("menu/ghost is not available"));
    }

    #[test]
    fn test_without_animation() {
        let session = ViewerSession::default();
        let mut panel = ExplorerPanel::new();
        assert!(panel.level(&session).is_none());
        panel.apply_set(&session);
        assert_eq!(panel.message.as_deref(), Some("No ViewModel is bound"));
    }
}
