// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas panel - animation surface, playback and file controls.
//!
//! Drawing the animation itself is the runtime's job; the panel reserves the
//! surface, paints the configured background and reports what is loaded.

use rive_viewer_bindings::config::LayoutFit;
use rive_viewer_bindings::registry::{file_arg_to_path, looks_like_animation_file};
use rive_viewer_bindings::session::ViewerSession;
use std::path::PathBuf;

/// Requests the canvas raises for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasAction {
    /// Open an animation file
    Open(PathBuf),
    /// Load the current file again
    Reload,
    /// Unload the current animation
    Unload,
    /// Persist the viewer settings
    SaveSettings,
}

/// Canvas panel state
#[derive(Debug, Default)]
pub struct CanvasPanel {
    /// Path typed into the open field
    pub open_path: String,
}

impl CanvasPanel {
    /// Create a new canvas panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Path to open from the typed text, if it names an animation file
    pub fn requested_path(&self) -> Option<PathBuf> {
        let text = self.open_path.trim();
        looks_like_animation_file(text).then(|| file_arg_to_path(text))
    }

    /// Render the canvas panel
    pub fn ui(&mut self, ui: &mut egui::Ui, session: &mut ViewerSession) -> Vec<CanvasAction> {
        let mut actions = Vec::new();
        let loaded = session.handle().is_some();

        ui.horizontal(|ui| {
            if ui.add_enabled(loaded, egui::Button::new("\u{25b6} Play")).clicked() {
                session.play();
            }
            if ui.add_enabled(loaded, egui::Button::new("\u{23f8} Pause")).clicked() {
                session.pause();
            }
            if ui.add_enabled(loaded, egui::Button::new("\u{23ee} Reset")).clicked() {
                session.reset_playback();
            }

            ui.separator();

            let mut fit = session.config().layout_fit;
            egui::ComboBox::from_id_salt("canvas_layout_fit")
                .selected_text(fit.name())
                .show_ui(ui, |ui| {
                    for option in LayoutFit::ALL {
                        ui.selectable_value(&mut fit, option, option.name());
                    }
                });
            if fit != session.config().layout_fit {
                tracing::debug!("Layout fit set to {fit}");
                session.config_mut().layout_fit = fit;
            }

            ui.separator();

            if ui.add_enabled(loaded, egui::Button::new("Reload")).clicked() {
                actions.push(CanvasAction::Reload);
            }
            if ui.add_enabled(loaded, egui::Button::new("Unload")).clicked() {
                actions.push(CanvasAction::Unload);
            }
            if ui.button("Save settings").clicked() {
                actions.push(CanvasAction::SaveSettings);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Open:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.open_path)
                    .hint_text("path/to/animation.riv")
                    .desired_width(320.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let requested = self.requested_path();
            let clicked = ui.add_enabled(requested.is_some(), egui::Button::new("Open")).clicked();
            if clicked || submitted {
                if let Some(path) = requested {
                    actions.push(CanvasAction::Open(path));
                }
            }
        });

        ui.separator();

        let [r, g, b] = session.config().canvas_rgb();
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), (ui.available_height() - 24.0).max(0.0)),
            egui::Sense::hover(),
        );
        ui.painter().rect_filled(rect, 4.0, egui::Color32::from_rgb(r, g, b));

        let caption = match (session.file_name(), session.handle()) {
            (Some(file), Some(handle)) => {
                let artboard = handle.artboard_name().unwrap_or_else(|| "default artboard".to_string());
                format!("{file}\n{artboard} ({})", session.config().layout_fit)
            }
            _ => "Drop a .riv file here or open one above".to_string(),
        };
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            caption,
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(160),
        );

        ui.label(egui::RichText::new(session.status()).small().weak());
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_path() {
        let mut panel = CanvasPanel::new();
        assert_eq!(panel.requested_path(), None);

        panel.open_path = " file:///tmp/My%20Scene.riv ".into();
        assert_eq!(panel.requested_path(), Some(PathBuf::from("/tmp/My Scene.riv")));

        panel.open_path = "notes.txt".into();
        assert_eq!(panel.requested_path(), None);
    }

    #[test]
    fn test_draws_without_animation() {
        let ctx = egui::Context::default();
        let mut panel = CanvasPanel::new();
        let mut session = ViewerSession::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                actions = panel.ui(ui, &mut session);
            });
        });
        assert!(actions.is_empty());
    }
}
