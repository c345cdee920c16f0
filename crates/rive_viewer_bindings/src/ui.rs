// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui drawing for the control panel.
//!
//! Draws the headless model from [`crate::controls`] and returns the edits
//! raised this frame. Nothing here talks to the runtime.

use crate::binding::{Binding, BindingSet, WidgetState, NO_ENUM_VALUES};
use crate::controls::{ControlEdit, ControlPanel, ControlSection};
use egui::{Color32, RichText, Ui};

/// Draw the whole panel
pub fn draw_control_panel(ui: &mut Ui, panel: &mut ControlPanel) -> Vec<ControlEdit> {
    let mut edits = Vec::new();

    ui.horizontal(|ui| {
        ui.heading("ViewModel Inputs");
        ui.label(RichText::new(panel.total_controls().to_string()).strong());
    });
    if let Some(status) = panel.status() {
        ui.label(RichText::new(status).small().weak());
    }
    ui.separator();

    if let Some(message) = panel.empty_message() {
        ui.label(RichText::new(message).weak());
        return edits;
    }

    let (sections, bindings) = panel.parts_mut();
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for section in sections {
                draw_section(ui, section, bindings, &mut edits);
            }
        });

    edits
}

fn draw_section(ui: &mut Ui, section: &ControlSection, bindings: &mut BindingSet, edits: &mut Vec<ControlEdit>) {
    let [r, g, b] = section.accent;
    let accent = Color32::from_rgb(r, g, b);
    let title = RichText::new(format!("{}  ({})", section.label, section.badge)).color(accent);

    egui::CollapsingHeader::new(title)
        .id_salt(("vm_section", &section.path, section.kind))
        .default_open(section.default_open)
        .show(ui, |ui| {
            let stripe = ui.available_rect_before_wrap();
            ui.painter().vline(
                stripe.left() - 4.0,
                stripe.y_range(),
                egui::Stroke::new(2.0, accent.gamma_multiply(0.6)),
            );

            for id in &section.controls {
                if let Some(binding) = bindings.get_mut(*id) {
                    draw_binding(ui, binding, edits);
                }
            }
            for child in &section.children {
                draw_section(ui, child, bindings, edits);
            }
        });
}

fn draw_binding(ui: &mut Ui, binding: &mut Binding, edits: &mut Vec<ControlEdit>) {
    let id = binding.id;
    let enabled = binding.interactive();

    ui.horizontal(|ui| {
        ui.label(format!("{} ({})", binding.descriptor.name, binding.descriptor.kind))
            .on_hover_text(&binding.descriptor.path);

        match &mut binding.widget {
            WidgetState::Number { text } => {
                if let Some(text) = text_field(ui, id, text, enabled, 80.0, edits) {
                    edits.push(ControlEdit::Number { id, text });
                }
            }
            WidgetState::Boolean { checked } => {
                if ui.add_enabled(enabled, egui::Checkbox::without_text(checked)).changed() {
                    edits.push(ControlEdit::Boolean { id, checked: *checked });
                }
            }
            WidgetState::Text { text } => {
                if let Some(text) = text_field(ui, id, text, enabled, 150.0, edits) {
                    edits.push(ControlEdit::Text { id, text });
                }
            }
            WidgetState::Enum { options, selected } => {
                ui.add_enabled_ui(enabled, |ui| {
                    let shown = if options.is_empty() { NO_ENUM_VALUES } else { selected.as_str() };
                    let before = selected.clone();
                    egui::ComboBox::from_id_salt(("vm_enum", id.0))
                        .selected_text(shown.to_string())
                        .show_ui(ui, |ui| {
                            for option in options.iter() {
                                ui.selectable_value(selected, option.clone(), option.as_str());
                            }
                        });
                    if *selected != before {
                        edits.push(ControlEdit::Enum { id, selected: selected.clone() });
                    }
                });
            }
            WidgetState::Color { rgb, alpha_text } => {
                let swatch = ui.add_enabled_ui(enabled, |ui| ui.color_edit_button_srgb(rgb)).inner;
                let alpha = text_field(ui, id, alpha_text, enabled, 40.0, edits);
                ui.label("%");
                if swatch.changed() || alpha.is_some() {
                    edits.push(ControlEdit::Color {
                        id,
                        rgb: *rgb,
                        alpha_text: alpha_text.clone(),
                    });
                }
            }
            WidgetState::Trigger => {
                if ui.add_enabled(enabled, egui::Button::new("Fire")).clicked() {
                    edits.push(ControlEdit::Fire { id });
                }
            }
        }
    });
}

/// Single-line field that reports focus changes and returns the text when
/// editing ends.
fn text_field(
    ui: &mut Ui,
    id: crate::binding::BindingId,
    text: &mut String,
    enabled: bool,
    width: f32,
    edits: &mut Vec<ControlEdit>,
) -> Option<String> {
    let response = ui.add_enabled(enabled, egui::TextEdit::singleline(text).desired_width(width));
    if response.gained_focus() {
        edits.push(ControlEdit::Focus { id, focused: true });
    }
    if response.lost_focus() {
        edits.push(ControlEdit::Focus { id, focused: false });
        return Some(text.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRuntime;
    use std::time::Instant;

    fn draw(panel: &mut ControlPanel) -> Vec<ControlEdit> {
        let ctx = egui::Context::default();
        let mut edits = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                edits = draw_control_panel(ui, panel);
            });
        });
        edits
    }

    #[test]
    fn test_draws_every_kind_without_edits() {
        let runtime = MemoryRuntime::from_ron(
            r#"(
                view_model: Some((properties: {
                    "n": Number(1.0),
                    "b": Boolean(true),
                    "s": String("x"),
                    "e": Enum(value: "a", values: ["a", "b"]),
                    "none": Enum(value: "", values: []),
                    "c": Color(4281558681),
                    "t": Trigger(Trigger),
                    "child": Nested((properties: {"deep": Number(2.0)})),
                })),
                state_machines: [(name: "Main", inputs: [(name: "go", value: Trigger)])],
            )"#,
        )
        .unwrap();
        let mut panel = ControlPanel::default();
        panel.render(&runtime, Instant::now());
        assert_eq!(panel.total_controls(), 9);

        assert!(draw(&mut panel).is_empty());
    }

    #[test]
    fn test_draws_empty_message() {
        let mut panel = ControlPanel::default();
        assert!(draw(&mut panel).is_empty());
    }
}
