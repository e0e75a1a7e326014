use board_core::{equipment_count_label, BoardStats, FormState};
use chrono::Local;
use egui::{Align, Button, Layout, Margin, RichText, Stroke};
use shared::domain::{Direction, Estado, RepairId, RepairRecord};

use crate::ui::theme::{stage_palette, MUTED_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Move(RepairId, Direction),
    Edit(RepairId),
    Delete(RepairId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
}

pub fn header_stats(ui: &mut egui::Ui, stats: &BoardStats) {
    for estado in Estado::ORDER {
        stat_item(ui, stats.count(estado), estado.title());
    }
    stat_item(ui, stats.total, "Total");
}

fn stat_item(ui: &mut egui::Ui, value: usize, label: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(value.to_string()).strong().size(20.0));
        ui.label(RichText::new(label).small().color(MUTED_TEXT));
    });
    ui.add_space(12.0);
}

pub fn column_header(ui: &mut egui::Ui, estado: Estado, count: usize) {
    let palette = stage_palette(estado);
    egui::Frame::new()
        .fill(palette.accent)
        .inner_margin(Margin::same(8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(estado.title()).strong().color(egui::Color32::WHITE));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(equipment_count_label(count)).color(egui::Color32::WHITE));
                });
            });
        });
}

pub fn empty_column(ui: &mut egui::Ui) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new("📦").size(32.0).color(MUTED_TEXT));
        ui.label(RichText::new("Sin equipos").color(MUTED_TEXT));
    });
}

/// Draws one card. Stage controls are only offered where a move is possible.
pub fn repair_card(ui: &mut egui::Ui, record: &RepairRecord) -> Option<CardAction> {
    let palette = stage_palette(record.estado);
    let mut action = None;

    egui::Frame::new()
        .fill(palette.card_fill)
        .stroke(Stroke::new(1.0, palette.accent))
        .inner_margin(Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("💻 {}", record.modelo)).strong().size(15.0));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("✖").on_hover_text("Eliminar equipo").clicked() {
                        action = Some(CardAction::Delete(record.id));
                    }
                    if ui.small_button("✏").on_hover_text("Editar equipo").clicked() {
                        action = Some(CardAction::Edit(record.id));
                    }
                    if record.estado.can_move(Direction::Forward)
                        && ui.small_button("▶").on_hover_text("Mover adelante").clicked()
                    {
                        action = Some(CardAction::Move(record.id, Direction::Forward));
                    }
                    if record.estado.can_move(Direction::Backward)
                        && ui.small_button("◀").on_hover_text("Mover atrás").clicked()
                    {
                        action = Some(CardAction::Move(record.id, Direction::Backward));
                    }
                });
            });
            ui.add_space(4.0);
            card_field(ui, "Dueño", &record.duenio);
            card_field(ui, "Síntoma", &record.sintoma);
            card_field(ui, "Observación", &record.observacion);
            card_field(ui, "Tratamiento", &record.tratamiento);
            ui.label(
                RichText::new(format!(
                    "Ingreso: {}",
                    record.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
                ))
                .small()
                .color(MUTED_TEXT),
            );
        });
    ui.add_space(8.0);
    action
}

fn card_field(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.label(RichText::new(label).small().color(MUTED_TEXT));
    if value.is_empty() {
        ui.label(RichText::new("—").color(MUTED_TEXT));
    } else {
        ui.label(value);
    }
}

pub fn form_body(ui: &mut egui::Ui, form: &mut FormState) -> Option<FormAction> {
    let values = &mut form.values;
    labelled(ui, "Modelo *", |ui| {
        ui.add(egui::TextEdit::singleline(&mut values.modelo).hint_text("Ej: HP Pavilion, Dell XPS..."))
    });
    labelled(ui, "Dueño *", |ui| {
        ui.add(egui::TextEdit::singleline(&mut values.duenio).hint_text("Nombre del propietario"))
    });
    labelled(ui, "Síntoma *", |ui| {
        ui.add(
            egui::TextEdit::multiline(&mut values.sintoma)
                .desired_rows(2)
                .hint_text("Descripción del problema..."),
        )
    });
    labelled(ui, "Observación", |ui| {
        ui.add(
            egui::TextEdit::multiline(&mut values.observacion)
                .desired_rows(2)
                .hint_text("Observaciones técnicas..."),
        )
    });
    labelled(ui, "Tratamiento", |ui| {
        ui.add(
            egui::TextEdit::multiline(&mut values.tratamiento)
                .desired_rows(2)
                .hint_text("Reparación a realizar..."),
        )
    });
    let estado_label = if form.editing.is_some() {
        "Estado"
    } else {
        "Estado Inicial"
    };
    labelled(ui, estado_label, |ui| {
        egui::ComboBox::from_id_salt("form_estado")
            .selected_text(values.estado.title())
            .show_ui(ui, |ui| {
                for estado in Estado::ORDER {
                    ui.selectable_value(&mut values.estado, estado, estado.title());
                }
            })
            .response
    });

    let missing = values.missing_required();
    ui.add_space(8.0);
    if !missing.is_empty() {
        ui.label(
            RichText::new("Modelo, dueño y síntoma son obligatorios")
                .small()
                .color(MUTED_TEXT),
        );
    }

    let submit_label = if form.editing.is_some() {
        "Guardar"
    } else {
        "➕ Agregar"
    };
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("Cancelar").clicked() {
            action = Some(FormAction::Cancel);
        }
        if ui
            .add_enabled(missing.is_empty(), Button::new(submit_label))
            .clicked()
        {
            action = Some(FormAction::Submit);
        }
    });
    action
}

fn labelled(
    ui: &mut egui::Ui,
    label: &str,
    add_contents: impl FnOnce(&mut egui::Ui) -> egui::Response,
) {
    ui.label(RichText::new(label).strong());
    add_contents(ui);
    ui.add_space(4.0);
}
