use std::time::Duration;

use board_core::Board;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::Estado;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{apply_ui_event, BackendStatus};
use crate::ui::theme::{BANNER_FILL, MUTED_TEXT};
use crate::ui::widgets::{
    column_header, empty_column, form_body, header_stats, repair_card, CardAction, FormAction,
};

pub struct TallerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    board: Board,
    backend: BackendStatus,
    status: String,
    form_hint: Option<String>,
}

impl TallerApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            board: Board::new(),
            backend: BackendStatus::Starting,
            status: "Iniciando backend...".to_string(),
            form_hint: None,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        let dispatch = self.board.begin_load();
        dispatch_backend_command(&self.cmd_tx, Some(dispatch), &mut self.board, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.board, &mut self.backend, &mut self.status, event);
        }
    }

    fn apply_card_action(&mut self, action: CardAction) {
        let dispatch = match action {
            CardAction::Move(id, direction) => self.board.begin_move(id, direction),
            CardAction::Delete(id) => self.board.begin_delete(id),
            CardAction::Edit(id) => {
                if let Some(record) = self.board.record(id).cloned() {
                    self.form_hint = None;
                    self.board.form.open_edit(&record);
                }
                None
            }
        };
        dispatch_backend_command(&self.cmd_tx, dispatch, &mut self.board, &mut self.status);
    }

    fn submit_form(&mut self) {
        match self.board.submit_form() {
            Ok(dispatch) => {
                self.form_hint = None;
                dispatch_backend_command(&self.cmd_tx, dispatch, &mut self.board, &mut self.status);
            }
            Err(missing) => self.form_hint = Some(missing.to_string()),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("board_header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading("🔧 Gestión de Reparaciones");
                    ui.label(
                        egui::RichText::new("Panel de control para mantenimiento de computadoras")
                            .color(MUTED_TEXT),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let reload = ui.add_enabled(
                        !self.board.is_loading(),
                        egui::Button::new("⟳ Recargar"),
                    );
                    if reload.clicked() {
                        self.reload();
                    }
                    ui.add_space(16.0);
                    header_stats(ui, &self.board.stats());
                });
            });
            ui.add_space(4.0);
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("board_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let dot = match self.backend {
                    BackendStatus::Starting => egui::Color32::from_rgb(245, 158, 11),
                    BackendStatus::Ready => egui::Color32::from_rgb(16, 185, 129),
                    BackendStatus::Failed => egui::Color32::from_rgb(239, 68, 68),
                };
                ui.label(egui::RichText::new("●").color(dot));
                ui.label(egui::RichText::new(&self.status).small().color(MUTED_TEXT));
                let in_flight = self.board.in_flight();
                if in_flight > 0 {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("{in_flight} operaciones pendientes"))
                                .small()
                                .color(MUTED_TEXT),
                        );
                    });
                }
            });
        });
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self.board.error().map(str::to_owned) else {
            return;
        };
        let mut dismissed = false;
        egui::Frame::new()
            .fill(BANNER_FILL)
            .inner_margin(egui::Margin::same(10))
            .corner_radius(egui::CornerRadius::same(4))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.small_button("✖").clicked();
                    });
                });
            });
        if dismissed {
            self.board.dismiss_error();
        }
        ui.add_space(8.0);
    }

    fn show_board(&mut self, ctx: &egui::Context) {
        let mut pending_action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_error_banner(ui);

            if self.board.is_loading() {
                ui.vertical_centered(|ui| {
                    ui.add_space(48.0);
                    ui.spinner();
                    ui.label(egui::RichText::new("Cargando reparaciones...").color(MUTED_TEXT));
                });
                return;
            }

            let board = &self.board;
            ui.columns(Estado::ORDER.len(), |columns| {
                for (column, estado) in columns.iter_mut().zip(Estado::ORDER) {
                    let records: Vec<_> = board.records_in(estado).collect();
                    column_header(column, estado, records.len());
                    column.add_space(8.0);
                    egui::ScrollArea::vertical()
                        .id_salt(("stage_column", estado.as_str()))
                        .auto_shrink([false, false])
                        .show(column, |ui| {
                            if records.is_empty() {
                                empty_column(ui);
                            }
                            for record in records {
                                if let Some(action) = repair_card(ui, record) {
                                    pending_action = Some(action);
                                }
                            }
                        });
                }
            });
        });
        if let Some(action) = pending_action {
            self.apply_card_action(action);
        }
    }

    fn show_add_button(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("add_repair_fab"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-28.0, -44.0))
            .show(ctx, |ui| {
                let button = egui::Button::new(egui::RichText::new("➕").size(24.0))
                    .min_size(egui::vec2(56.0, 56.0))
                    .corner_radius(egui::CornerRadius::same(28));
                if ui.add(button).on_hover_text("Agregar equipo").clicked() {
                    self.form_hint = None;
                    self.board.form.open_blank();
                }
            });
    }

    fn show_form(&mut self, ctx: &egui::Context) {
        if !self.board.form.open {
            return;
        }
        let mut open = true;
        let title = self.board.form.title();
        let form_hint = self.form_hint.clone();
        let action = egui::Window::new(title)
            .id(egui::Id::new("repair_form"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.set_min_width(360.0);
                if let Some(hint) = &form_hint {
                    ui.label(egui::RichText::new(hint).color(egui::Color32::from_rgb(239, 68, 68)));
                }
                form_body(ui, &mut self.board.form)
            })
            .and_then(|response| response.inner)
            .flatten();

        match action {
            Some(FormAction::Submit) => self.submit_form(),
            Some(FormAction::Cancel) => {
                self.form_hint = None;
                self.board.form.close();
            }
            None if !open => {
                self.form_hint = None;
                self.board.form.close();
            }
            None => {}
        }
    }
}

impl eframe::App for TallerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_board(ctx);
        self.show_add_button(ctx);
        self.show_form(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for TallerApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
