//! Applies backend events to board state.

use board_core::{Board, GatewayError};

use crate::controller::events::UiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Starting,
    Ready,
    Failed,
}

pub fn apply_ui_event(
    board: &mut Board,
    backend: &mut BackendStatus,
    status: &mut String,
    event: UiEvent,
) {
    match event {
        UiEvent::BackendReady(description) => {
            *backend = BackendStatus::Ready;
            *status = format!("Conectado a {description}");
        }
        UiEvent::BackendFailed(message) => {
            *backend = BackendStatus::Failed;
            tracing::error!(%message, in_flight = board.in_flight(), "backend unavailable");
            // Queued requests died with the worker; nothing will ever complete them.
            board.fail_pending(GatewayError::Unavailable(message.clone()));
            *status = message;
        }
        UiEvent::Completed { op_id, outcome } => board.complete(op_id, outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use board_core::GatewayResponse;
    use chrono::Utc;
    use crossbeam_channel::bounded;
    use shared::domain::{Direction, RepairFields, RepairId, RepairRecord};

    use crate::backend_bridge::commands::BackendCommand;
    use crate::backend_bridge::runtime::{launch, GatewaySource};
    use crate::controller::orchestration::dispatch_backend_command;

    #[test]
    fn completion_events_reach_the_board() {
        let mut board = Board::new();
        let mut backend = BackendStatus::Starting;
        let mut status = String::new();

        let dispatch = board.begin_add(RepairFields::new("Acer Aspire", "Ana Ruiz", "No carga batería"));
        let record = RepairRecord::from_fields(
            RepairId(7),
            RepairFields::new("Acer Aspire", "Ana Ruiz", "No carga batería"),
            Utc::now(),
        );
        apply_ui_event(
            &mut board,
            &mut backend,
            &mut status,
            UiEvent::Completed {
                op_id: dispatch.op_id,
                outcome: Ok(GatewayResponse::Created(record.clone())),
            },
        );
        assert_eq!(board.records(), &[record]);
    }

    #[test]
    fn failed_completion_raises_banner() {
        let mut board = Board::new();
        let mut backend = BackendStatus::Ready;
        let mut status = String::new();

        let dispatch = board.begin_load();
        apply_ui_event(
            &mut board,
            &mut backend,
            &mut status,
            UiEvent::Completed {
                op_id: dispatch.op_id,
                outcome: Err(GatewayError::Transport("connection refused".into())),
            },
        );
        assert!(board.error().expect("banner").contains("cargar reparaciones"));
    }

    #[test]
    fn backend_lifecycle_updates_status_line() {
        let mut board = Board::new();
        let mut backend = BackendStatus::Starting;
        let mut status = String::new();

        apply_ui_event(
            &mut board,
            &mut backend,
            &mut status,
            UiEvent::BackendReady("http://127.0.0.1:8443".into()),
        );
        assert_eq!(backend, BackendStatus::Ready);
        assert!(status.contains("127.0.0.1"));

        apply_ui_event(
            &mut board,
            &mut backend,
            &mut status,
            UiEvent::BackendFailed("backend worker startup failure: boom".into()),
        );
        assert_eq!(backend, BackendStatus::Failed);
        assert!(status.contains("boom"));
    }

    #[test]
    fn backend_failure_rolls_back_in_flight_operations() {
        let mut board = Board::new();
        let mut backend = BackendStatus::Ready;
        let mut status = String::new();

        let load = board.begin_load();
        board.complete(
            load.op_id,
            Ok(GatewayResponse::Records(vec![RepairRecord::from_fields(
                RepairId(1),
                RepairFields::new("HP Pavilion", "Juan Pérez", "PC muy lenta"),
                Utc::now(),
            )])),
        );
        board.begin_load();
        board
            .begin_move(RepairId(1), Direction::Forward)
            .expect("movable");
        assert_eq!(board.in_flight(), 2);

        apply_ui_event(
            &mut board,
            &mut backend,
            &mut status,
            UiEvent::BackendFailed("backend worker stopped".into()),
        );

        assert_eq!(backend, BackendStatus::Failed);
        assert_eq!(board.in_flight(), 0);
        assert!(!board.is_loading());
        assert!(board.error().expect("banner").contains("backend worker stopped"));
    }

    #[test]
    fn startup_failure_ends_initial_load_with_banner() {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(8);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(8);
        let mut board = Board::new();
        let mut backend = BackendStatus::Starting;
        let mut status = String::new();

        let load = board.begin_load();
        dispatch_backend_command(&cmd_tx, Some(load), &mut board, &mut status);
        assert!(board.is_loading());

        let handle = launch(
            GatewaySource::Rest {
                base_url: "::not a url::".into(),
                api_key: None,
            },
            cmd_rx,
            ui_tx,
        );
        handle.join().expect("worker joins");
        while let Ok(event) = ui_rx.recv_timeout(Duration::from_millis(200)) {
            apply_ui_event(&mut board, &mut backend, &mut status, event);
        }

        assert_eq!(backend, BackendStatus::Failed);
        assert!(!board.is_loading());
        assert_eq!(board.in_flight(), 0);
        assert!(board
            .error()
            .expect("banner")
            .starts_with("Error al cargar reparaciones"));

        let reload = board.begin_load();
        dispatch_backend_command(&cmd_tx, Some(reload), &mut board, &mut status);
        assert!(!board.is_loading());
        assert!(status.contains("disconnected"));
    }
}
