//! Backend-to-UI events.

use board_core::{GatewayOutcome, OpId};

pub enum UiEvent {
    BackendReady(String),
    BackendFailed(String),
    Completed { op_id: OpId, outcome: GatewayOutcome },
}
