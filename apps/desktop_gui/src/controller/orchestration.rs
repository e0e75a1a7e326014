//! Command orchestration helpers from UI actions to backend command queue.

use board_core::{Board, Dispatch, GatewayError};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues an optimistic operation's remote call. If the queue cannot take it, the
/// operation is completed as failed right away so the board rolls back.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    dispatch: Option<Dispatch>,
    board: &mut Board,
    status: &mut String,
) {
    let Some(dispatch) = dispatch else {
        return;
    };
    let op_id = dispatch.op_id;
    let cmd = BackendCommand::Execute(dispatch);
    let cmd_name = cmd.name();

    let failure = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, op = op_id.0, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            "UI command queue is full; please retry"
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
            "Backend command processor disconnected (possible startup/runtime failure)"
        }
    };
    *status = failure.to_string();
    board.complete(op_id, Err(GatewayError::Unavailable(failure.to_string())));
}
