//! Backend commands queued from UI to backend worker.

use board_core::Dispatch;

pub enum BackendCommand {
    Execute(Dispatch),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Execute(dispatch) => dispatch.request.name(),
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
