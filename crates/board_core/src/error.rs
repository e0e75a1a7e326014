use shared::domain::RepairId;
use thiserror::Error;

/// Failure of a remote table operation. The board treats every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("gateway responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed gateway response: {0}")]
    Decode(String),
    #[error("reparación {0} no encontrada")]
    NotFound(RepairId),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    #[error("invalid gateway url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
