//! Repair-job kanban board core: optimistic board state over a remote `reparaciones` table.

pub mod board;
pub mod error;
pub mod form;
pub mod gateway;
pub mod rest;

pub use board::{equipment_count_label, Board, BoardController, BoardStats, Dispatch, OpId};
pub use error::GatewayError;
pub use form::{FormState, FormSubmission, MissingFields};
pub use gateway::{
    execute, GatewayOp, GatewayOutcome, GatewayRequest, GatewayResponse, MemoryGateway,
    RepairGateway,
};
pub use rest::RestGateway;
