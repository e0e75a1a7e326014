//! Board state: the ordered repair collection, the modal form, and optimistic write bookkeeping.
//!
//! Every write is split in two. `begin_*` mutates local state right away and hands back a
//! [`Dispatch`] describing the remote call; [`Board::complete`] later applies the gateway's
//! answer, restoring the affected record if the call failed. Rollback data is kept per
//! operation, keyed by [`OpId`].

use std::collections::HashMap;

use shared::{
    domain::{Direction, Estado, RepairFields, RepairId, RepairRecord},
    protocol::RepairPatch,
};
use tracing::{debug, error, warn};

use crate::{
    error::GatewayError,
    form::{FormState, FormSubmission, MissingFields},
    gateway::{execute, GatewayOutcome, GatewayRequest, GatewayResponse, RepairGateway},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u64);

/// A remote call the caller must run and report back through [`Board::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub op_id: OpId,
    pub request: GatewayRequest,
}

#[derive(Debug, Clone)]
enum Pending {
    Load,
    Add,
    Edit { previous: RepairRecord },
    Move { previous: RepairRecord },
    Delete { index: usize, record: RepairRecord },
}

impl Pending {
    fn failure_prefix(&self) -> &'static str {
        match self {
            Pending::Load => "Error al cargar reparaciones",
            Pending::Add => "Error al agregar equipo",
            Pending::Edit { .. } => "Error al actualizar equipo",
            Pending::Move { .. } => "Error al mover equipo",
            Pending::Delete { .. } => "Error al eliminar equipo",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub per_stage: [usize; 3],
    pub total: usize,
}

impl BoardStats {
    pub fn count(&self, estado: Estado) -> usize {
        self.per_stage[estado.index()]
    }
}

/// `"1 equipo"`, `"3 equipos"`.
pub fn equipment_count_label(count: usize) -> String {
    if count == 1 {
        format!("{count} equipo")
    } else {
        format!("{count} equipos")
    }
}

#[derive(Debug, Default)]
pub struct Board {
    records: Vec<RepairRecord>,
    pub form: FormState,
    error: Option<String>,
    pending: HashMap<OpId, Pending>,
    next_op: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RepairRecord] {
        &self.records
    }

    pub fn record(&self, id: RepairId) -> Option<&RepairRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records in one column, in display order.
    pub fn records_in(&self, estado: Estado) -> impl Iterator<Item = &RepairRecord> {
        self.records.iter().filter(move |r| r.estado == estado)
    }

    pub fn stats(&self) -> BoardStats {
        let mut stats = BoardStats {
            total: self.records.len(),
            ..BoardStats::default()
        };
        for record in &self.records {
            stats.per_stage[record.estado.index()] += 1;
        }
        stats
    }

    pub fn is_loading(&self) -> bool {
        self.pending.values().any(|p| matches!(p, Pending::Load))
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn track(&mut self, pending: Pending, request: GatewayRequest) -> Dispatch {
        self.next_op += 1;
        let op_id = OpId(self.next_op);
        debug!(op = op_id.0, request = request.name(), "optimistic operation started");
        self.pending.insert(op_id, pending);
        Dispatch { op_id, request }
    }

    pub fn begin_load(&mut self) -> Dispatch {
        self.track(Pending::Load, GatewayRequest::List)
    }

    /// Closes and clears the form at once. The record only appears once the gateway returns it.
    pub fn begin_add(&mut self, fields: RepairFields) -> Dispatch {
        self.form.reset();
        self.track(Pending::Add, GatewayRequest::Insert(fields))
    }

    pub fn begin_edit(&mut self, id: RepairId, fields: RepairFields) -> Option<Dispatch> {
        self.form.reset();
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        let previous = record.clone();
        record.apply_fields(fields.clone());
        Some(self.track(
            Pending::Edit { previous },
            GatewayRequest::Update {
                id,
                patch: RepairPatch::from(fields),
            },
        ))
    }

    /// `None` when the record is unknown or already at that end of the board.
    pub fn begin_move(&mut self, id: RepairId, direction: Direction) -> Option<Dispatch> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        let target = record.estado.shifted(direction)?;
        let previous = record.clone();
        record.estado = target;
        Some(self.track(
            Pending::Move { previous },
            GatewayRequest::Update {
                id,
                patch: RepairPatch::estado(target),
            },
        ))
    }

    /// `None` when the id is not on the board, so a repeated delete never reaches the gateway.
    pub fn begin_delete(&mut self, id: RepairId) -> Option<Dispatch> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let record = self.records.remove(index);
        Some(self.track(Pending::Delete { index, record }, GatewayRequest::Delete(id)))
    }

    /// Submits the modal form as an add or an edit. Blank required fields keep the form open.
    pub fn submit_form(&mut self) -> Result<Option<Dispatch>, MissingFields> {
        match self.form.submit()? {
            FormSubmission::Create(fields) => Ok(Some(self.begin_add(fields))),
            FormSubmission::Update(id, fields) => Ok(self.begin_edit(id, fields)),
        }
    }

    pub fn complete(&mut self, op_id: OpId, outcome: GatewayOutcome) {
        let Some(pending) = self.pending.remove(&op_id) else {
            warn!(op = op_id.0, "completion for unknown operation ignored");
            return;
        };

        let outcome = match (&pending, outcome) {
            (Pending::Load, Ok(GatewayResponse::Records(mut records))) => {
                records.sort_by_key(|r| (r.created_at, r.id));
                self.records = records;
                Ok(())
            }
            (Pending::Add, Ok(GatewayResponse::Created(record))) => {
                if self.record(record.id).is_none() {
                    self.records.push(record);
                }
                Ok(())
            }
            (
                Pending::Edit { .. } | Pending::Move { .. } | Pending::Delete { .. },
                Ok(GatewayResponse::Done),
            ) => Ok(()),
            (_, Ok(other)) => Err(GatewayError::Decode(format!(
                "unexpected gateway response {other:?}"
            ))),
            (_, Err(err)) => Err(err),
        };

        match outcome {
            Ok(()) => debug!(op = op_id.0, "operation confirmed"),
            Err(err) => {
                error!(op = op_id.0, error = %err, "operation failed; rolling back");
                self.error = Some(format!("{}: {err}", pending.failure_prefix()));
                self.roll_back(pending);
            }
        }
    }

    /// Fails every operation still waiting on the gateway, newest first, so rollbacks
    /// unwind in reverse order and the banner names the oldest failure.
    pub fn fail_pending(&mut self, error: GatewayError) {
        let mut op_ids: Vec<OpId> = self.pending.keys().copied().collect();
        op_ids.sort_unstable_by(|a, b| b.cmp(a));
        for op_id in op_ids {
            self.complete(op_id, Err(error.clone()));
        }
    }

    fn roll_back(&mut self, pending: Pending) {
        match pending {
            Pending::Load => self.records.clear(),
            Pending::Add => {}
            Pending::Edit { previous } | Pending::Move { previous } => {
                if let Some(record) = self.records.iter_mut().find(|r| r.id == previous.id) {
                    *record = previous;
                }
            }
            Pending::Delete { index, record } => {
                if self.record(record.id).is_none() {
                    let index = index.min(self.records.len());
                    self.records.insert(index, record);
                }
            }
        }
    }
}

/// Drives a [`Board`] against a gateway, awaiting each remote call in place.
pub struct BoardController<G> {
    pub board: Board,
    gateway: G,
}

impl<G: RepairGateway> BoardController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            board: Board::new(),
            gateway,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    async fn run(&mut self, dispatch: Option<Dispatch>) {
        if let Some(Dispatch { op_id, request }) = dispatch {
            let outcome = execute(&self.gateway, request).await;
            self.board.complete(op_id, outcome);
        }
    }

    pub async fn load(&mut self) {
        let dispatch = self.board.begin_load();
        self.run(Some(dispatch)).await;
    }

    pub async fn add(&mut self, fields: RepairFields) {
        let dispatch = self.board.begin_add(fields);
        self.run(Some(dispatch)).await;
    }

    pub async fn edit(&mut self, id: RepairId, fields: RepairFields) {
        let dispatch = self.board.begin_edit(id, fields);
        self.run(dispatch).await;
    }

    pub async fn move_record(&mut self, id: RepairId, direction: Direction) {
        let dispatch = self.board.begin_move(id, direction);
        self.run(dispatch).await;
    }

    pub async fn delete(&mut self, id: RepairId) {
        let dispatch = self.board.begin_delete(id);
        self.run(dispatch).await;
    }

    pub async fn submit_form(&mut self) -> Result<(), MissingFields> {
        let dispatch = self.board.submit_form()?;
        self.run(dispatch).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
