//! Remote table access for `reparaciones`: the gateway contract plus an in-process implementation.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{RepairFields, RepairId, RepairRecord},
    protocol::RepairPatch,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::GatewayError;

#[async_trait]
pub trait RepairGateway: Send + Sync {
    /// `select * order by created_at asc`
    async fn list(&self) -> Result<Vec<RepairRecord>, GatewayError>;
    /// Inserts a row and returns it with its assigned `id` and `created_at`.
    async fn insert(&self, fields: &RepairFields) -> Result<RepairRecord, GatewayError>;
    async fn update(&self, id: RepairId, patch: &RepairPatch) -> Result<(), GatewayError>;
    async fn delete(&self, id: RepairId) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: RepairGateway + ?Sized> RepairGateway for Arc<G> {
    async fn list(&self) -> Result<Vec<RepairRecord>, GatewayError> {
        (**self).list().await
    }

    async fn insert(&self, fields: &RepairFields) -> Result<RepairRecord, GatewayError> {
        (**self).insert(fields).await
    }

    async fn update(&self, id: RepairId, patch: &RepairPatch) -> Result<(), GatewayError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: RepairId) -> Result<(), GatewayError> {
        (**self).delete(id).await
    }
}

/// One remote call, detached from the board so it can be shipped to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    List,
    Insert(RepairFields),
    Update { id: RepairId, patch: RepairPatch },
    Delete(RepairId),
}

impl GatewayRequest {
    pub fn name(&self) -> &'static str {
        match self {
            GatewayRequest::List => "list",
            GatewayRequest::Insert(_) => "insert",
            GatewayRequest::Update { .. } => "update",
            GatewayRequest::Delete(_) => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResponse {
    Records(Vec<RepairRecord>),
    Created(RepairRecord),
    Done,
}

pub type GatewayOutcome = Result<GatewayResponse, GatewayError>;

pub async fn execute<G>(gateway: &G, request: GatewayRequest) -> GatewayOutcome
where
    G: RepairGateway + ?Sized,
{
    let name = request.name();
    let outcome = match request {
        GatewayRequest::List => gateway.list().await.map(GatewayResponse::Records),
        GatewayRequest::Insert(fields) => gateway.insert(&fields).await.map(GatewayResponse::Created),
        GatewayRequest::Update { id, patch } => {
            gateway.update(id, &patch).await.map(|()| GatewayResponse::Done)
        }
        GatewayRequest::Delete(id) => gateway.delete(id).await.map(|()| GatewayResponse::Done),
    };
    if let Err(error) = &outcome {
        warn!(request = name, %error, "gateway request failed");
    }
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    List,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct MemoryTable {
    rows: Vec<RepairRecord>,
    next_id: i64,
    failing: Vec<(GatewayOp, String)>,
    calls: Vec<GatewayOp>,
}

impl MemoryTable {
    fn record_call(&mut self, op: GatewayOp) -> Result<(), GatewayError> {
        self.calls.push(op);
        match self.failing.iter().find(|(failing_op, _)| *failing_op == op) {
            Some((_, message)) => Err(GatewayError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

/// In-process `reparaciones` table with per-operation failure injection.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    table: Arc<Mutex<MemoryTable>>,
    latency: Option<Duration>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seeded(rows: impl IntoIterator<Item = RepairFields>) -> Self {
        let gateway = Self::new();
        {
            let mut table = gateway.table.lock().await;
            for fields in rows {
                insert_row(&mut table, fields);
            }
        }
        gateway
    }

    /// Delays every call, so optimistic state is visible before the reply lands.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every subsequent `op` fail with `message` until [`MemoryGateway::recover`].
    pub async fn fail_on(&self, op: GatewayOp, message: impl Into<String>) {
        self.table.lock().await.failing.push((op, message.into()));
    }

    pub async fn recover(&self) {
        self.table.lock().await.failing.clear();
    }

    pub async fn rows(&self) -> Vec<RepairRecord> {
        self.table.lock().await.rows.clone()
    }

    pub async fn calls(&self) -> Vec<GatewayOp> {
        self.table.lock().await.calls.clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn insert_row(table: &mut MemoryTable, fields: RepairFields) -> RepairRecord {
    table.next_id += 1;
    let record = RepairRecord::from_fields(RepairId(table.next_id), fields, Utc::now());
    table.rows.push(record.clone());
    record
}

#[async_trait]
impl RepairGateway for MemoryGateway {
    async fn list(&self) -> Result<Vec<RepairRecord>, GatewayError> {
        self.pause().await;
        let mut table = self.table.lock().await;
        table.record_call(GatewayOp::List)?;
        let mut rows = table.rows.clone();
        rows.sort_by_key(|r| (r.created_at, r.id));
        Ok(rows)
    }

    async fn insert(&self, fields: &RepairFields) -> Result<RepairRecord, GatewayError> {
        self.pause().await;
        let mut table = self.table.lock().await;
        table.record_call(GatewayOp::Insert)?;
        Ok(insert_row(&mut table, fields.clone()))
    }

    async fn update(&self, id: RepairId, patch: &RepairPatch) -> Result<(), GatewayError> {
        self.pause().await;
        let mut table = self.table.lock().await;
        table.record_call(GatewayOp::Update)?;
        let row = table
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(GatewayError::NotFound(id))?;
        patch.apply_to(row);
        Ok(())
    }

    async fn delete(&self, id: RepairId) -> Result<(), GatewayError> {
        self.pause().await;
        let mut table = self.table.lock().await;
        table.record_call(GatewayOp::Delete)?;
        table.rows.retain(|r| r.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Estado;

    #[tokio::test]
    async fn memory_gateway_assigns_increasing_ids() {
        let gateway = MemoryGateway::new();
        let a = gateway
            .insert(&RepairFields::new("HP", "Juan", "lenta"))
            .await
            .expect("a");
        let b = gateway
            .insert(&RepairFields::new("Dell", "María", "no arranca"))
            .await
            .expect("b");
        assert!(b.id > a.id);
        gateway.delete(a.id).await.expect("delete");
        let c = gateway
            .insert(&RepairFields::new("Lenovo", "Carlos", "pantalla azul"))
            .await
            .expect("c");
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn injected_failures_apply_per_operation_until_recovered() {
        let gateway = MemoryGateway::seeded([RepairFields::new("HP", "Juan", "lenta")]).await;
        gateway.fail_on(GatewayOp::Update, "timeout").await;

        let id = gateway.list().await.expect("list")[0].id;
        let err = gateway
            .update(id, &RepairPatch::estado(Estado::Progreso))
            .await
            .expect_err("should fail");
        assert_eq!(err, GatewayError::Unavailable("timeout".into()));

        gateway.recover().await;
        gateway
            .update(id, &RepairPatch::estado(Estado::Progreso))
            .await
            .expect("update");
        assert_eq!(gateway.rows().await[0].estado, Estado::Progreso);
        assert_eq!(
            gateway.calls().await,
            vec![GatewayOp::List, GatewayOp::Update, GatewayOp::Update]
        );
    }

    #[tokio::test]
    async fn execute_maps_requests_to_responses() {
        let gateway = MemoryGateway::new();
        let created = execute(
            &gateway,
            GatewayRequest::Insert(RepairFields::new("HP", "Juan", "lenta")),
        )
        .await
        .expect("insert");
        let GatewayResponse::Created(record) = created else {
            panic!("expected created response, got {created:?}");
        };

        let listed = execute(&gateway, GatewayRequest::List).await.expect("list");
        assert_eq!(listed, GatewayResponse::Records(vec![record.clone()]));

        let missing = execute(
            &gateway,
            GatewayRequest::Update {
                id: RepairId(record.id.0 + 1),
                patch: RepairPatch::estado(Estado::Finalizada),
            },
        )
        .await;
        assert!(matches!(missing, Err(GatewayError::NotFound(_))));
    }
}
