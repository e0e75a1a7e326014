//! Runtime bridge between UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use board_core::{execute, GatewayError, MemoryGateway, OpId, RepairGateway, RestGateway};
use crossbeam_channel::{Receiver, Sender};
use shared::sample::sample_repairs;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

const DEMO_LATENCY: Duration = Duration::from_millis(350);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewaySource {
    Rest {
        base_url: String,
        api_key: Option<String>,
    },
    Demo,
}

impl GatewaySource {
    pub fn describe(&self) -> String {
        match self {
            GatewaySource::Rest { base_url, .. } => base_url.clone(),
            GatewaySource::Demo => "demo (memoria)".to_string(),
        }
    }
}

async fn build_gateway(source: &GatewaySource) -> Result<Arc<dyn RepairGateway>, GatewayError> {
    match source {
        GatewaySource::Rest { base_url, api_key } => {
            let mut gateway = RestGateway::new(base_url)?;
            if let Some(key) = api_key {
                gateway = gateway.with_api_key(key.clone());
            }
            Ok(Arc::new(gateway))
        }
        GatewaySource::Demo => Ok(Arc::new(
            MemoryGateway::seeded(sample_repairs())
                .await
                .with_latency(DEMO_LATENCY),
        )),
    }
}

/// Hands a completion to the UI, waiting for room when its queue is full. The board keeps
/// the operation pending until this arrives, so it must not be dropped.
async fn deliver_completion(ui_tx: Sender<UiEvent>, event: UiEvent, op_id: OpId) {
    let delivered = tokio::task::spawn_blocking(move || ui_tx.send(event)).await;
    match delivered {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::debug!(op = op_id.0, "ui closed before completion arrived"),
        Err(err) => tracing::error!(op = op_id.0, %err, "completion delivery task failed"),
    }
}

/// Spawns the backend worker. Each queued request runs as its own task, so replies may
/// arrive in any order.
pub fn launch(
    source: GatewaySource,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                drop(cmd_rx);
                let _ = ui_tx.send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let gateway = match build_gateway(&source).await {
                Ok(gateway) => gateway,
                Err(err) => {
                    tracing::error!(%err, "failed to configure gateway");
                    drop(cmd_rx);
                    let _ = ui_tx.send(UiEvent::BackendFailed(format!(
                        "backend worker startup failure: {err}"
                    )));
                    return;
                }
            };
            tracing::info!(gateway = %source.describe(), "backend worker ready");
            let _ = ui_tx.send(UiEvent::BackendReady(source.describe()));

            while let Ok(cmd) = cmd_rx.recv() {
                let dispatch = match cmd {
                    BackendCommand::Execute(dispatch) => dispatch,
                    BackendCommand::Shutdown => break,
                };
                let gateway = Arc::clone(&gateway);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let op_id = dispatch.op_id;
                    let outcome = execute(gateway.as_ref(), dispatch.request).await;
                    deliver_completion(ui_tx, UiEvent::Completed { op_id, outcome }, op_id).await;
                });
            }
            tracing::info!("backend worker stopped");
        });
        // Completions parked on a full UI queue must not hold the thread once the UI is gone.
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
    })
}
