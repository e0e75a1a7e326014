//! PostgREST-dialect client for the `reparaciones` table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use shared::{
    domain::{RepairFields, RepairId, RepairRecord},
    protocol::{repairs_route, RepairPatch, RepairRow},
};
use tracing::debug;
use url::Url;

use crate::{error::GatewayError, gateway::RepairGateway};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RestGateway {
    http: Client,
    table_url: Url,
    api_key: Option<String>,
}

/// Error bodies seen in the wild: `{code, message}` from our service, `{message, details, hint}` from PostgREST.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl RestGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            table_url: table_url(base_url)?,
            api_key: None,
        })
    }

    /// Sends `apikey` and a bearer token on every request, as hosted PostgREST projects expect.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let builder = self.http.request(method, self.table_url.clone());
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }
}

fn table_url(base_url: &str) -> Result<Url, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("url cannot be a base".to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(repairs_route().trim_start_matches('/'))
        .map_err(|e| invalid(e.to_string()))
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or(text);
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

fn id_filter(id: RepairId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id.0))]
}

#[async_trait]
impl RepairGateway for RestGateway {
    async fn list(&self) -> Result<Vec<RepairRecord>, GatewayError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.asc")])
            .send()
            .await?;
        let rows: Vec<RepairRow> = ensure_success(response).await?.json().await?;
        debug!(rows = rows.len(), "listed reparaciones");
        Ok(rows.into_iter().map(RepairRecord::from).collect())
    }

    async fn insert(&self, fields: &RepairFields) -> Result<RepairRecord, GatewayError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, "application/json")
            .json(fields)
            .send()
            .await?;
        let rows: Vec<RepairRow> = ensure_success(response).await?.json().await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".to_string()))?;
        debug!(id = row.id.0, "inserted reparacion");
        Ok(row.into())
    }

    async fn update(&self, id: RepairId, patch: &RepairPatch) -> Result<(), GatewayError> {
        let response = self
            .request(Method::PATCH)
            .query(&id_filter(id))
            .json(patch)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, id: RepairId) -> Result<(), GatewayError> {
        let response = self
            .request(Method::DELETE)
            .query(&id_filter(id))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
