use serde::Deserialize;
use shared::{
    domain::{RepairFields, RepairId, RepairRecord},
    error::ApiError,
    protocol::RepairPatch,
};
use storage::Storage;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Query string accepted by the table endpoint, in PostgREST's dialect.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub select: Option<String>,
    pub order: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Parses `order=created_at.asc|desc`. A missing order means ascending creation time.
pub fn parse_order(order: Option<&str>) -> Result<SortOrder, ApiError> {
    let Some(order) = order.map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(SortOrder::Ascending);
    };
    let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
    if column != "created_at" {
        return Err(ApiError::validation(format!(
            "unsupported order column '{column}'"
        )));
    }
    match direction {
        "asc" => Ok(SortOrder::Ascending),
        "desc" => Ok(SortOrder::Descending),
        other => Err(ApiError::validation(format!(
            "unsupported order direction '{other}'"
        ))),
    }
}

/// Parses the row filter `id=eq.{id}`.
pub fn parse_id_filter(filter: Option<&str>) -> Result<RepairId, ApiError> {
    let filter = filter.ok_or_else(|| ApiError::validation("missing id filter"))?;
    let raw = filter
        .strip_prefix("eq.")
        .ok_or_else(|| ApiError::validation(format!("unsupported id filter '{filter}'")))?;
    raw.trim()
        .parse::<i64>()
        .map(RepairId)
        .map_err(|_| ApiError::validation(format!("invalid id '{raw}'")))
}

pub async fn list_repairs(ctx: &ApiContext, order: SortOrder) -> Result<Vec<RepairRecord>, ApiError> {
    ctx.storage
        .list_repairs_ordered(order == SortOrder::Ascending)
        .await
        .map_err(internal)
}

pub async fn insert_repairs(
    ctx: &ApiContext,
    rows: Vec<RepairFields>,
) -> Result<Vec<RepairRecord>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::validation("insert body has no rows"));
    }
    for fields in &rows {
        ensure_required(&fields.missing_required())?;
    }

    let created = ctx.storage.insert_repairs(&rows).await.map_err(internal)?;
    for record in &created {
        info!(id = record.id.0, estado = %record.estado, "reparacion created");
    }
    Ok(created)
}

pub async fn update_repair(
    ctx: &ApiContext,
    id: RepairId,
    patch: RepairPatch,
) -> Result<(), ApiError> {
    ensure_required(&patch.blanked_required())?;
    if patch.is_empty() {
        return Err(ApiError::validation("update body sets no columns"));
    }
    let found = ctx
        .storage
        .update_repair(id, &patch)
        .await
        .map_err(internal)?;
    if !found {
        return Err(ApiError::not_found(format!("reparacion {id} not found")));
    }
    info!(id = id.0, "reparacion updated");
    Ok(())
}

/// Deleting an absent id succeeds, matching a filtered delete that matches no rows.
pub async fn delete_repair(ctx: &ApiContext, id: RepairId) -> Result<(), ApiError> {
    let found = ctx.storage.delete_repair(id).await.map_err(internal)?;
    if found {
        info!(id = id.0, "reparacion deleted");
    } else {
        warn!(id = id.0, "delete matched no reparacion");
    }
    Ok(())
}

fn ensure_required(missing: &[&str]) -> Result<(), ApiError> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(ApiError::validation(format!(
        "required fields must not be blank: {}",
        missing.join(", ")
    )))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{domain::Estado, error::ErrorCode};

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    #[test]
    fn parses_postgrest_order_and_filters() {
        assert_eq!(parse_order(None).expect("default"), SortOrder::Ascending);
        assert_eq!(
            parse_order(Some("created_at.desc")).expect("desc"),
            SortOrder::Descending
        );
        assert!(parse_order(Some("modelo.asc")).is_err());
        assert_eq!(parse_id_filter(Some("eq.42")).expect("id"), RepairId(42));
        assert!(parse_id_filter(Some("gt.3")).is_err());
        assert!(parse_id_filter(Some("eq.abc")).is_err());
        assert!(parse_id_filter(None).is_err());
    }

    #[tokio::test]
    async fn insert_rejects_blank_required_fields() {
        let ctx = setup().await;
        let err = insert_repairs(&ctx, vec![RepairFields::new("HP", "", "lenta")])
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(err.message.contains("duenio"));
        assert!(list_repairs(&ctx, SortOrder::Ascending)
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn failed_batch_insert_keeps_no_rows() {
        let ctx = setup().await;
        sqlx::query(
            "CREATE TRIGGER reject_roto BEFORE INSERT ON reparaciones
             WHEN NEW.modelo = 'Roto'
             BEGIN SELECT RAISE(ABORT, 'modelo rejected'); END",
        )
        .execute(ctx.storage.pool())
        .await
        .expect("create trigger");

        let err = insert_repairs(
            &ctx,
            vec![
                RepairFields::new("HP", "Juan", "lenta"),
                RepairFields::new("Dell", "María", "no arranca"),
                RepairFields::new("Roto", "Eva", "no enciende"),
            ],
        )
        .await
        .expect_err("third row is rejected");
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(list_repairs(&ctx, SortOrder::Ascending)
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let ctx = setup().await;
        let err = update_repair(&ctx, RepairId(9), RepairPatch::estado(Estado::Progreso))
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_cannot_blank_required_fields() {
        let ctx = setup().await;
        let created = insert_repairs(&ctx, vec![RepairFields::new("HP", "Juan", "lenta")])
            .await
            .expect("insert");
        let patch = RepairPatch {
            sintoma: Some("   ".into()),
            ..RepairPatch::default()
        };
        let err = update_repair(&ctx, created[0].id, patch)
            .await
            .expect_err("should fail");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let ctx = setup().await;
        let created = insert_repairs(&ctx, vec![RepairFields::new("HP", "Juan", "lenta")])
            .await
            .expect("insert");
        delete_repair(&ctx, created[0].id).await.expect("first delete");
        delete_repair(&ctx, created[0].id)
            .await
            .expect("second delete");
    }
}
