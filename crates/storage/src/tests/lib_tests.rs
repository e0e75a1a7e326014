use super::*;

fn acer() -> RepairFields {
    RepairFields::new("Acer Aspire", "Ana Ruiz", "No carga batería")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn inserted_repair_gets_id_timestamp_and_defaults() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let record = storage.insert_repair(&acer()).await.expect("insert");

    assert!(record.id.0 > 0);
    assert_eq!(record.modelo, "Acer Aspire");
    assert_eq!(record.observacion, "");
    assert_eq!(record.tratamiento, "");
    assert_eq!(record.estado, Estado::Recibida);

    let fetched = storage
        .get_repair(record.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn lists_repairs_oldest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.insert_repair(&acer()).await.expect("first");
    let second = storage
        .insert_repair(&RepairFields::new("Dell", "Luis", "Pantalla negra"))
        .await
        .expect("second");

    let ids: Vec<_> = storage
        .list_repairs()
        .await
        .expect("list")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let reversed: Vec<_> = storage
        .list_repairs_ordered(false)
        .await
        .expect("list desc")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(reversed, vec![second.id, first.id]);
}

#[tokio::test]
async fn update_touches_only_patched_columns() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let record = storage
        .insert_repair(&acer().with_observacion("cargador roto"))
        .await
        .expect("insert");

    let found = storage
        .update_repair(record.id, &RepairPatch::estado(Estado::Progreso))
        .await
        .expect("update");
    assert!(found);

    let updated = storage
        .get_repair(record.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(updated.estado, Estado::Progreso);
    assert_eq!(updated.observacion, "cargador roto");
    assert_eq!(updated.created_at, record.created_at);
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let missing = RepairId(404);
    assert!(!storage
        .update_repair(missing, &RepairPatch::estado(Estado::Finalizada))
        .await
        .expect("update"));
    assert!(!storage.delete_repair(missing).await.expect("delete"));
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.insert_repair(&acer()).await.expect("first");
    assert!(storage.delete_repair(first.id).await.expect("delete"));
    let second = storage.insert_repair(&acer()).await.expect("second");
    assert!(second.id > first.id);
    assert_eq!(storage.list_repairs().await.expect("list").len(), 1);
}

#[tokio::test]
async fn rejects_unknown_estado_at_schema_level() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let result = sqlx::query(
        "INSERT INTO reparaciones (modelo, duenio, sintoma, estado) VALUES ('a', 'b', 'c', 'archivada')",
    )
    .execute(storage.pool())
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn reads_rows_written_with_database_defaults() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    sqlx::query("INSERT INTO reparaciones (modelo, duenio, sintoma) VALUES ('HP', 'Juan', 'lenta')")
        .execute(storage.pool())
        .await
        .expect("raw insert");

    let records = storage.list_repairs().await.expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].estado, Estado::Recibida);
    assert_eq!(records[0].tratamiento, "");
}

#[tokio::test]
async fn clear_removes_every_row() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_repair(&acer()).await.expect("insert");
    storage.insert_repair(&acer()).await.expect("insert");
    assert_eq!(storage.clear_repairs().await.expect("clear"), 2);
    assert!(storage.list_repairs().await.expect("list").is_empty());
}

async fn reject_modelo(storage: &Storage, modelo: &str) {
    sqlx::query(&format!(
        "CREATE TRIGGER reject_modelo BEFORE INSERT ON reparaciones
         WHEN NEW.modelo = '{modelo}'
         BEGIN SELECT RAISE(ABORT, 'modelo rejected'); END"
    ))
    .execute(storage.pool())
    .await
    .expect("create trigger");
}

#[tokio::test]
async fn batch_insert_returns_rows_in_request_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let rows = [
        acer(),
        RepairFields::new("Dell", "Luis", "Pantalla negra").with_estado(Estado::Progreso),
    ];
    let created = storage.insert_repairs(&rows).await.expect("batch");

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].modelo, "Acer Aspire");
    assert_eq!(created[1].estado, Estado::Progreso);
    assert_eq!(storage.list_repairs().await.expect("list"), created);
}

#[tokio::test]
async fn batch_insert_is_all_or_nothing() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    reject_modelo(&storage, "Roto").await;

    let rows = [
        acer(),
        RepairFields::new("Dell", "Luis", "Pantalla negra"),
        RepairFields::new("Roto", "Eva", "No enciende"),
    ];
    assert!(storage.insert_repairs(&rows).await.is_err());
    assert!(storage.list_repairs().await.expect("list").is_empty());

    storage.insert_repair(&acer()).await.expect("pool still usable");
    assert_eq!(storage.list_repairs().await.expect("list").len(), 1);
}
