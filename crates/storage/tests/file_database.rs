use shared::{domain::RepairFields, sample::sample_repairs};
use storage::Storage;

#[tokio::test]
async fn creates_nested_database_file_and_persists_rows() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("taller.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    for fields in sample_repairs() {
        storage.insert_repair(&fields).await.expect("seed");
    }
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let records = reopened.list_repairs().await.expect("list");
    let modelos: Vec<_> = records.iter().map(|r| r.modelo.as_str()).collect();
    assert_eq!(
        modelos,
        vec!["HP Pavilion", "Dell Inspiron 15", "Lenovo ThinkPad T480"]
    );

    let extra = reopened
        .insert_repair(&RepairFields::new("Asus", "Eva", "Teclado"))
        .await
        .expect("insert");
    assert!(records.iter().all(|r| r.id < extra.id));
}
