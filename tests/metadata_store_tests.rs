use imgshelf::db::MetadataStore;
use imgshelf::error::ImageError;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

async fn temp_store(tag: &str) -> (MetadataStore, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "imgshelf-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    let database_url = format!("sqlite:{}", temp_path.display());
    let store = MetadataStore::connect(&database_url)
        .await
        .expect("connect metadata store");
    (store, temp_path)
}

#[tokio::test]
async fn insert_select_update_delete() {
    let (db, path) = temp_store("meta-crud").await;

    let id = db
        .insert("https://b.example/uploads/1_a.png", "first")
        .await
        .expect("insert");
    let row = db
        .select_by_id(id)
        .await
        .expect("select")
        .expect("row present");
    assert_eq!(row.url, "https://b.example/uploads/1_a.png");
    assert_eq!(row.description, "first");

    db.update_by_id(id, "https://b.example/uploads/2_b.png", "second")
        .await
        .expect("update");
    let row = db.select_by_id(id).await.expect("select").expect("row");
    assert_eq!(row.url, "https://b.example/uploads/2_b.png");
    assert_eq!(row.description, "second");

    db.delete_by_id(id).await.expect("delete");
    assert!(db.select_by_id(id).await.expect("select").is_none());

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn missing_rows_report_not_found() {
    let (db, path) = temp_store("meta-missing").await;

    assert!(db.select_by_id(99).await.expect("select").is_none());
    assert!(matches!(
        db.update_by_id(99, "u", "d").await,
        Err(ImageError::NotFound(99))
    ));
    assert!(matches!(
        db.delete_by_id(99).await,
        Err(ImageError::NotFound(99))
    ));

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn pages_are_ordered_by_id() {
    let (db, path) = temp_store("meta-page").await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            db.insert(&format!("https://b.example/uploads/{i}.png"), "")
                .await
                .expect("insert"),
        );
    }

    assert_eq!(db.count_all().await.expect("count"), 5);

    let first: Vec<i64> = db
        .select_page(2, 0)
        .await
        .expect("page")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(first, ids[0..2]);

    let last: Vec<i64> = db
        .select_page(2, 4)
        .await
        .expect("page")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(last, ids[4..5]);

    assert!(db.select_page(2, 10).await.expect("page").is_empty());

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn schema_survives_reconnect() {
    let (db, path) = temp_store("meta-reopen").await;
    let id = db.insert("https://b.example/uploads/x.png", "kept").await.expect("insert");
    db.close().await;

    let database_url = format!("sqlite:{}", path.display());
    let reopened = MetadataStore::connect(&database_url)
        .await
        .expect("reconnect");
    let row = reopened
        .select_by_id(id)
        .await
        .expect("select")
        .expect("row survives");
    assert_eq!(row.description, "kept");

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn conditional_repoint_requires_the_expected_url() {
    let (db, path) = temp_store("meta-cas").await;

    let id = db
        .insert("https://b.example/uploads/1_a.png", "first")
        .await
        .expect("insert");

    let stale = db
        .update_if_url(
            id,
            "https://b.example/uploads/0_old.png",
            "https://b.example/uploads/2_b.png",
            "second",
        )
        .await
        .expect("stale repoint");
    assert!(!stale);
    let row = db.select_by_id(id).await.expect("select").expect("row");
    assert_eq!(row.url, "https://b.example/uploads/1_a.png");
    assert_eq!(row.description, "first");

    let swapped = db
        .update_if_url(
            id,
            "https://b.example/uploads/1_a.png",
            "https://b.example/uploads/2_b.png",
            "second",
        )
        .await
        .expect("matching repoint");
    assert!(swapped);
    let row = db.select_by_id(id).await.expect("select").expect("row");
    assert_eq!(row.url, "https://b.example/uploads/2_b.png");
    assert_eq!(row.description, "second");

    assert!(
        !db.update_if_url(99, "u", "v", "d")
            .await
            .expect("missing row")
    );

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn description_update_keeps_the_url() {
    let (db, path) = temp_store("meta-desc").await;

    let id = db
        .insert("https://b.example/uploads/1_a.png", "first")
        .await
        .expect("insert");
    db.update_description(id, "renamed")
        .await
        .expect("update description");

    let row = db.select_by_id(id).await.expect("select").expect("row");
    assert_eq!(row.url, "https://b.example/uploads/1_a.png");
    assert_eq!(row.description, "renamed");

    assert!(matches!(
        db.update_description(99, "d").await,
        Err(ImageError::NotFound(99))
    ));

    let _ = tokio::fs::remove_file(&path).await;
}
