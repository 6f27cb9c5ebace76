mod common;

use common::{connect, test_config, unique_db_name, TestApp};
use mongodb::bson::doc;
use newspaper_service::services::fixture_records;

#[tokio::test]
async fn empty_collection_is_seeded_on_startup() {
    let mut config = test_config(&unique_db_name());
    config.seed.enabled = true;

    let app = TestApp::spawn_with(config).await;

    let expected = fixture_records().unwrap().len() as u64;
    assert_eq!(app.db.count(None, None).await.unwrap(), expected);

    let usa_today = app
        .db
        .get(Some(doc! { "Newspaper": "USA Today" }), None)
        .await
        .unwrap();
    assert_eq!(usa_today.len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn populated_collection_is_not_reseeded() {
    let db_name = unique_db_name();

    for existing in [1usize, 3] {
        let store = connect(&db_name).await;
        store.delete(None, None).await.unwrap();
        let records = (0..existing)
            .map(|i| doc! { "Newspaper": format!("Local Paper {}", i) })
            .collect();
        store.create(records, None).await.unwrap();

        let mut config = test_config(&db_name);
        config.seed.enabled = true;
        let app = TestApp::spawn_with(config).await;

        assert_eq!(app.db.count(None, None).await.unwrap(), existing as u64);
    }

    connect(&db_name).await.clean().await.unwrap();
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let app = TestApp::spawn().await;

    assert_eq!(app.db.count(None, None).await.unwrap(), 0);

    app.cleanup().await;
}
