//! `MongoConnection` against a live MongoDB (`TEST_MONGODB_URI`).

mod common;

use common::{connect, mongodb_uri, unique_db_name, COLLECTION};
use mongodb::bson::{doc, Bson};
use newspaper_service::services::{MongoConnection, StoreError, UpdateOutcome};

#[tokio::test]
async fn connect_is_idempotent() {
    let db_name = unique_db_name();
    let mut connection = MongoConnection::new(&db_name, mongodb_uri());

    connection.connect().await.unwrap();
    connection.connect().await.unwrap();

    assert!(connection.is_connected());
    assert_eq!(connection.db_name(), db_name);
}

#[tokio::test]
async fn unreachable_server_is_a_client_error() {
    let mut connection = MongoConnection::new(
        "circulation",
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200",
    );

    let err = connection.connect().await.unwrap_err();

    assert!(matches!(err, StoreError::Client(_)));
    assert!(!connection.is_connected());
}

#[tokio::test]
async fn create_assigns_ids_and_keeps_existing_ones() {
    let connection = connect(&unique_db_name()).await;

    let outcome = connection
        .create(
            vec![
                doc! { "Newspaper": "Newsday" },
                doc! { "_id": "custom-id", "Newspaper": "New York Post" },
            ],
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.inserted_count, 2);
    assert!(matches!(outcome.records[0].get("_id"), Some(Bson::ObjectId(_))));
    assert_eq!(outcome.records[1].get_str("_id").unwrap(), "custom-id");

    connection.clean().await.unwrap();
}

#[tokio::test]
async fn get_filters_by_exact_match() {
    let connection = connect(&unique_db_name()).await;
    connection
        .create(
            vec![
                doc! { "Newspaper": "A", "region": "east" },
                doc! { "Newspaper": "B", "region": "west" },
                doc! { "Newspaper": "C", "region": "east" },
            ],
            None,
        )
        .await
        .unwrap();

    assert_eq!(connection.get(None, None).await.unwrap().len(), 3);
    assert_eq!(
        connection
            .get(Some(doc! { "region": "east" }), None)
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(connection
        .get(Some(doc! { "region": "north" }), None)
        .await
        .unwrap()
        .is_empty());

    connection.clean().await.unwrap();
}

#[tokio::test]
async fn update_applies_to_every_match() {
    let connection = connect(&unique_db_name()).await;
    connection
        .create(
            vec![
                doc! { "Newspaper": "A", "region": "east" },
                doc! { "Newspaper": "B", "region": "east" },
                doc! { "Newspaper": "C", "region": "west" },
            ],
            None,
        )
        .await
        .unwrap();

    let outcome = connection
        .update(
            doc! { "audited": true },
            Some(doc! { "region": "east" }),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome {
            matched_count: 2,
            modified_count: 2
        }
    );
    assert_eq!(
        connection
            .count(Some(doc! { "audited": true }), None)
            .await
            .unwrap(),
        2
    );

    let empty_patch = connection.update(doc! {}, None, None).await.unwrap();
    assert_eq!(empty_patch, UpdateOutcome::default());

    connection.clean().await.unwrap();
}

#[tokio::test]
async fn delete_removes_every_match() {
    let connection = connect(&unique_db_name()).await;
    connection
        .create(
            vec![
                doc! { "region": "east" },
                doc! { "region": "east" },
                doc! { "region": "west" },
            ],
            None,
        )
        .await
        .unwrap();

    let deleted = connection
        .delete(Some(doc! { "region": "east" }), None)
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let deleted_again = connection
        .delete(Some(doc! { "region": "east" }), None)
        .await
        .unwrap();
    assert_eq!(deleted_again, 0);
    assert_eq!(connection.count(None, None).await.unwrap(), 1);

    connection.clean().await.unwrap();
}

#[tokio::test]
async fn collection_override_targets_other_collection() {
    let connection = connect(&unique_db_name()).await;

    connection
        .create(vec![doc! { "kind": "archive" }], Some("archive"))
        .await
        .unwrap();

    assert_eq!(connection.count(None, None).await.unwrap(), 0);
    assert_eq!(connection.count(None, Some("archive")).await.unwrap(), 1);

    let mut names = connection.list_collections().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["archive".to_string()]);

    connection.clean().await.unwrap();
}

#[tokio::test]
async fn missing_collection_is_an_error() {
    let connection = MongoConnection::open(unique_db_name(), mongodb_uri())
        .await
        .unwrap();

    assert!(matches!(
        connection.get(None, None).await,
        Err(StoreError::NoCollection)
    ));
}

#[tokio::test]
async fn set_db_name_switches_database() {
    let first = unique_db_name();
    let second = unique_db_name();
    let mut connection = connect(&first).await;
    connection
        .create(vec![doc! { "db": "first" }], None)
        .await
        .unwrap();

    connection.set_db_name(&second).await.unwrap();

    assert_eq!(connection.db_name(), second);
    assert_eq!(connection.collection(), Some(COLLECTION));
    assert_eq!(connection.count(None, None).await.unwrap(), 0);

    connection.set_db_name(&first).await.unwrap();
    assert_eq!(connection.count(None, None).await.unwrap(), 1);
    connection.clean().await.unwrap();
}

#[tokio::test]
async fn setting_empty_db_name_poisons_operations() {
    let mut connection = connect(&unique_db_name()).await;

    let err = connection.set_db_name("").await.unwrap_err();

    assert!(matches!(err, StoreError::Connection(_)));
    assert!(matches!(
        connection.get(None, None).await,
        Err(StoreError::PoisonedConnection)
    ));
}

#[tokio::test]
async fn closed_connection_is_poisoned_not_reconnected() {
    let mut connection = connect(&unique_db_name()).await;

    connection.close().await;

    assert!(!connection.is_connected());
    assert!(matches!(
        connection.get(None, None).await,
        Err(StoreError::PoisonedConnection)
    ));
    assert!(matches!(
        connection.create(vec![doc! { "a": 1 }], None).await,
        Err(StoreError::PoisonedConnection)
    ));
}
