#![allow(dead_code)]

use newspaper_service::config::{MongoConfig, NewspaperConfig, SeedConfig};
use newspaper_service::services::MongoConnection;
use newspaper_service::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const COLLECTION: &str = "newspaper";

pub fn mongodb_uri() -> String {
    std::env::var("TEST_MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn unique_db_name() -> String {
    format!("newspaper_test_{}", uuid::Uuid::new_v4().simple())
}

pub fn test_config(db_name: &str) -> NewspaperConfig {
    NewspaperConfig {
        common: CoreConfig { port: 0 }, // Random port
        mongodb: MongoConfig {
            uri: mongodb_uri(),
            database: db_name.to_string(),
            collection: COLLECTION.to_string(),
        },
        seed: SeedConfig { enabled: false },
        public_host: "localhost".to_string(),
    }
}

/// Connected store handle on `db_name`, independent of any running app.
pub async fn connect(db_name: &str) -> MongoConnection {
    let mut connection = MongoConnection::open(db_name, mongodb_uri())
        .await
        .expect("Failed to connect to MongoDB");
    connection.set_collection(COLLECTION);
    connection
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Arc<MongoConnection>,
    pub db_name: String,
}

impl TestApp {
    /// Spawn with an empty database and seeding disabled.
    pub async fn spawn() -> Self {
        let db_name = unique_db_name();
        Self::spawn_with(test_config(&db_name)).await
    }

    pub async fn spawn_with(config: NewspaperConfig) -> Self {
        let db_name = config.mongodb.database.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Insert via the API and return the created records.
    pub async fn post_newspapers(&self, body: serde_json::Value) -> Vec<serde_json::Value> {
        let response = reqwest::Client::new()
            .post(self.url("/newspaper"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200);
        response.json().await.expect("Failed to parse response")
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        self.db.clean().await.expect("Failed to drop test database");
    }
}
