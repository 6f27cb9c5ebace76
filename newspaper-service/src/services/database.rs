//! MongoDB connection wrapper.
//!
//! `MongoConnection` holds one client for the life of the process plus the
//! database and default collection every data operation targets. Data
//! operations never reconnect on their own: once the client is gone they
//! fail with [`StoreError::PoisonedConnection`].

use crate::models::{Record, ID_FIELD};
use crate::services::error::StoreError;
use crate::services::metrics::record_store_operation;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client as MongoClient, Collection, Database,
};

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Result of [`MongoConnection::create`].
#[derive(Debug, Clone, Default)]
pub struct InsertOutcome {
    pub inserted_count: usize,
    /// The inserted records, each carrying its `_id`.
    pub records: Vec<Record>,
}

/// Result of [`MongoConnection::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug)]
pub struct MongoConnection {
    uri: String,
    db_name: String,
    collection: Option<String>,
    client: Option<MongoClient>,
    db: Option<Database>,
}

impl MongoConnection {
    /// Build an unconnected manager. Call [`connect`](Self::connect) before use.
    pub fn new(db_name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            collection: None,
            client: None,
            db: None,
        }
    }

    /// Build a manager and connect it.
    pub async fn open(
        db_name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let mut connection = Self::new(db_name, uri);
        connection.connect().await?;
        Ok(connection)
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Switch to another database, reusing the existing client.
    pub async fn set_db_name(
        &mut self,
        db_name: impl Into<String>,
    ) -> Result<&mut Self, StoreError> {
        self.db_name = db_name.into();
        self.connect().await
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Set the collection used when an operation gets no override.
    pub fn set_collection(&mut self, collection: impl Into<String>) -> &mut Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some() && self.db.is_some()
    }

    /// Establish the client if needed, then bind the configured database.
    ///
    /// Calling this again keeps the existing client and only rebinds.
    pub async fn connect(&mut self) -> Result<&mut Self, StoreError> {
        if self.db_name.is_empty() {
            self.db = None;
            return Err(StoreError::Connection(
                "Database name is mandatory and cannot be omitted".to_string(),
            ));
        }

        if self.client.is_none() {
            tracing::info!("Connecting to MongoDB");
            let client = MongoClient::with_uri_str(&self.uri).await.map_err(|e| {
                tracing::error!("Failed to create MongoDB client: {}", e);
                StoreError::Client(e)
            })?;

            // The driver connects lazily; ping so an unreachable server fails here.
            client
                .database("admin")
                .run_command(doc! { "ping": 1 }, None)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to reach MongoDB: {}", e);
                    StoreError::Client(e)
                })?;

            self.client = Some(client);
        }

        if let Some(client) = &self.client {
            self.db = Some(client.database(&self.db_name));
        }

        tracing::info!(database = %self.db_name, "Successfully connected to MongoDB database");
        Ok(self)
    }

    /// Shut the client down. Data operations fail afterwards.
    pub async fn close(&mut self) {
        self.db = None;
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            tracing::info!(database = %self.db_name, "MongoDB connection closed");
        }
    }

    fn validate_connection(&self) -> Result<Database, StoreError> {
        match (&self.client, &self.db) {
            (Some(client), Some(_)) if !self.db_name.is_empty() => {
                Ok(client.database(&self.db_name))
            }
            _ => Err(StoreError::PoisonedConnection),
        }
    }

    fn target(&self, collection: Option<&str>) -> Result<Collection<Document>, StoreError> {
        let db = self.validate_connection()?;
        let name = collection
            .or(self.collection.as_deref())
            .ok_or(StoreError::NoCollection)?;
        Ok(db.collection(name))
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        let client = self
            .client
            .as_ref()
            .ok_or(StoreError::PoisonedConnection)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::Driver(e)
            })?;
        Ok(())
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let db = self.validate_connection()?;
        observe(
            "list_collections",
            db.list_collection_names(None)
                .await
                .map_err(StoreError::from),
        )
    }

    /// Drop the bound database.
    pub async fn clean(&self) -> Result<(), StoreError> {
        let db = self.validate_connection()?;
        tracing::warn!(database = %self.db_name, "Dropping database");
        observe("clean", db.drop(None).await.map_err(StoreError::from))
    }

    /// Insert `records`, assigning an `_id` to any record without one.
    pub async fn create(
        &self,
        mut records: Vec<Record>,
        collection: Option<&str>,
    ) -> Result<InsertOutcome, StoreError> {
        let target = self.target(collection)?;

        if records.is_empty() {
            return Ok(InsertOutcome::default());
        }

        for record in records.iter_mut() {
            if !record.contains_key(ID_FIELD) {
                record.insert(ID_FIELD, ObjectId::new());
            }
        }

        let result = observe(
            "create",
            target
                .insert_many(&records, None)
                .await
                .map_err(StoreError::from),
        )?;

        let inserted_count = result.inserted_ids.len();
        tracing::info!(
            "Inserted {} documents to {} - {}",
            inserted_count,
            self.db_name,
            target.name()
        );

        Ok(InsertOutcome {
            inserted_count,
            records,
        })
    }

    /// All records matching `filter`; no filter means every record.
    pub async fn get(
        &self,
        filter: Option<Document>,
        collection: Option<&str>,
    ) -> Result<Vec<Record>, StoreError> {
        let target = self.target(collection)?;

        let result = match target.find(filter.unwrap_or_default(), None).await {
            Ok(cursor) => cursor.try_collect::<Vec<Record>>().await,
            Err(e) => Err(e),
        };

        observe("get", result.map_err(StoreError::from))
    }

    /// `$set` the fields of `patch` on every record matching `filter`.
    pub async fn update(
        &self,
        patch: Document,
        filter: Option<Document>,
        collection: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        let target = self.target(collection)?;

        // An empty $set is rejected by the server; nothing to apply anyway.
        if patch.is_empty() {
            return Ok(UpdateOutcome::default());
        }

        let result = observe(
            "update",
            target
                .update_many(filter.unwrap_or_default(), doc! { "$set": patch }, None)
                .await
                .map_err(StoreError::from),
        )?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    /// Remove every record matching `filter`. Returns the deleted count.
    pub async fn delete(
        &self,
        filter: Option<Document>,
        collection: Option<&str>,
    ) -> Result<u64, StoreError> {
        let target = self.target(collection)?;

        let result = observe(
            "delete",
            target
                .delete_many(filter.unwrap_or_default(), None)
                .await
                .map_err(StoreError::from),
        )?;

        Ok(result.deleted_count)
    }

    pub async fn count(
        &self,
        filter: Option<Document>,
        collection: Option<&str>,
    ) -> Result<u64, StoreError> {
        let target = self.target(collection)?;
        observe(
            "count",
            target
                .count_documents(filter.unwrap_or_default(), None)
                .await
                .map_err(StoreError::from),
        )
    }
}

fn observe<T>(operation: &str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    match &result {
        Ok(_) => record_store_operation(operation, "ok"),
        Err(e) => {
            tracing::error!(operation = %operation, error = %e, "MongoDB operation failed");
            record_store_operation(operation, "error");
        }
    }
    result
}
