pub mod database;
pub mod error;
pub mod metrics;
pub mod seed;

pub use database::{InsertOutcome, MongoConnection, UpdateOutcome, DEFAULT_URI};
pub use error::StoreError;
pub use metrics::{get_metrics, init_metrics, record_store_operation};
pub use seed::{fixture_records, seed_if_empty};
