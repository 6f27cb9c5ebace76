//! HTTP handlers for newspaper-service.

pub mod health;
pub mod newspaper;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use newspaper::{
    create_newspapers, delete_newspaper, get_newspaper, list_newspapers, update_newspaper,
};
