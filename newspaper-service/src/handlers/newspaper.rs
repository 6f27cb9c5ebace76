//! CRUD handlers for `/newspaper`.
//!
//! Each handler makes exactly one store call. Create and update report
//! "nothing happened" as a bare 400.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::{Map, Value};
use service_core::error::AppError;

use crate::models::{
    id_to_string, object_from_body, record_from_json, record_to_json, records_from_body, Record,
    ID_FIELD,
};
use crate::startup::AppState;

fn id_filter(id: &str) -> Result<Document, AppError> {
    let oid = ObjectId::parse_str(id).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Invalid newspaper id '{}': {}", id, e))
    })?;
    Ok(doc! { "_id": oid })
}

/// Self-link first, then the record's own fields.
fn with_self_link(base_uri: &str, record: &Record) -> Value {
    let id = record.get(ID_FIELD).map(id_to_string).unwrap_or_default();

    let mut decorated = Map::new();
    decorated.insert(
        "_uri".to_string(),
        Value::String(format!("{}/newspaper/{}", base_uri, id)),
    );
    if let Value::Object(fields) = record_to_json(record) {
        decorated.extend(fields);
    }
    Value::Object(decorated)
}

#[tracing::instrument(skip(state))]
pub async fn list_newspapers(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let records = state.db.get(None, None).await?;
    tracing::debug!(count = records.len(), "Listing newspapers");

    Ok(Json(
        records
            .iter()
            .map(|record| with_self_link(&state.base_uri, record))
            .collect(),
    ))
}

/// First record with the given id, or `null`.
#[tracing::instrument(skip(state))]
pub async fn get_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let filter = id_filter(&id)?;
    let records = state.db.get(Some(filter), None).await?;

    Ok(Json(records.first().map(record_to_json).unwrap_or(Value::Null)))
}

#[tracing::instrument(skip(state, body))]
pub async fn create_newspapers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let records = records_from_body(&body).map_err(|e| AppError::BadRequest(e.into()))?;

    let outcome = state.db.create(records, None).await?;

    if outcome.inserted_count == 0 {
        tracing::info!("Create request inserted nothing");
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    let inserted: Vec<Value> = outcome.records.iter().map(record_to_json).collect();
    Ok(Json(inserted).into_response())
}

/// Merge the body into the record; echoes the id plus the submitted fields.
#[tracing::instrument(skip(state, body))]
pub async fn update_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let filter = id_filter(&id)?;
    let fields = object_from_body(&body).map_err(|e| AppError::BadRequest(e.into()))?;
    let patch = record_from_json(&fields).map_err(|e| AppError::BadRequest(e.into()))?;

    let outcome = state.db.update(patch, Some(filter), None).await?;

    // Also 400 when the record exists but every value was already equal.
    if outcome.modified_count == 0 {
        tracing::info!(
            matched = outcome.matched_count,
            "Update request modified nothing"
        );
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    let mut echoed = Map::new();
    echoed.insert(ID_FIELD.to_string(), Value::String(id));
    echoed.extend(fields);
    Ok(Json(Value::Object(echoed)).into_response())
}

/// Succeeds whether or not a record was removed.
#[tracing::instrument(skip(state))]
pub async fn delete_newspaper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let filter = id_filter(&id)?;
    let deleted = state.db.delete(Some(filter), None).await?;
    tracing::debug!(deleted, "Deleted newspapers");

    Ok(StatusCode::OK)
}
