//! Schema-less circulation records.
//!
//! A record is whatever document the client (or the fixture file) handed us.
//! Only `_id` has meaning to the service; every other field is passed through.

use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record. Field order is preserved.
pub type Record = Document;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object or an array of JSON objects")]
    NotAnObject,

    #[error("Record cannot be stored: {0}")]
    Encoding(#[from] bson::ser::Error),
}

/// Render a record as JSON, with object ids as plain hex strings.
pub fn record_to_json(record: &Record) -> Value {
    Value::Object(document_to_map(record))
}

fn document_to_map(doc: &Document) -> Map<String, Value> {
    doc.iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect()
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => Value::Object(document_to_map(doc)),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// String form of a record identifier, as used in URLs.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn record_from_json(object: &Map<String, Value>) -> Result<Record, RecordError> {
    Ok(bson::to_document(object)?)
}

/// Parse a request body that must be a single JSON object.
///
/// An empty body reads as an empty object.
pub fn object_from_body(body: &[u8]) -> Result<Map<String, Value>, RecordError> {
    if is_blank(body) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body)? {
        Value::Object(object) => Ok(object),
        _ => Err(RecordError::NotAnObject),
    }
}

/// Parse a request body holding one record or an array of records.
///
/// An empty body and `{}` both yield no records; `[{}]` yields one empty record.
pub fn records_from_body(body: &[u8]) -> Result<Vec<Record>, RecordError> {
    if is_blank(body) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice(body)? {
        Value::Object(object) if object.is_empty() => Ok(Vec::new()),
        Value::Object(object) => Ok(vec![record_from_json(&object)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(object) => record_from_json(object),
                _ => Err(RecordError::NotAnObject),
            })
            .collect(),
        _ => Err(RecordError::NotAnObject),
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(|b| b.is_ascii_whitespace())
}
