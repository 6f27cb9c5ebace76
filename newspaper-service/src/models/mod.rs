pub mod record;

pub use record::{
    id_to_string, object_from_body, record_from_json, record_to_json, records_from_body, Record,
    RecordError, ID_FIELD,
};
