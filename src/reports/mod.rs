//! Result output encoding

mod ndjson;

pub use ndjson::write_ndjson;
