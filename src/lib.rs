pub mod config;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod record;
pub mod schema;
pub mod write;

pub use extract::{extract, parse, Rejection};
pub use record::{Credits, Record, RecordError};
