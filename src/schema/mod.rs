pub mod canonical;
pub mod export;
pub mod fields;

pub use canonical::{canonicalize, AliasTableError, Canonicalizer};
pub use export::{json_schema, markdown_table, write_schema_files};
pub use fields::{canonical_headers, field, FieldKind, FieldSpec, FIELDS, SCHEMA_VERSION};
