//! CRD (CustomResourceDefinition) decoding and OpenAPI schema extraction

pub mod error;
pub mod parser;
pub mod schema;
pub mod types;

pub use error::CrdError;
pub use parser::CrdDecoder;
pub use schema::{schema_filename, SchemaExtractor, SchemaSet};
pub use types::{CustomResourceDefinition, LegacyCrd, StableCrd};
