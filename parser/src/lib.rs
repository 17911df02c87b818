pub mod analyzer;
mod error;
pub mod extractor;
mod ingest;
pub mod types;

pub use error::*;
pub use ingest::{IngestStats, ingest_file, ingest_reader};
