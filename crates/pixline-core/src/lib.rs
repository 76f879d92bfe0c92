//! Pixline core types
//!
//! This crate holds the pieces of the ingestion pipeline that do no I/O:
//! artifact identifiers, the configuration surface, and the data model
//! shared by the storage and processing crates.

pub mod config;
pub mod id;
pub mod models;

pub use config::{ConfigError, PipelineConfig};
pub use id::ArtifactId;
pub use models::{
    ArtifactDescriptor, ArtifactKind, IngestReceipt, OptionsError, OutputFormat,
    ProcessingOptions, UploadCandidate,
};
