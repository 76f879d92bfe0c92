//! Pixline ingestion pipeline
//!
//! Sequences intake validation, staging, transformation, and atomic
//! publication for a single upload, and defines the rollback policy: any
//! step failing removes every artifact staged or published for that upload
//! before the error surfaces. Callers construct a [`PipelineContext`] with
//! their configuration and store, then drive [`Pipeline::ingest`] per
//! upload.

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod telemetry;

pub use context::PipelineContext;
pub use error::PipelineError;
pub use orchestrator::Pipeline;
