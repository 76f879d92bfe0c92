//! Pixline artifact storage
//!
//! This crate owns the on-disk lifecycle of pipeline artifacts: staging in a
//! private directory, atomic publish into the servable directory, and
//! cleanup. The [`ArtifactStore`] trait is the seam the orchestrator and
//! tests program against; [`LocalArtifactStore`] is the filesystem
//! implementation.
//!
//! # Path scheme
//!
//! Published artifacts live at `<public_dir>/<id>.<ext>` and are addressable
//! at `<base_url>/<id>.<ext>`. The id-to-path mapping belongs to this crate
//! alone; changing it requires migrating persisted `storage_path` values.

pub mod local;
pub mod traits;

pub use local::LocalArtifactStore;
pub use traits::{ArtifactStore, StorageError, StorageResult};
