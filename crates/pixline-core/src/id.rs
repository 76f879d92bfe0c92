//! Artifact identifier allocation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a stored artifact.
///
/// Drawn from the v4 UUID space, so identifiers are unguessable and
/// collision-free under concurrent allocation without any coordination.
/// Storage filenames are always `<id>.<ext>`; the client-supplied filename
/// never reaches a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Allocate a fresh identifier.
    pub fn new() -> Self {
        ArtifactId(Uuid::new_v4())
    }

    /// Parse an identifier previously rendered with `Display`.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(ArtifactId(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
