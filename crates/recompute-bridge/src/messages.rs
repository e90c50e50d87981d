use serde::{Deserialize, Serialize};

use panel_types::{EdgePair, MeshBuffers, Operation};

use crate::version::{compute_version, Version};

/// Work sent to the recompute worker: an owned snapshot and its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeRequest {
    pub operations: Vec<Operation>,
    pub version: Version,
}

impl RecomputeRequest {
    pub fn new(operations: Vec<Operation>) -> Self {
        let version = compute_version(&operations);
        Self {
            operations,
            version,
        }
    }
}

/// Outcome of one request.
///
/// Success carries `mesh` and `edges`; failure carries `error`. An empty
/// snapshot produces neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeResult {
    pub version: Version,
    pub mesh: Option<MeshBuffers>,
    pub edges: Option<Vec<EdgePair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecomputeResult {
    pub fn empty(version: Version) -> Self {
        Self {
            version,
            mesh: None,
            edges: None,
            error: None,
        }
    }

    pub fn success(version: Version, mesh: MeshBuffers, edges: Vec<EdgePair>) -> Self {
        Self {
            version,
            mesh: Some(mesh),
            edges: Some(edges),
            error: None,
        }
    }

    pub fn failure(version: Version, error: impl Into<String>) -> Self {
        Self {
            version,
            mesh: None,
            edges: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True for the result of an empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.mesh.is_none() && self.error.is_none()
    }
}

/// Everything the worker emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// The kernel finished initializing. Sent once, before any buffered result.
    Ready,
    /// The kernel could not be initialized. Every request is answered with an error.
    InitFailed { reason: String },
    /// The answer to one request.
    Result(RecomputeResult),
}
