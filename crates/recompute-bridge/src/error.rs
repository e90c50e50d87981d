use std::path::PathBuf;
use std::time::Duration;

/// Transport-level failures between the interactive side and the worker.
///
/// A kernel failure is not one of these: it arrives as data in
/// `RecomputeResult::error`.
#[derive(Debug, thiserror::Error)]
pub enum RecomputeError {
    #[error("recompute worker disconnected")]
    Disconnected,

    #[error("no recompute result after {waited:?}")]
    Timeout { waited: Duration },

    #[error("kernel failed to initialize: {reason}")]
    InitFailed { reason: String },

    #[error("failed to spawn recompute thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors loading a `RecomputeConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}
