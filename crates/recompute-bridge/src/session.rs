//! Interactive-side glue: history edits in, latest display buffers out.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use op_store::{OperationStore, StoreError};
use panel_types::{Edge, MeshBuffers, OpId, Operation, OperationKind, OperationPatch, PanelSize};
use shape_ops::{edges_from_indices, resolve_edges};

use crate::config::RecomputeConfig;
use crate::debounce::Debouncer;
use crate::error::RecomputeError;
use crate::messages::{RecomputeRequest, RecomputeResult};
use crate::protocol::RecomputeClient;
use crate::version::{compute_version, Version};

/// What the renderer shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub mesh: Option<MeshBuffers>,
    pub edges: Option<Vec<Edge>>,
    /// Error from the most recent result, if it failed.
    pub last_error: Option<String>,
    /// Version of the last applied result, failed or not.
    pub version: Option<Version>,
}

/// Counters for results seen by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub applied: usize,
    pub stale_dropped: usize,
}

/// One panel being edited.
///
/// Every edit that changes the active snapshot schedules a debounced
/// recompute. Only the result for the most recently scheduled version is
/// applied; older ones are dropped on arrival.
pub struct PanelSession {
    store: OperationStore,
    debouncer: Debouncer<Vec<Operation>>,
    results: Receiver<RecomputeResult>,
    latest: Option<Version>,
    display: DisplayState,
    stats: SessionStats,
    default_panel: PanelSize,
}

impl PanelSession {
    pub fn new(client: RecomputeClient, config: &RecomputeConfig) -> Result<Self, RecomputeError> {
        let (reply, results) = mpsc::channel();
        let debouncer = Debouncer::spawn(config.debounce_interval(), move |ops: Vec<Operation>| {
            client.submit(RecomputeRequest::new(ops), reply.clone());
        })?;

        Ok(Self {
            store: OperationStore::new(),
            debouncer,
            results,
            latest: None,
            display: DisplayState::default(),
            stats: SessionStats::default(),
            default_panel: config.default_panel,
        })
    }

    pub fn store(&self) -> &OperationStore {
        &self.store
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Version of the last scheduled recompute.
    pub fn latest_version(&self) -> Option<&Version> {
        self.latest.as_ref()
    }

    /// Seed an empty history with the configured default panel.
    pub fn initialize(&mut self) -> Option<OpId> {
        let id = self.store.ensure_initialized(self.default_panel);
        self.schedule();
        id
    }

    pub fn add_op(&mut self, kind: OperationKind) -> OpId {
        let id = self.store.add_op(kind);
        self.schedule();
        id
    }

    pub fn remove_op(&mut self, id: OpId) -> Option<Operation> {
        let removed = self.store.remove_op(id);
        self.schedule();
        removed
    }

    pub fn update_op(&mut self, id: OpId, patch: &OperationPatch) -> bool {
        let found = self.store.update_op(id, patch);
        self.schedule();
        found
    }

    pub fn reorder_ops(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        self.store.reorder_ops(from, to)?;
        self.schedule();
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.store.undo();
        self.schedule();
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.store.redo();
        self.schedule();
        moved
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.schedule();
    }

    /// Send any debounced snapshot now instead of waiting out the interval.
    pub fn flush(&self) {
        self.debouncer.flush();
    }

    fn schedule(&mut self) {
        let snapshot = self.store.snapshot();
        let version = compute_version(&snapshot);
        if self.latest.as_ref() == Some(&version) {
            return;
        }
        tracing::debug!(%version, ops = snapshot.len(), "scheduling recompute");
        self.latest = Some(version);
        self.debouncer.push(snapshot);
    }

    /// Apply every result that has arrived. Returns true if the display changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.results.try_recv() {
            changed |= self.apply(result);
        }
        changed
    }

    /// Block until the latest scheduled version is displayed.
    pub fn wait_for_latest(&mut self, timeout: Duration) -> Result<&DisplayState, RecomputeError> {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.display.version != self.latest {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(result) => {
                    self.apply(result);
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(RecomputeError::Timeout { waited: timeout })
                }
                Err(RecvTimeoutError::Disconnected) => return Err(RecomputeError::Disconnected),
            }
        }
        Ok(&self.display)
    }

    fn apply(&mut self, result: RecomputeResult) -> bool {
        if self.latest.as_ref() != Some(&result.version) {
            tracing::debug!(version = %result.version, "dropping stale result");
            self.stats.stale_dropped += 1;
            return false;
        }
        self.stats.applied += 1;

        let RecomputeResult {
            version,
            mesh,
            edges,
            error,
        } = result;
        self.display.version = Some(version);

        if let Some(error) = error {
            tracing::error!(%error, "recompute failed, keeping previous mesh");
            self.display.last_error = Some(error);
            return true;
        }

        let Some(mesh) = mesh else {
            self.display.mesh = None;
            self.display.edges = None;
            self.display.last_error = None;
            return true;
        };

        let resolved = match edges {
            Some(pairs) if !pairs.is_empty() => resolve_edges(&pairs, &mesh),
            _ => edges_from_indices(&mesh),
        };
        match resolved {
            Ok(edges) => {
                self.display.edges = Some(edges);
                self.display.mesh = Some(mesh);
                self.display.last_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "result edges do not fit its mesh");
                self.display.last_error = Some(e.to_string());
            }
        }
        true
    }
}
