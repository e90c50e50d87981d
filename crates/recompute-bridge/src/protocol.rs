//! Versioned request/response matching between callers and the worker.
//!
//! Callers register a waiter under the request's version before the request
//! reaches the worker. A router thread owns the pending table and hands each
//! result to the waiters registered under its version, then forgets them.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use panel_kernel::{BoxedKernel, KernelError, TruckKernel};
use panel_types::Operation;
use shape_ops::BuildOptions;

use crate::error::RecomputeError;
use crate::messages::{RecomputeRequest, RecomputeResult, WorkerMessage};
use crate::version::Version;
use crate::worker::{RecomputeWorker, WorkerHandle};

/// Waiters keyed by version.
#[derive(Default)]
pub struct PendingTable {
    waiters: HashMap<Version, Vec<Sender<RecomputeResult>>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, version: Version, reply: Sender<RecomputeResult>) {
        self.waiters.entry(version).or_default().push(reply);
    }

    /// Deliver a result to every waiter for its version and drop them.
    /// Returns how many were delivered; a result nobody waits for returns 0.
    pub fn resolve(&mut self, result: RecomputeResult) -> usize {
        let Some(waiters) = self.waiters.remove(&result.version) else {
            tracing::debug!(version = %result.version, "result matches no pending request");
            return 0;
        };
        waiters
            .into_iter()
            .filter(|reply| reply.send(result.clone()).is_ok())
            .count()
    }

    /// Drop the waiters for `version`; their handles report `Disconnected`.
    pub fn abandon(&mut self, version: &Version) {
        self.waiters.remove(version);
    }

    pub fn is_pending(&self, version: &Version) -> bool {
        self.waiters.contains_key(version)
    }

    /// Number of waiters across all versions.
    pub fn len(&self) -> usize {
        self.waiters.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

enum RouterInput {
    Register {
        version: Version,
        reply: Sender<RecomputeResult>,
    },
    Abandon(Version),
    WatchReady(Sender<Result<(), String>>),
    Worker(WorkerMessage),
}

impl From<WorkerMessage> for RouterInput {
    fn from(msg: WorkerMessage) -> Self {
        RouterInput::Worker(msg)
    }
}

fn router_loop(inbox: Receiver<RouterInput>) {
    let mut pending = PendingTable::new();
    let mut readiness: Option<Result<(), String>> = None;
    let mut ready_watchers: Vec<Sender<Result<(), String>>> = Vec::new();

    while let Ok(input) = inbox.recv() {
        match input {
            RouterInput::Register { version, reply } => pending.register(version, reply),
            RouterInput::Abandon(version) => pending.abandon(&version),
            RouterInput::WatchReady(watcher) => match &readiness {
                Some(state) => {
                    let _ = watcher.send(state.clone());
                }
                None => ready_watchers.push(watcher),
            },
            RouterInput::Worker(WorkerMessage::Result(result)) => {
                pending.resolve(result);
            }
            RouterInput::Worker(WorkerMessage::Ready) => {
                readiness = Some(Ok(()));
                for watcher in ready_watchers.drain(..) {
                    let _ = watcher.send(Ok(()));
                }
            }
            RouterInput::Worker(WorkerMessage::InitFailed { reason }) => {
                for watcher in ready_watchers.drain(..) {
                    let _ = watcher.send(Err(reason.clone()));
                }
                readiness = Some(Err(reason));
            }
        }
    }
    tracing::debug!(abandoned = pending.len(), "router shutting down");
}

/// Interactive-side entry point to the recompute worker.
///
/// Cheap to clone; the worker and router threads stop once every clone is
/// dropped and in-flight requests are answered.
#[derive(Clone)]
pub struct RecomputeClient {
    router: Sender<RouterInput>,
    worker: WorkerHandle,
}

impl RecomputeClient {
    /// Start a worker whose kernel is built by `factory` on its own thread.
    pub fn spawn_with<F>(factory: F, options: BuildOptions) -> Result<Self, RecomputeError>
    where
        F: FnOnce() -> Result<BoxedKernel, KernelError> + Send + 'static,
    {
        let (router, inbox) = mpsc::channel();
        thread::Builder::new()
            .name("recompute-router".into())
            .spawn(move || router_loop(inbox))?;

        let worker = RecomputeWorker::spawn(factory, options, router.clone())?;
        Ok(Self { router, worker })
    }

    /// Start a worker backed by the truck kernel.
    pub fn spawn_truck(options: BuildOptions) -> Result<Self, RecomputeError> {
        Self::spawn_with(|| Ok(Box::new(TruckKernel::new()) as BoxedKernel), options)
    }

    /// Send a snapshot for recompute. Returns at once with a handle that
    /// resolves to the result carrying the same version.
    pub fn request(&self, operations: Vec<Operation>) -> PendingRecompute {
        let request = RecomputeRequest::new(operations);
        let version = request.version.clone();
        let (reply, receiver) = mpsc::channel();
        self.submit(request, reply);
        PendingRecompute { version, receiver }
    }

    /// Like `request`, but the result is delivered to `reply`.
    pub fn submit(&self, request: RecomputeRequest, reply: Sender<RecomputeResult>) {
        let version = request.version.clone();
        tracing::debug!(%version, ops = request.operations.len(), "submitting recompute");

        let registered = self.router.send(RouterInput::Register {
            version: version.clone(),
            reply,
        });
        if registered.is_err() {
            tracing::warn!(%version, "router gone, request dropped");
            return;
        }
        if self.worker.send(request).is_err() {
            tracing::warn!(%version, "worker gone, request dropped");
            let _ = self.router.send(RouterInput::Abandon(version));
        }
    }

    /// Block until the kernel is initialized.
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), RecomputeError> {
        let (watcher, receiver) = mpsc::channel();
        self.router
            .send(RouterInput::WatchReady(watcher))
            .map_err(|_| RecomputeError::Disconnected)?;
        match receiver.recv_timeout(timeout) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(RecomputeError::InitFailed { reason }),
            Err(RecvTimeoutError::Timeout) => Err(RecomputeError::Timeout { waited: timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(RecomputeError::Disconnected),
        }
    }
}

/// Single-shot handle for one request's result.
pub struct PendingRecompute {
    version: Version,
    receiver: Receiver<RecomputeResult>,
}

impl PendingRecompute {
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn wait(self) -> Result<RecomputeResult, RecomputeError> {
        self.receiver
            .recv()
            .map_err(|_| RecomputeError::Disconnected)
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Result<RecomputeResult, RecomputeError> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => RecomputeError::Timeout { waited: timeout },
            RecvTimeoutError::Disconnected => RecomputeError::Disconnected,
        })
    }

    /// Non-blocking check. `Ok(None)` while the result is still in flight.
    pub fn try_result(&self) -> Result<Option<RecomputeResult>, RecomputeError> {
        match self.receiver.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RecomputeError::Disconnected),
        }
    }
}
