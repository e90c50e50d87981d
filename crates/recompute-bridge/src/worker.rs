//! The compute side: owns the kernel and answers recompute requests one at a time.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use panel_kernel::{BoxedKernel, Kernel, KernelError};
use panel_types::{EdgePair, MeshBuffers, Operation};
use shape_ops::{build_shape, extract_edge_pairs, tessellate, BuildError, BuildOptions};

use crate::error::RecomputeError;
use crate::messages::{RecomputeRequest, RecomputeResult, WorkerMessage};

/// Inbound traffic for the worker thread.
pub enum WorkerInput {
    Request(RecomputeRequest),
    /// Outcome of kernel initialization, posted by the init thread.
    KernelInitialized(Result<BoxedKernel, KernelError>),
}

enum WorkerState {
    Initializing { backlog: VecDeque<RecomputeRequest> },
    Ready { kernel: BoxedKernel },
    Failed { reason: String },
}

/// Request handling state machine: initializing, then ready or failed.
///
/// Requests that arrive while the kernel is initializing are buffered and
/// replayed in arrival order once it is up.
pub struct RecomputeWorker {
    state: WorkerState,
    options: BuildOptions,
}

impl RecomputeWorker {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            state: WorkerState::Initializing {
                backlog: VecDeque::new(),
            },
            options,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, WorkerState::Ready { .. })
    }

    /// Requests waiting for the kernel.
    pub fn backlog_len(&self) -> usize {
        match &self.state {
            WorkerState::Initializing { backlog } => backlog.len(),
            _ => 0,
        }
    }

    pub fn on_request(&mut self, request: RecomputeRequest, emit: &mut dyn FnMut(WorkerMessage)) {
        match &mut self.state {
            WorkerState::Initializing { backlog } => {
                tracing::debug!(version = %request.version, "kernel not ready, buffering request");
                backlog.push_back(request);
            }
            WorkerState::Ready { kernel } => {
                let result = recompute(kernel.as_mut(), &request, &self.options);
                emit(WorkerMessage::Result(result));
            }
            WorkerState::Failed { reason } => {
                emit(WorkerMessage::Result(RecomputeResult::failure(
                    request.version,
                    init_failure_message(reason),
                )));
            }
        }
    }

    /// Leave the initializing state, announce it, then drain the backlog in order.
    pub fn on_kernel_initialized(
        &mut self,
        outcome: Result<BoxedKernel, KernelError>,
        emit: &mut dyn FnMut(WorkerMessage),
    ) {
        let backlog = match &mut self.state {
            WorkerState::Initializing { backlog } => std::mem::take(backlog),
            _ => {
                tracing::warn!("kernel initialized twice, ignoring");
                return;
            }
        };

        match outcome {
            Ok(kernel) => {
                tracing::info!(buffered = backlog.len(), "kernel ready");
                self.state = WorkerState::Ready { kernel };
                emit(WorkerMessage::Ready);
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(%reason, "kernel initialization failed");
                self.state = WorkerState::Failed {
                    reason: reason.clone(),
                };
                emit(WorkerMessage::InitFailed { reason });
            }
        }

        for request in backlog {
            self.on_request(request, emit);
        }
    }
}

fn init_failure_message(reason: &str) -> String {
    format!("kernel unavailable: {reason}")
}

/// Run one request to completion on `kernel`.
///
/// Never fails: kernel errors and panics become `RecomputeResult::error`.
/// The kernel's shapes are released afterwards.
pub fn recompute(
    kernel: &mut dyn Kernel,
    request: &RecomputeRequest,
    options: &BuildOptions,
) -> RecomputeResult {
    let version = request.version.clone();
    if request.operations.is_empty() {
        return RecomputeResult::empty(version);
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_pipeline(&mut *kernel, &request.operations, options)
    }));
    kernel.release_all();

    match outcome {
        Ok(Ok((mesh, edges))) => {
            tracing::debug!(
                %version,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                edges = edges.len(),
                "recompute finished"
            );
            RecomputeResult::success(version, mesh, edges)
        }
        Ok(Err(e)) => {
            tracing::error!(%version, error = %e, "recompute failed");
            RecomputeResult::failure(version, e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%version, %message, "recompute panicked");
            RecomputeResult::failure(version, message)
        }
    }
}

fn run_pipeline(
    kernel: &mut dyn Kernel,
    ops: &[Operation],
    options: &BuildOptions,
) -> Result<(MeshBuffers, Vec<EdgePair>), BuildError> {
    let shape = build_shape(kernel, ops, options)?;
    let mesh = tessellate(kernel, shape.as_ref(), options.tessellation_tolerance)?;
    let edges = extract_edge_pairs(&mesh.indices);
    Ok((mesh, edges))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("kernel panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("kernel panicked: {s}")
    } else {
        "kernel panicked".to_string()
    }
}

/// Sending side of a running worker thread.
#[derive(Clone)]
pub struct WorkerHandle {
    inbox: Sender<WorkerInput>,
}

impl WorkerHandle {
    /// Queue a request. Fails only if the worker thread is gone.
    pub fn send(&self, request: RecomputeRequest) -> Result<(), RecomputeError> {
        self.inbox
            .send(WorkerInput::Request(request))
            .map_err(|_| RecomputeError::Disconnected)
    }
}

impl RecomputeWorker {
    /// Start the worker thread and a separate kernel-init thread.
    ///
    /// Every `WorkerMessage` is converted into `M` and sent to `outbox`. The
    /// worker exits once every `WorkerHandle` is dropped and its inbox drained.
    pub fn spawn<F, M>(
        factory: F,
        options: BuildOptions,
        outbox: Sender<M>,
    ) -> Result<WorkerHandle, RecomputeError>
    where
        F: FnOnce() -> Result<BoxedKernel, KernelError> + Send + 'static,
        M: From<WorkerMessage> + Send + 'static,
    {
        let (inbox, requests) = mpsc::channel();

        thread::Builder::new()
            .name("recompute-worker".into())
            .spawn(move || worker_loop(requests, outbox, options))?;

        let init_inbox = inbox.clone();
        thread::Builder::new()
            .name("kernel-init".into())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(factory)).unwrap_or_else(|p| {
                    Err(KernelError::InitFailed {
                        reason: panic_message(p.as_ref()),
                    })
                });
                if init_inbox.send(WorkerInput::KernelInitialized(outcome)).is_err() {
                    tracing::debug!("worker gone before kernel initialized");
                }
            })?;

        Ok(WorkerHandle { inbox })
    }
}

fn worker_loop<M: From<WorkerMessage>>(
    requests: Receiver<WorkerInput>,
    outbox: Sender<M>,
    options: BuildOptions,
) {
    let mut worker = RecomputeWorker::new(options);
    let mut emit = |msg: WorkerMessage| {
        if outbox.send(M::from(msg)).is_err() {
            tracing::debug!("worker output dropped, no receiver");
        }
    };

    while let Ok(input) = requests.recv() {
        match input {
            WorkerInput::Request(request) => worker.on_request(request, &mut emit),
            WorkerInput::KernelInitialized(outcome) => {
                worker.on_kernel_initialized(outcome, &mut emit)
            }
        }
    }
    tracing::debug!("recompute worker shutting down");
}
