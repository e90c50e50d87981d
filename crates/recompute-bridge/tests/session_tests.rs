use std::sync::mpsc;
use std::time::Duration;

use approx::assert_relative_eq;

use panel_kernel::{BoxedKernel, MockKernel};
use panel_types::{OperationKind, OperationPatch};
use recompute_bridge::{Debouncer, PanelSession, RecomputeClient, RecomputeConfig};
use shape_ops::BuildOptions;

const WAIT: Duration = Duration::from_secs(10);

fn config(debounce_ms: u64) -> RecomputeConfig {
    RecomputeConfig {
        debounce_ms,
        ..RecomputeConfig::default()
    }
}

fn session_with(kernel: MockKernel, debounce_ms: u64) -> PanelSession {
    let client = RecomputeClient::spawn_with(
        move || Ok(Box::new(kernel) as BoxedKernel),
        BuildOptions::default(),
    )
    .unwrap();
    PanelSession::new(client, &config(debounce_ms)).unwrap()
}

fn rect_cut() -> OperationKind {
    OperationKind::RectCut {
        x: 10.0,
        y: 10.0,
        w: 20.0,
        h: 20.0,
        depth: None,
    }
}

// ── Debouncer ──────────────────────────────────────────────────────────────

#[test]
fn burst_is_coalesced_into_last_value() {
    let (tx, rx) = mpsc::channel();
    let debouncer = Debouncer::spawn(Duration::from_millis(100), move |v: u32| {
        let _ = tx.send(v);
    })
    .unwrap();

    for v in 1..=5 {
        debouncer.push(v);
    }

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), 5);
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn flush_delivers_without_waiting() {
    let (tx, rx) = mpsc::channel();
    let debouncer = Debouncer::spawn(Duration::from_secs(60), move |v: u32| {
        let _ = tx.send(v);
    })
    .unwrap();

    debouncer.push(7);
    debouncer.flush();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), 7);
}

#[test]
fn dropping_debouncer_delivers_pending_value() {
    let (tx, rx) = mpsc::channel();
    let debouncer = Debouncer::spawn(Duration::from_secs(60), move |v: &'static str| {
        let _ = tx.send(v);
    })
    .unwrap();

    debouncer.push("last edit");
    drop(debouncer);

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "last edit");
}

// ── Session ────────────────────────────────────────────────────────────────

#[test]
fn initialize_displays_default_panel() {
    let mut session = session_with(MockKernel::new(), 10);

    assert!(session.initialize().is_some());
    let display = session.wait_for_latest(WAIT).unwrap();

    let (_, max) = display.mesh.as_ref().unwrap().bounding_box().unwrap();
    assert_relative_eq!(max[0], 600.0);
    assert_relative_eq!(max[1], 400.0);
    assert_relative_eq!(max[2], 18.0);
    assert!(display.edges.as_ref().is_some_and(|e| !e.is_empty()));
    assert!(display.last_error.is_none());
}

#[test]
fn rapid_edits_display_the_final_state() {
    let mut session = session_with(MockKernel::new(), 50);
    session.initialize();
    let id = session.add_op(OperationKind::Resize {
        w: 100.0,
        h: 100.0,
        t: 10.0,
    });
    for w in [110.0, 120.0, 130.0] {
        session.update_op(
            id,
            &OperationPatch {
                w: Some(w),
                ..Default::default()
            },
        );
    }

    let display = session.wait_for_latest(WAIT).unwrap();

    let (_, max) = display.mesh.as_ref().unwrap().bounding_box().unwrap();
    assert_relative_eq!(max[0], 130.0);
    assert_eq!(session.display().version.as_ref(), session.latest_version());
}

#[test]
fn stale_results_are_dropped() {
    let kernel = MockKernel::new().with_triangulate_delay(Duration::from_millis(20));
    let mut session = session_with(kernel, 60_000);

    session.add_op(OperationKind::Resize {
        w: 10.0,
        h: 10.0,
        t: 1.0,
    });
    session.flush();
    session.add_op(OperationKind::Resize {
        w: 20.0,
        h: 10.0,
        t: 1.0,
    });
    session.flush();

    let display = session.wait_for_latest(WAIT).unwrap();
    let (_, max) = display.mesh.as_ref().unwrap().bounding_box().unwrap();
    assert_relative_eq!(max[0], 20.0);
    assert_eq!(session.stats().stale_dropped, 1);
    assert_eq!(session.stats().applied, 1);
}

#[test]
fn failed_recompute_keeps_previous_mesh() {
    let kernel = MockKernel::new().fail_subtract_with("tool outside panel");
    let mut session = session_with(kernel, 10);
    session.initialize();
    let before = session.wait_for_latest(WAIT).unwrap().mesh.clone();

    session.add_op(rect_cut());
    let display = session.wait_for_latest(WAIT).unwrap();

    assert!(display
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("tool outside panel")));
    assert!(before.is_some());
    assert_eq!(display.mesh, before);
}

#[test]
fn undoing_everything_clears_the_display() {
    let mut session = session_with(MockKernel::new(), 10);
    session.initialize();
    session.wait_for_latest(WAIT).unwrap();

    assert!(session.undo());
    let display = session.wait_for_latest(WAIT).unwrap();

    assert!(display.mesh.is_none());
    assert!(display.edges.is_none());
}

#[test]
fn no_op_edit_does_not_reschedule() {
    let mut session = session_with(MockKernel::new(), 10);
    session.initialize();
    session.wait_for_latest(WAIT).unwrap();
    let latest = session.latest_version().cloned();

    assert!(!session.redo(), "Nothing to redo");
    assert_eq!(session.latest_version().cloned(), latest);
    assert!(!session.poll());
}

#[test]
fn redo_restores_the_cut() {
    let mut session = session_with(MockKernel::new(), 10);
    session.initialize();
    session.add_op(rect_cut());
    let with_cut = session.wait_for_latest(WAIT).unwrap().version.clone();

    session.undo();
    session.wait_for_latest(WAIT).unwrap();
    session.redo();
    let display = session.wait_for_latest(WAIT).unwrap();

    assert_eq!(display.version, with_cut);
    assert_eq!(session.store().active_operations().len(), 2);
}
