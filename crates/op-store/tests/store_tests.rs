use op_store::{OperationStore, StoreError};
use panel_types::{OpId, OperationKind, OperationPatch, PanelSize};

fn resize(w: f64) -> OperationKind {
    OperationKind::Resize { w, h: 400.0, t: 18.0 }
}

fn hole(cx: f64) -> OperationKind {
    OperationKind::CircleCut {
        cx,
        cy: 10.0,
        r: 5.0,
        depth: None,
    }
}

fn ids(store: &OperationStore) -> Vec<OpId> {
    store.operations().iter().map(|op| op.id).collect()
}

fn active_ids(store: &OperationStore) -> Vec<OpId> {
    store.active_operations().iter().map(|op| op.id).collect()
}

#[test]
fn new_store_is_empty() {
    let store = OperationStore::new();
    assert!(store.is_empty());
    assert_eq!(store.history_index(), None);
    assert!(store.active_operations().is_empty());
    assert!(!store.can_undo());
    assert!(!store.can_redo());
}

#[test]
fn add_op_appends_and_activates() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));

    assert_ne!(a, b);
    assert_eq!(store.history_index(), Some(1));
    assert_eq!(active_ids(&store), vec![a, b]);
}

#[test]
fn undo_then_redo_restores_active_operations() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));
    store.add_op(hole(50.0));
    store.add_op(hole(80.0));
    let before = store.snapshot();

    assert!(store.undo());
    assert_eq!(store.active_operations().len(), 2);
    assert!(store.redo());

    assert_eq!(store.snapshot(), before);
}

#[test]
fn undo_and_redo_clamp_at_the_ends() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));

    assert!(!store.redo());
    assert!(store.undo());
    assert_eq!(store.history_index(), None);
    assert!(!store.undo());
    assert_eq!(store.history_index(), None);
    assert!(store.active_operations().is_empty());

    assert!(store.redo());
    assert_eq!(store.history_index(), Some(0));
}

#[test]
fn add_after_undo_discards_redo_branch() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));
    store.undo();

    let c = store.add_op(hole(90.0));

    assert_eq!(ids(&store), vec![a, c]);
    assert!(store.get(b).is_none());
    assert_eq!(store.history_index(), Some(1));
    assert!(!store.can_redo());
}

#[test]
fn add_after_undoing_everything_starts_over() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));
    store.undo();

    let b = store.add_op(resize(300.0));

    assert_eq!(ids(&store), vec![b]);
    assert_eq!(store.history_index(), Some(0));
}

#[test]
fn removing_active_operation_moves_pointer_back() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));
    let c = store.add_op(hole(80.0));

    let removed = store.remove_op(b).expect("b exists");

    assert_eq!(removed.id, b);
    assert_eq!(store.history_index(), Some(1));
    assert_eq!(active_ids(&store), vec![a, c]);
}

#[test]
fn removing_redo_branch_operation_keeps_pointer() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));
    store.undo();

    store.remove_op(b);

    assert_eq!(store.history_index(), Some(0));
    assert_eq!(active_ids(&store), vec![a]);
}

#[test]
fn removing_only_operation_empties_history() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));

    store.remove_op(a);

    assert!(store.is_empty());
    assert_eq!(store.history_index(), None);
}

#[test]
fn removing_unknown_id_is_a_no_op() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));
    let before = store.clone();

    assert!(store.remove_op(OpId::new()).is_none());
    assert_eq!(store, before);
}

#[test]
fn update_op_patches_in_place() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));

    let patch = OperationPatch {
        cx: Some(75.0),
        ..Default::default()
    };
    assert!(store.update_op(b, &patch));

    assert_eq!(ids(&store), vec![a, b]);
    assert_eq!(store.history_index(), Some(1));
    assert_eq!(store.get(b).map(|op| &op.kind), Some(&hole(75.0)));
    assert!(!store.update_op(OpId::new(), &patch));
}

#[test]
fn reorder_moves_without_touching_pointer() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));
    let c = store.add_op(hole(80.0));
    store.undo();

    store.reorder_ops(2, 0).unwrap();

    assert_eq!(ids(&store), vec![c, a, b]);
    assert_eq!(store.history_index(), Some(1));
    assert_eq!(active_ids(&store), vec![c, a]);
}

#[test]
fn reorder_clamps_destination() {
    let mut store = OperationStore::new();
    let a = store.add_op(resize(600.0));
    let b = store.add_op(hole(50.0));

    store.reorder_ops(0, 99).unwrap();

    assert_eq!(ids(&store), vec![b, a]);
}

#[test]
fn reorder_rejects_missing_source() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));

    assert_eq!(
        store.reorder_ops(3, 0),
        Err(StoreError::IndexOutOfRange { index: 3, len: 1 })
    );
}

#[test]
fn reset_clears_everything() {
    let mut store = OperationStore::new();
    store.add_op(resize(600.0));
    store.add_op(hole(50.0));

    store.reset();

    assert!(store.is_empty());
    assert_eq!(store.history_index(), None);
}

#[test]
fn current_size_follows_last_active_resize() {
    let mut store = OperationStore::new();
    assert_eq!(store.current_size(), PanelSize::default());

    store.add_op(resize(600.0));
    store.add_op(hole(50.0));
    store.add_op(resize(300.0));
    assert_eq!(store.current_size().w, 300.0);

    store.undo();
    assert_eq!(store.current_size().w, 600.0);
}

#[test]
fn ensure_initialized_only_seeds_empty_history() {
    let mut store = OperationStore::new();
    let size = PanelSize {
        w: 600.0,
        h: 400.0,
        t: 18.0,
    };

    assert!(store.ensure_initialized(size).is_some());
    assert!(store.ensure_initialized(size).is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(store.current_size(), size);
}
