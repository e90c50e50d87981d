//! Ordered operation history with a linear undo/redo pointer.

use panel_types::{OpId, Operation, OperationKind, OperationPatch, PanelSize};

use crate::types::StoreError;

/// The panel's operation history.
///
/// `history_index` points at the last active operation; `None` means nothing is
/// active. Operations after the pointer form the redo branch until the next
/// `add_op` discards them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStore {
    operations: Vec<Operation>,
    history_index: Option<usize>,
}

impl OperationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation, dropping any redo branch first. Returns the new id.
    pub fn add_op(&mut self, kind: OperationKind) -> OpId {
        let keep = self.active_len();
        if keep < self.operations.len() {
            tracing::debug!(
                dropped = self.operations.len() - keep,
                "discarding redo branch"
            );
            self.operations.truncate(keep);
        }

        let op = Operation::new(kind);
        let id = op.id;
        self.operations.push(op);
        self.history_index = Some(self.operations.len() - 1);
        id
    }

    /// Remove an operation by id. The pointer moves back by one when the
    /// removed operation was active.
    pub fn remove_op(&mut self, id: OpId) -> Option<Operation> {
        let pos = self.position(id)?;
        let removed = self.operations.remove(pos);

        if let Some(idx) = self.history_index {
            if pos <= idx {
                self.history_index = idx.checked_sub(1);
            }
        }

        Some(removed)
    }

    /// Merge a patch into an operation's parameters. Id, position and pointer
    /// are unchanged. Returns whether an operation matched.
    pub fn update_op(&mut self, id: OpId, patch: &OperationPatch) -> bool {
        match self.operations.iter_mut().find(|op| op.id == id) {
            Some(op) => {
                op.kind.apply_patch(patch);
                true
            }
            None => false,
        }
    }

    /// Move the operation at `from` to `to`. `to` is clamped to the last slot.
    ///
    /// The history pointer stays on its numeric slot, so moving an operation
    /// across it changes which operations are active.
    pub fn reorder_ops(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.operations.len();
        if from >= len {
            return Err(StoreError::IndexOutOfRange { index: from, len });
        }

        let op = self.operations.remove(from);
        let to = to.min(self.operations.len());
        self.operations.insert(to, op);
        Ok(())
    }

    /// Step the pointer back. Returns false when nothing is active.
    pub fn undo(&mut self) -> bool {
        match self.history_index {
            Some(idx) => {
                self.history_index = idx.checked_sub(1);
                true
            }
            None => false,
        }
    }

    /// Step the pointer forward. Returns false at the end of the history.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.history_index = Some(self.history_index.map_or(0, |idx| idx + 1));
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history_index.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.active_len() < self.operations.len()
    }

    /// Clear the whole history.
    pub fn reset(&mut self) {
        self.operations.clear();
        self.history_index = None;
    }

    /// The operations up to and including the pointer.
    pub fn active_operations(&self) -> &[Operation] {
        &self.operations[..self.active_len()]
    }

    /// An owned copy of the active operations, for handing to the compute side.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.active_operations().to_vec()
    }

    /// Dimensions set by the last active resize, or all zeros.
    pub fn current_size(&self) -> PanelSize {
        self.active_operations()
            .iter()
            .rev()
            .find_map(|op| match op.kind {
                OperationKind::Resize { w, h, t } => Some(PanelSize { w, h, t }),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Seed an empty history with a resize to `size`. Returns the new id, or
    /// `None` when the history already has operations.
    pub fn ensure_initialized(&mut self, size: PanelSize) -> Option<OpId> {
        if !self.operations.is_empty() {
            return None;
        }
        Some(self.add_op(size.into()))
    }

    pub fn get(&self, id: OpId) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }

    /// Every operation, including the redo branch.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn position(&self, id: OpId) -> Option<usize> {
        self.operations.iter().position(|op| op.id == id)
    }

    /// Length of the active prefix.
    fn active_len(&self) -> usize {
        self.history_index.map_or(0, |idx| idx + 1)
    }
}
