use crate::message::{DrawOperation, HistorySnapshot};
use crate::operation_log::OperationLog;

/// One history/redo stack pair shared by every user of a session.
///
/// Undo and redo are global: whoever asks pops the most recent entry, regardless of
/// who drew it. `commit` is the only transition that clears the redo stack.
#[derive(Debug, Default)]
pub struct UndoRedoCoordinator {
    history: OperationLog,
    redo: Vec<DrawOperation>,
}

impl UndoRedoCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, op: DrawOperation) {
        debug_assert!(
            self.redo.iter().all(|undone| undone.id != op.id),
            "operation id reused: {}",
            op.id
        );
        log::debug!(
            "Commit {} by {} ({} points), dropping {} redo entries",
            op.id,
            op.user_id,
            op.points.len(),
            self.redo.len()
        );
        self.history.append(op);
        self.redo.clear();
    }

    /// `None` means nothing to undo.
    pub fn undo(&mut self) -> Option<&DrawOperation> {
        let op = self.history.pop_tail()?;
        self.redo.push(op);
        self.redo.last()
    }

    /// `None` means nothing to redo.
    pub fn redo(&mut self) -> Option<&DrawOperation> {
        let op = self.redo.pop()?;
        self.history.append(op);
        self.history.last()
    }

    pub fn history(&self) -> &[DrawOperation] {
        self.history.as_slice()
    }

    pub fn redo_stack(&self) -> &[DrawOperation] {
        &self.redo
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            history: self.history.as_slice().to_vec(),
            redo_stack: self.redo.clone(),
        }
    }
}
