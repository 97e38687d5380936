use crate::message::{DrawOperation, OperationId};

/// Committed operations in global render order.
#[derive(Debug, Default)]
pub struct OperationLog {
    ops: Vec<DrawOperation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, op: DrawOperation) {
        debug_assert!(!self.contains(&op.id), "operation id reused: {}", op.id);
        self.ops.push(op);
    }

    pub fn pop_tail(&mut self) -> Option<DrawOperation> {
        self.ops.pop()
    }

    pub fn contains(&self, op_id: &OperationId) -> bool {
        self.ops.iter().any(|op| op.id == *op_id)
    }

    pub fn last(&self) -> Option<&DrawOperation> {
        self.ops.last()
    }

    pub fn as_slice(&self) -> &[DrawOperation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Tool, ToolOptions};

    fn op() -> DrawOperation {
        DrawOperation::new(
            uuid::Uuid::new_v4(),
            ToolOptions {
                tool: Tool::Brush,
                color: "#FFFFFF".into(),
                line_width: 2.0,
            },
        )
    }

    #[test]
    fn it_keeps_commit_order() {
        let mut log = OperationLog::new();
        let (first, second) = (op(), op());
        log.append(first.clone());
        log.append(second.clone());

        assert_eq!(log.as_slice(), &[first.clone(), second.clone()][..]);
        assert_eq!(log.pop_tail(), Some(second));
        assert_eq!(log.last(), Some(&first));
    }

    #[test]
    #[should_panic]
    fn should_panic_when_appending_same_operation_id() {
        let mut log = OperationLog::new();
        let op = op();
        log.append(op.clone());
        log.append(op);
    }
}
