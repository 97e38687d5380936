use crate::message::{DrawOperation, Point, ToolOptions, UserId};
use std::collections::BTreeMap;

/// At most one uncommitted stroke per user. Entries leave only through `take` or `discard`.
#[derive(Debug, Default)]
pub struct StrokeBuffer {
    strokes: BTreeMap<UserId, DrawOperation>,
}

impl StrokeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh stroke. An unfinished stroke of the same user is dropped.
    pub fn begin(&mut self, user_id: UserId, options: ToolOptions) -> &DrawOperation {
        let op = DrawOperation::new(user_id, options);
        if let Some(abandoned) = self.strokes.insert(user_id, op) {
            log::debug!(
                "Dropping unfinished stroke {} of user {} ({} points)",
                abandoned.id,
                user_id,
                abandoned.points.len()
            );
        }
        &self.strokes[&user_id]
    }

    /// Returns false when no stroke is open, e.g. a point delivered after `end-stroke`.
    pub fn append(&mut self, user_id: &UserId, point: Point) -> bool {
        match self.strokes.get_mut(user_id) {
            Some(op) => {
                op.points.push(point);
                true
            }
            None => false,
        }
    }

    pub fn take(&mut self, user_id: &UserId) -> Option<DrawOperation> {
        self.strokes.remove(user_id)
    }

    pub fn discard(&mut self, user_id: &UserId) -> Option<DrawOperation> {
        let dropped = self.take(user_id);
        if let Some(op) = &dropped {
            log::debug!("Discarded stroke {} of departed user {}", op.id, user_id);
        }
        dropped
    }

    pub fn get(&self, user_id: &UserId) -> Option<&DrawOperation> {
        self.strokes.get(user_id)
    }

    pub fn all_in_progress(&self) -> BTreeMap<UserId, DrawOperation> {
        self.strokes.clone()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Tool;

    fn brush() -> ToolOptions {
        ToolOptions {
            tool: Tool::Brush,
            color: "#FFFFFF".into(),
            line_width: 5.0,
        }
    }

    #[test]
    fn it_keeps_strokes_of_users_apart() {
        let a = uuid::Uuid::new_v4();
        let b = uuid::Uuid::new_v4();
        let mut buffer = StrokeBuffer::new();
        buffer.begin(a, brush());
        buffer.begin(b, brush());

        assert!(buffer.append(&a, Point::new(1.0, 1.0)));
        assert!(buffer.append(&a, Point::new(2.0, 2.0)));

        assert_eq!(buffer.get(&a).unwrap().points.len(), 2);
        assert!(buffer.get(&b).unwrap().points.is_empty());
    }

    #[test]
    fn begin_replaces_unfinished_stroke() {
        let a = uuid::Uuid::new_v4();
        let mut buffer = StrokeBuffer::new();
        let first = buffer.begin(a, brush()).id;
        buffer.append(&a, Point::new(1.0, 1.0));
        let second = buffer.begin(a, brush()).id;

        assert_ne!(first, second);
        assert_eq!(buffer.len(), 1);
        assert!(buffer.get(&a).unwrap().points.is_empty());
    }

    #[test]
    fn append_without_open_stroke_is_noop() {
        let a = uuid::Uuid::new_v4();
        let mut buffer = StrokeBuffer::new();
        assert!(!buffer.append(&a, Point::new(1.0, 1.0)));
        assert!(buffer.is_empty());

        buffer.begin(a, brush());
        let taken = buffer.take(&a).unwrap();
        assert_eq!(taken.user_id, a);
        assert!(!buffer.append(&a, Point::new(1.0, 1.0)));
        assert!(buffer.take(&a).is_none());
    }
}
