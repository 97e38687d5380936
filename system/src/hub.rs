use crate::message::{
    ClientEvent, DrawOperation, Point, ServerEvent, Tool, ToolOptions, User, UserId,
};
use crate::presence::{default_palette, PresenceRegistry};
use crate::stroke_buffer::StrokeBuffer;
use crate::undo_redo::UndoRedoCoordinator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outbound end of one connected client.
pub trait Subscriber {
    fn notify(&mut self, event: Arc<ServerEvent>);
}

/// Whose color a brush stroke carries. Eraser strokes are never recolored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushColorPolicy {
    /// Keep the color the client sent with `begin-stroke`.
    #[default]
    Client,
    /// Replace it with the author's presence color.
    Presence,
}

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub palette: Vec<String>,
    /// When set, cursor moves wait for `flush_cursors` instead of broadcasting at once.
    pub coalesce_cursors: bool,
    pub brush_color: BrushColorPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            coalesce_cursors: true,
            brush_color: BrushColorPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(NoOp),
}

/// Benign races, never reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    UnknownUser,
    NoOpenStroke,
    NothingToUndo,
    NothingToRedo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubDescription {
    pub users: Vec<User>,
    pub history_len: usize,
    pub redo_len: usize,
    pub in_progress: Vec<UserId>,
}

/// Serialization point of one shared canvas.
///
/// Every mutation runs to completion through `&mut self` before its broadcast is built,
/// so subscribers only ever see consistent snapshots, and all of them see the same
/// sequence of events.
pub struct SessionHub<S> {
    config: HubConfig,
    presence: PresenceRegistry,
    strokes: StrokeBuffer,
    coordinator: UndoRedoCoordinator,
    subscribers: Vec<(UserId, S)>,
}

impl<S: Subscriber> SessionHub<S> {
    pub fn new(config: HubConfig) -> Self {
        Self {
            presence: PresenceRegistry::new(config.palette.clone()),
            strokes: StrokeBuffer::new(),
            coordinator: UndoRedoCoordinator::new(),
            subscribers: Vec::new(),
            config,
        }
    }

    pub fn join(&mut self, name: Option<&str>, subscriber: S) -> User {
        let user = self.presence.admit(name);
        self.subscribers.push((user.id, subscriber));

        let users = self.users_event();
        self.send_to(&user.id, Arc::new(ServerEvent::Welcome(user.clone())));
        self.send_to(&user.id, users.clone());
        self.send_to(&user.id, self.history_event());
        self.send_to(&user.id, self.drawing_ops_event());
        self.broadcast_except(&user.id, users);

        user
    }

    /// Idempotent: leaving twice is the same as leaving once.
    pub fn leave(&mut self, user_id: &UserId) -> Option<User> {
        let user = self.presence.remove(user_id)?;
        self.subscribers.retain(|(id, _)| id != user_id);
        let had_stroke = self.strokes.discard(user_id).is_some();

        let users = self.users_event();
        self.broadcast(users);
        if had_stroke {
            let drawing_ops = self.drawing_ops_event();
            self.broadcast(drawing_ops);
        }
        Some(user)
    }

    pub fn handle(&mut self, from: &UserId, event: ClientEvent) -> Outcome {
        if !self.presence.contains(from) {
            log::debug!("Ignoring {:?} from departed user {}", event, from);
            return Outcome::Ignored(NoOp::UnknownUser);
        }
        match event {
            ClientEvent::BeginStroke(options) => self.begin_stroke(from, options),
            ClientEvent::DrawPoint(point) => self.append_point(from, point),
            ClientEvent::EndStroke => self.end_stroke(from),
            ClientEvent::Cursor(point) => self.move_cursor(from, point),
            ClientEvent::Undo => self.undo(from),
            ClientEvent::Redo => self.redo(from),
        }
    }

    /// Broadcasts the roster if any cursor moved since the last roster broadcast.
    pub fn flush_cursors(&mut self) -> bool {
        if self.presence.take_dirty_cursors() {
            let users = self.users_event();
            self.broadcast(users);
            true
        } else {
            false
        }
    }

    fn begin_stroke(&mut self, from: &UserId, mut options: ToolOptions) -> Outcome {
        if self.config.brush_color == BrushColorPolicy::Presence && options.tool == Tool::Brush {
            if let Some(user) = self.presence.get(from) {
                options.color = user.color.clone();
            }
        }
        let op_id = self.strokes.begin(*from, options).id;
        log::debug!("User {} began stroke {}", from, op_id);
        let drawing_ops = self.drawing_ops_event();
        self.broadcast(drawing_ops);
        Outcome::Applied
    }

    fn append_point(&mut self, from: &UserId, point: Point) -> Outcome {
        if !self.strokes.append(from, point) {
            return Outcome::Ignored(NoOp::NoOpenStroke);
        }
        let drawing_ops = self.drawing_ops_event();
        self.broadcast(drawing_ops);
        Outcome::Applied
    }

    fn end_stroke(&mut self, from: &UserId) -> Outcome {
        let op = match self.strokes.take(from) {
            Some(op) => op,
            None => return Outcome::Ignored(NoOp::NoOpenStroke),
        };
        self.coordinator.commit(op);

        let history = self.history_event();
        self.broadcast(history);
        let drawing_ops = self.drawing_ops_event();
        self.broadcast(drawing_ops);
        Outcome::Applied
    }

    fn move_cursor(&mut self, from: &UserId, point: Point) -> Outcome {
        self.presence.update_cursor(from, point);
        if !self.config.coalesce_cursors {
            self.flush_cursors();
        }
        Outcome::Applied
    }

    fn undo(&mut self, from: &UserId) -> Outcome {
        match self.coordinator.undo() {
            Some(op) => log::debug!("User {} undid {} by {}", from, op.id, op.user_id),
            None => return Outcome::Ignored(NoOp::NothingToUndo),
        }
        let history = self.history_event();
        self.broadcast(history);
        Outcome::Applied
    }

    fn redo(&mut self, from: &UserId) -> Outcome {
        match self.coordinator.redo() {
            Some(op) => log::debug!("User {} redid {} by {}", from, op.id, op.user_id),
            None => return Outcome::Ignored(NoOp::NothingToRedo),
        }
        let history = self.history_event();
        self.broadcast(history);
        Outcome::Applied
    }

    fn users_event(&mut self) -> Arc<ServerEvent> {
        // the roster carries every cursor, so pending cursor moves ride along
        self.presence.take_dirty_cursors();
        Arc::new(ServerEvent::Users(self.presence.roster().to_vec()))
    }

    fn history_event(&self) -> Arc<ServerEvent> {
        Arc::new(ServerEvent::History(self.coordinator.snapshot()))
    }

    fn drawing_ops_event(&self) -> Arc<ServerEvent> {
        Arc::new(ServerEvent::DrawingOps(self.strokes.all_in_progress()))
    }

    fn broadcast(&mut self, event: Arc<ServerEvent>) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber.notify(event.clone());
        }
    }

    fn broadcast_except(&mut self, except: &UserId, event: Arc<ServerEvent>) {
        for (_, subscriber) in self.subscribers.iter_mut().filter(|(id, _)| id != except) {
            subscriber.notify(event.clone());
        }
    }

    fn send_to(&mut self, to: &UserId, event: Arc<ServerEvent>) {
        if let Some((_, subscriber)) = self.subscribers.iter_mut().find(|(id, _)| id == to) {
            subscriber.notify(event);
        }
    }
}

impl<S> SessionHub<S> {
    pub fn users(&self) -> &[User] {
        self.presence.roster()
    }

    pub fn history(&self) -> &[DrawOperation] {
        self.coordinator.history()
    }

    pub fn redo_stack(&self) -> &[DrawOperation] {
        self.coordinator.redo_stack()
    }

    pub fn in_progress(&self) -> BTreeMap<UserId, DrawOperation> {
        self.strokes.all_in_progress()
    }

    pub fn is_empty(&self) -> bool {
        self.presence.is_empty()
    }

    pub fn describe(&self) -> HubDescription {
        HubDescription {
            users: self.presence.roster().to_vec(),
            history_len: self.coordinator.history().len(),
            redo_len: self.coordinator.redo_stack().len(),
            in_progress: self.strokes.all_in_progress().into_keys().collect(),
        }
    }
}
