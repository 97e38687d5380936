use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type UserId = uuid::Uuid;
pub type OperationId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Brush,
    Eraser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOptions {
    pub tool: Tool,
    pub color: String,
    pub line_width: f64,
}

/// One stroke. Mutable only while it sits in the stroke buffer; frozen once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOperation {
    pub id: OperationId,
    pub user_id: UserId,
    pub options: ToolOptions,
    pub points: Vec<Point>,
}

impl DrawOperation {
    pub fn new(user_id: UserId, options: ToolOptions) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id,
            options,
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub color: String,
    pub cursor: Option<Point>,
}

/// `redo_stack` is in storage order: the next `redo` restores its last element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub history: Vec<DrawOperation>,
    pub redo_stack: Vec<DrawOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    #[serde(rename = "begin-stroke")]
    BeginStroke(ToolOptions),
    #[serde(rename = "draw-point")]
    DrawPoint(Point),
    #[serde(rename = "end-stroke")]
    EndStroke,
    #[serde(rename = "cursor")]
    Cursor(Point),
    #[serde(rename = "undo")]
    Undo,
    #[serde(rename = "redo")]
    Redo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerEvent {
    /// Sent only to the joining client.
    #[serde(rename = "welcome")]
    Welcome(User),
    #[serde(rename = "users")]
    Users(Vec<User>),
    #[serde(rename = "history")]
    History(HistorySnapshot),
    #[serde(rename = "drawing-ops")]
    DrawingOps(BTreeMap<UserId, DrawOperation>),
    /// Sent only to the client whose frame was rejected.
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome(_) => "welcome",
            Self::Users(_) => "users",
            Self::History(_) => "history",
            Self::DrawingOps(_) => "drawing-ops",
            Self::Error { .. } => "error",
        }
    }
}
