//! Canvas node records.
//!
//! A node is either a habit, whose data is a [`HabitRecord`], or a plain
//! node (the center anchor, labels) whose data is kept as opaque JSON.
//! Positions belong to the canvas and are carried through untouched.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::habit::{normalize_habit, HabitRecord};

/// Node type written for habit nodes.
pub const HABIT_NODE_TYPE: &str = "habit";
/// Habit node type used by snapshots from before the reward system.
pub const LEGACY_HABIT_NODE_TYPE: &str = "colorPicker";
/// Type given to plain nodes that carry none.
pub const DEFAULT_NODE_TYPE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn from_value(value: Option<&Value>) -> Self {
        let coord = |axis: &str| {
            value
                .and_then(|v| v.get(axis))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        Self::new(coord("x"), coord("y"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Habit(HabitRecord),
    Plain {
        kind: String,
        data: Map<String, Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn habit(id: impl Into<String>, habit: HabitRecord, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData::Habit(habit),
        }
    }

    pub fn plain(
        id: impl Into<String>,
        kind: impl Into<String>,
        data: Map<String, Value>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData::Plain {
                kind: kind.into(),
                data,
            },
        }
    }

    /// The `type` string written to snapshots.
    pub fn kind(&self) -> &str {
        match &self.data {
            NodeData::Habit(_) => HABIT_NODE_TYPE,
            NodeData::Plain { kind, .. } => kind,
        }
    }

    pub fn as_habit(&self) -> Option<&HabitRecord> {
        match &self.data {
            NodeData::Habit(habit) => Some(habit),
            NodeData::Plain { .. } => None,
        }
    }

    pub fn as_habit_mut(&mut self) -> Option<&mut HabitRecord> {
        match &mut self.data {
            NodeData::Habit(habit) => Some(habit),
            NodeData::Plain { .. } => None,
        }
    }

    /// Normalize a raw snapshot node.
    ///
    /// Returns `None` when the node has no usable id; everything else is
    /// defaulted.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let position = Position::from_value(value.get("position"));
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NODE_TYPE);
        let data = value.get("data").cloned().unwrap_or(Value::Null);

        let data = if kind == HABIT_NODE_TYPE || kind == LEGACY_HABIT_NODE_TYPE {
            NodeData::Habit(normalize_habit(&data))
        } else {
            NodeData::Plain {
                kind: kind.to_string(),
                data: match data {
                    Value::Object(map) => map,
                    _ => Map::new(),
                },
            }
        };

        Some(Self { id, position, data })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.kind())?;
        match &self.data {
            NodeData::Habit(habit) => state.serialize_field("data", habit)?,
            NodeData::Plain { data, .. } => state.serialize_field("data", data)?,
        }
        state.serialize_field("position", &self.position)?;
        state.end()
    }
}
