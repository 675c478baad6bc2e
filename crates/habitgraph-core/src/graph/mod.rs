//! In-memory habit graph.
//!
//! Holds every node keyed by id (in insertion order) plus the ordered edge
//! list. All mutations keep the referential invariant: every edge's
//! `source` and `target` name an existing node.
//!
//! Id-keyed operations that target a missing node, or a node that is not a
//! habit, are no-ops and report that nothing changed.

mod edge;
mod node;

pub use edge::Edge;
pub use node::{Node, NodeData, Position, DEFAULT_NODE_TYPE, HABIT_NODE_TYPE, LEGACY_HABIT_NODE_TYPE};

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use rand::Rng;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::SnapshotError;
use crate::habit::{CompletionChange, HabitDetails, HabitRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphState {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
}

impl GraphState {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in starting graph: a center anchor, one example habit and the
    /// edge between them.
    pub fn default_graph() -> Self {
        let mut graph = Self::new();
        let mut center = Map::new();
        center.insert("label".to_string(), json!("Center"));
        graph.insert_node(Node::plain("0", DEFAULT_NODE_TYPE, center, Position::new(0.0, 0.0)));
        graph.insert_node(Node::habit(
            "1",
            HabitRecord::new("NODE_01"),
            Position::new(0.0, 200.0),
        ));

        let mut meta = Map::new();
        meta.insert("animated".to_string(), Value::Bool(true));
        graph.edges.push(Edge {
            id: "e0-1".to_string(),
            source: "0".to_string(),
            target: "1".to_string(),
            meta,
        });
        graph
    }

    /// Parse and normalize a `{nodes, edges}` document.
    ///
    /// `nodes` must be present and an array; `edges` is optional. Nodes
    /// without an id, duplicate ids and edges pointing at unknown nodes are
    /// dropped.
    pub fn from_snapshot(value: &Value) -> Result<Self, SnapshotError> {
        let obj = value.as_object().ok_or(SnapshotError::NotAnObject)?;
        let raw_nodes = match obj.get("nodes") {
            None => return Err(SnapshotError::MissingNodes),
            Some(Value::Array(nodes)) => nodes,
            Some(other) => {
                return Err(SnapshotError::NodesNotArray {
                    found: SnapshotError::json_kind(other),
                })
            }
        };

        let mut graph = Self::new();
        for raw in raw_nodes {
            match Node::from_value(raw) {
                Some(node) if graph.nodes.contains_key(&node.id) => {
                    tracing::warn!(id = %node.id, "dropping node with duplicate id");
                }
                Some(node) => graph.insert_node(node),
                None => tracing::warn!("dropping node without a usable id"),
            }
        }

        let raw_edges: &[Value] = match obj.get("edges") {
            Some(Value::Array(edges)) => edges.as_slice(),
            None | Some(Value::Null) => &[],
            Some(other) => {
                tracing::warn!(found = SnapshotError::json_kind(other), "ignoring non-array edges");
                &[]
            }
        };
        for raw in raw_edges {
            let Some(edge) = Edge::from_value(raw) else {
                tracing::warn!("dropping edge without endpoints");
                continue;
            };
            if graph.contains(&edge.source) && graph.contains(&edge.target) {
                graph.edges.push(edge);
            } else {
                tracing::warn!(id = %edge.id, "dropping edge to unknown node");
            }
        }

        Ok(graph)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn habit(&self, id: &str) -> Option<&HabitRecord> {
        self.nodes.get(id).and_then(Node::as_habit)
    }

    pub fn habit_mut(&mut self, id: &str) -> Option<&mut HabitRecord> {
        self.nodes.get_mut(id).and_then(Node::as_habit_mut)
    }

    pub fn habits(&self) -> impl Iterator<Item = (&str, &HabitRecord)> {
        self.nodes
            .values()
            .filter_map(|n| n.as_habit().map(|h| (n.id.as_str(), h)))
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Insert or replace a node by id.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add a fresh habit node and return its id.
    ///
    /// Ids are `node_<epoch millis>`, bumped until unused. The habit is
    /// named after the resulting node count.
    pub fn add_habit_node(&mut self, now: DateTime<Utc>, position: Position) -> String {
        let mut stamp = now.timestamp_millis();
        let mut id = format!("node_{stamp}");
        while self.nodes.contains_key(&id) {
            stamp += 1;
            id = format!("node_{stamp}");
        }

        let name = format!("NODE_{:02}", self.nodes.len() + 1);
        tracing::debug!(%id, %name, "adding habit node");
        self.insert_node(Node::habit(id.clone(), HabitRecord::new(name), position));
        id
    }

    /// Remove a node and every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if self.nodes.shift_remove(id).is_none() {
            return false;
        }
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        tracing::debug!(%id, removed_edges = before - self.edges.len(), "deleted node");
        true
    }

    /// Append an edge between two existing nodes. Parallel edges are
    /// allowed. Returns the new edge id, or `None` if an endpoint is
    /// unknown.
    pub fn connect(&mut self, source: &str, target: &str) -> Option<String> {
        if !self.contains(source) || !self.contains(target) {
            return None;
        }
        let edge = Edge::connect(source, target);
        let id = edge.id.clone();
        self.edges.push(edge);
        Some(id)
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        before != self.edges.len()
    }

    // ── Habit state ──────────────────────────────────────────────────

    /// Mark or un-mark `today` on a habit.
    pub fn toggle_completion(
        &mut self,
        id: &str,
        checked: bool,
        today: NaiveDate,
    ) -> Option<CompletionChange> {
        let habit = self.habit_mut(id)?;
        let change = habit.set_completed(today, checked);
        tracing::debug!(%id, checked, promoted = ?change.promoted_to, "toggled completion");
        Some(change)
    }

    pub fn switch_color(&mut self, id: &str, color: &str) -> bool {
        self.habit_mut(id)
            .map(|habit| habit.switch_color(color))
            .unwrap_or(false)
    }

    pub fn save_details(
        &mut self,
        id: &str,
        details: HabitDetails,
        today: NaiveDate,
    ) -> Option<CompletionChange> {
        let habit = self.habit_mut(id)?;
        Some(habit.apply_details(details, today))
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.habit_mut(id) {
            Some(habit) => {
                habit.habit_name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Re-derive every habit's `is_done` flag for `today`. Completion
    /// history, unlocks and colors are untouched. Returns how many flags
    /// changed.
    pub fn refresh_done_flags(&mut self, today: NaiveDate) -> usize {
        let mut changed = 0;
        for habit in self.nodes.values_mut().filter_map(Node::as_habit_mut) {
            let done = habit.is_completed_on(today);
            if habit.is_done != done {
                habit.is_done = done;
                changed += 1;
            }
        }
        changed
    }
}

impl Serialize for GraphState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes: Vec<&Node> = self.nodes.values().collect();
        let mut state = serializer.serialize_struct("GraphState", 2)?;
        state.serialize_field("nodes", &nodes)?;
        state.serialize_field("edges", &self.edges)?;
        state.end()
    }
}

/// Uniform placement in `[-extent, extent)` on both axes.
pub fn random_position<R: Rng>(rng: &mut R, extent: f64) -> Position {
    if !(extent.is_finite() && extent > 0.0) {
        return Position::default();
    }
    Position::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent))
}
