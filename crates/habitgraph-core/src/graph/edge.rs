//! Canvas edges.

use serde::Serialize;
use serde_json::{Map, Value};

/// A connection between two nodes.
///
/// `meta` holds the canvas's display fields (`animated`, `style`, handle
/// ids) and is round-tripped without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl Edge {
    /// A new edge with a generated id and the default animated style.
    pub fn connect(source: impl Into<String>, target: impl Into<String>) -> Self {
        let mut meta = Map::new();
        meta.insert("animated".to_string(), Value::Bool(true));
        Self {
            id: generate_edge_id(),
            source: source.into(),
            target: target.into(),
            meta,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Normalize a raw snapshot edge. Edges without both endpoints are
    /// dropped; a missing id is generated.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let endpoint = |key: &str| match obj.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        let source = endpoint("source")?;
        let target = endpoint("target")?;
        let id = endpoint("id").unwrap_or_else(generate_edge_id);

        let meta = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "id" | "source" | "target"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            id,
            source,
            target,
            meta,
        })
    }
}

fn generate_edge_id() -> String {
    format!("edge_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_metadata_round_trips() {
        let raw = json!({
            "id": "e0-1",
            "source": "0",
            "target": "1",
            "animated": true,
            "style": { "strokeWidth": 3, "stroke": "#00f3ff" }
        });
        let edge = Edge::from_value(&raw).unwrap();
        assert_eq!(edge.meta.len(), 2);
        assert_eq!(serde_json::to_value(&edge).unwrap(), raw);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        assert!(Edge::from_value(&json!({ "id": "e", "source": "0" })).is_none());
        assert!(Edge::from_value(&json!("e0-1")).is_none());
    }

    #[test]
    fn connect_generates_unique_ids() {
        let a = Edge::connect("0", "1");
        let b = Edge::connect("0", "1");
        assert_ne!(a.id, b.id);
        assert!(a.touches("0") && a.touches("1"));
        assert!(!a.touches("2"));
    }
}
