//! Snapshot persistence, export and import.
//!
//! The graph is stored as one JSON document under [`SNAPSHOT_KEY`]; the
//! date the app last ran is kept under [`LAST_OPENED_KEY`]. Everything that
//! enters or leaves the store passes through [`GraphState::from_snapshot`],
//! which is the single place legacy data is migrated.
//!
//! Loading never fails: a missing or corrupt snapshot yields the built-in
//! default graph. Import never partially applies: the payload is parsed,
//! confirmed and written through before the in-memory graph is replaced.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use super::KvStore;
use crate::clock::{day_key, parse_day_key};
use crate::error::{CoreError, Result, SnapshotError, StorageError};
use crate::graph::GraphState;

/// Key holding the `{nodes, edges}` snapshot.
pub const SNAPSHOT_KEY: &str = "habitGraph";
/// Key holding the last processed/opened date as `YYYY-MM-DD`.
pub const LAST_OPENED_KEY: &str = "lastOpenedDate";
/// Format version written into export files.
pub const EXPORT_VERSION: &str = "1.0";

/// Shape of an exported file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    #[serde(flatten)]
    pub graph: &'a GraphState,
    pub exported_at: DateTime<Utc>,
    pub version: &'static str,
}

pub struct Persistence<S> {
    store: S,
}

impl<S: KvStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read the stored graph, falling back to defaults.
    pub fn load(&self) -> GraphState {
        let raw = match self.store.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("no stored snapshot, starting from defaults");
                return GraphState::default_graph();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read snapshot, starting from defaults");
                return GraphState::default_graph();
            }
        };

        match parse_snapshot(&raw) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(error = %e, "stored snapshot is malformed, starting from defaults");
                GraphState::default_graph()
            }
        }
    }

    /// Normalize and write the graph, then record `today` as last opened.
    ///
    /// # Errors
    /// Returns [`StorageError`] if serialization or the write fails. Both
    /// keys are written as one batch, so a failure leaves the store as it
    /// was. The in-memory graph is never touched.
    pub fn save(&mut self, graph: &GraphState, today: NaiveDate) -> Result<(), StorageError> {
        let normalized = renormalize(graph).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let json =
            serde_json::to_string(&normalized).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let today = day_key(today);
        self.store.write_batch(&[
            (SNAPSHOT_KEY, Some(json.as_str())),
            (LAST_OPENED_KEY, Some(today.as_str())),
        ])
    }

    /// Last date recorded by a save or a daily reset check.
    pub fn last_opened(&self) -> Option<NaiveDate> {
        match self.store.get(LAST_OPENED_KEY) {
            Ok(value) => value.as_deref().and_then(parse_day_key),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last opened date");
                None
            }
        }
    }

    pub fn set_last_opened(&mut self, date: NaiveDate) -> Result<(), StorageError> {
        self.store.set(LAST_OPENED_KEY, &day_key(date))
    }

    /// Pretty-printed export document for `graph`. Does not touch the store.
    pub fn export(&self, graph: &GraphState, now: DateTime<Utc>) -> Result<String> {
        let normalized = renormalize(graph)?;
        let doc = ExportDocument {
            graph: &normalized,
            exported_at: now,
            version: EXPORT_VERSION,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Replace `graph` with the contents of an import payload.
    ///
    /// `confirm` is shown the parsed graph and must return `true` for the
    /// import to proceed. On any error `graph` and the store are unchanged.
    pub fn import<F>(
        &mut self,
        graph: &mut GraphState,
        payload: &str,
        today: NaiveDate,
        confirm: F,
    ) -> Result<()>
    where
        F: FnOnce(&GraphState) -> bool,
    {
        let incoming = parse_snapshot(payload)?;
        if !confirm(&incoming) {
            return Err(SnapshotError::Declined.into());
        }
        self.save(&incoming, today)?;
        tracing::info!(
            nodes = incoming.node_count(),
            edges = incoming.edges().len(),
            "imported graph"
        );
        *graph = incoming;
        Ok(())
    }

    /// Forget everything stored and return the default graph.
    pub fn clear(&mut self) -> Result<GraphState, StorageError> {
        self.store
            .write_batch(&[(SNAPSHOT_KEY, None), (LAST_OPENED_KEY, None)])?;
        tracing::info!("cleared stored data");
        Ok(GraphState::default_graph())
    }
}

/// Parse a snapshot or import payload.
pub fn parse_snapshot(raw: &str) -> Result<GraphState, SnapshotError> {
    let value: Value = serde_json::from_str(raw)?;
    GraphState::from_snapshot(&value)
}

fn renormalize(graph: &GraphState) -> Result<GraphState, CoreError> {
    let value = serde_json::to_value(graph)?;
    Ok(GraphState::from_snapshot(&value)?)
}
