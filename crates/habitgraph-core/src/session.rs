//! Session: the graph plus everything that keeps it durable and current.
//!
//! Canvas callbacks are modelled as [`HabitAction`] values routed by node
//! id through [`Session::dispatch`]. Nodes themselves never hold handlers,
//! so nothing callable ever reaches a snapshot.
//!
//! Every mutation that changes state is auto-saved. Auto-save failures are
//! logged and otherwise swallowed; [`Session::save`] surfaces them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{Result, StorageError};
use crate::graph::{random_position, GraphState};
use crate::habit::{CompletionChange, HabitDetails, HabitStats};
use crate::reset::DailyReset;
use crate::storage::{Config, KvStore, Persistence};

/// A request coming from a habit node on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum HabitAction {
    Rename(String),
    Delete,
    ToggleDone(bool),
    Detail(HabitDetails),
    SwitchColor(String),
}

pub struct Session<S, C> {
    graph: GraphState,
    persistence: Persistence<S>,
    clock: C,
    config: Config,
    reset: DailyReset,
}

impl<S: KvStore, C: Clock> Session<S, C> {
    /// Load the stored graph and run the startup rollover check.
    pub fn open(store: S, clock: C, config: Config) -> Self {
        let persistence = Persistence::new(store);
        let graph = persistence.load();
        let mut session = Self {
            graph,
            persistence,
            clock,
            config,
            reset: DailyReset::new(),
        };
        session.run_daily_reset();
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn stats(&self, id: &str) -> Option<HabitStats> {
        self.graph
            .habit(id)
            .map(|habit| HabitStats::compute(habit, self.today()))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Check for a day rollover. Returns whether one was processed.
    pub fn run_daily_reset(&mut self) -> bool {
        let today = self.today();
        match self.reset.check(&mut self.graph, &mut self.persistence, today) {
            Ok(true) => {
                self.autosave();
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to record processed date");
                true
            }
        }
    }

    pub fn add_habit(&mut self) -> String {
        let position = random_position(&mut rand::thread_rng(), self.config.canvas.placement_extent);
        let id = self.graph.add_habit_node(self.clock.now(), position);
        self.autosave();
        id
    }

    /// Route a canvas action to the habit `id`. Returns whether anything
    /// changed.
    pub fn dispatch(&mut self, id: &str, action: HabitAction) -> bool {
        match action {
            HabitAction::Rename(name) => self.rename(id, &name),
            HabitAction::Delete => self.delete_node(id),
            HabitAction::ToggleDone(checked) => self
                .toggle_completion(id, checked)
                .is_some_and(|c| c.days_changed),
            HabitAction::Detail(details) => self.save_details(id, details).is_some(),
            HabitAction::SwitchColor(color) => self.switch_color(id, &color),
        }
    }

    pub fn toggle_completion(&mut self, id: &str, checked: bool) -> Option<CompletionChange> {
        let change = self.graph.toggle_completion(id, checked, self.today())?;
        self.autosave();
        Some(change)
    }

    pub fn save_details(&mut self, id: &str, details: HabitDetails) -> Option<CompletionChange> {
        let change = self.graph.save_details(id, details, self.today())?;
        self.autosave();
        Some(change)
    }

    pub fn switch_color(&mut self, id: &str, color: &str) -> bool {
        let switched = self.graph.switch_color(id, color);
        if switched {
            self.autosave();
        } else {
            tracing::debug!(%id, %color, "ignored color switch");
        }
        switched
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.graph.rename(id, name);
        if renamed {
            self.autosave();
        }
        renamed
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        let deleted = self.graph.delete_node(id);
        if deleted {
            self.autosave();
        }
        deleted
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Option<String> {
        let id = self.graph.connect(source, target)?;
        self.autosave();
        Some(id)
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let deleted = self.graph.delete_edge(id);
        if deleted {
            self.autosave();
        }
        deleted
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Replace the in-memory graph with what is currently stored.
    ///
    /// Long-running sessions that share the store with other writers call
    /// this before mutating, so an auto-save does not overwrite their work.
    pub fn reload(&mut self) {
        self.graph = self.persistence.load();
    }

    /// Explicit save. Unlike auto-save, failures are returned.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let today = self.today();
        self.persistence.save(&self.graph, today)
    }

    pub fn export(&self) -> Result<String> {
        self.persistence.export(&self.graph, self.clock.now())
    }

    /// Replace the graph with an import payload.
    ///
    /// `confirm` is only consulted when `import.require_confirmation` is
    /// set. On error nothing changes.
    pub fn import<F>(&mut self, payload: &str, confirm: F) -> Result<()>
    where
        F: FnOnce(&GraphState) -> bool,
    {
        let today = self.today();
        let require = self.config.import.require_confirmation;
        self.persistence
            .import(&mut self.graph, payload, today, |incoming| {
                !require || confirm(incoming)
            })?;
        if self.graph.refresh_done_flags(today) > 0 {
            self.autosave();
        }
        Ok(())
    }

    /// Drop all stored data and return to the default graph.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.graph = self.persistence.clear()?;
        Ok(())
    }

    fn autosave(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "auto-save failed");
        }
    }
}
