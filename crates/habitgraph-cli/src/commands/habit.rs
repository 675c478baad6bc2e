use chrono::NaiveDate;
use clap::Subcommand;
use habitgraph_core::clock::day_key;
use habitgraph_core::session::HabitAction as CanvasAction;
use habitgraph_core::HabitDetails;
use serde::Serialize;
use serde_json::json;

use super::{open_session, print_changed};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit node
    Add {
        /// Name for the habit (defaults to NODE_<n>)
        #[arg(long)]
        name: Option<String>,
    },
    /// List habit nodes
    List,
    /// Print a habit with its statistics
    Show {
        id: String,
    },
    /// Mark today as done
    Done {
        id: String,
    },
    /// Un-mark today
    Undo {
        id: String,
    },
    /// Switch to an unlocked reward color
    Color {
        id: String,
        color: String,
    },
    /// Rename a habit
    Rename {
        id: String,
        name: String,
    },
    /// Edit habit details
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Self-optimization record
        #[arg(long)]
        optimization: Option<String>,
        #[arg(long)]
        target: Option<u64>,
        /// Mark a past day (YYYY-MM-DD); repeatable
        #[arg(long = "add-day", value_parser = parse_day)]
        add_days: Vec<NaiveDate>,
        /// Un-mark a past day (YYYY-MM-DD); repeatable
        #[arg(long = "remove-day", value_parser = parse_day)]
        remove_days: Vec<NaiveDate>,
    },
    /// Delete a habit node and its edges
    Delete {
        id: String,
    },
}

#[derive(Serialize)]
struct HabitRow<'a> {
    id: &'a str,
    name: &'a str,
    done_today: bool,
    completed_days: usize,
    color: &'a str,
    unlocked: usize,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    habitgraph_core::clock::parse_day_key(s).ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;

    match action {
        HabitAction::Add { name } => {
            let id = session.add_habit();
            if let Some(name) = name {
                session.rename(&id, &name);
            }
            let habit = session.graph().habit(&id);
            println!("{}", serde_json::to_string_pretty(&json!({ "id": id, "habit": habit }))?);
        }
        HabitAction::List => {
            let rows: Vec<HabitRow> = session
                .graph()
                .habits()
                .map(|(id, h)| HabitRow {
                    id,
                    name: &h.habit_name,
                    done_today: h.is_done,
                    completed_days: h.completed_count(),
                    color: &h.color,
                    unlocked: h.unlocked_colors.len(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        HabitAction::Show { id } => {
            let habit = session
                .graph()
                .habit(&id)
                .ok_or_else(|| format!("no habit with id '{id}'"))?;
            let stats = session.stats(&id);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "id": id, "habit": habit, "stats": stats }))?
            );
        }
        HabitAction::Done { id } => {
            let change = session.toggle_completion(&id, true);
            report_completion(&session, &id, change)?;
        }
        HabitAction::Undo { id } => {
            let change = session.toggle_completion(&id, false);
            report_completion(&session, &id, change)?;
        }
        HabitAction::Color { id, color } => {
            let changed = session.dispatch(&id, CanvasAction::SwitchColor(color));
            let current = session.graph().habit(&id).map(|h| h.color.clone());
            print_changed(changed, json!({ "id": id, "color": current }))?;
        }
        HabitAction::Rename { id, name } => {
            let changed = session.dispatch(&id, CanvasAction::Rename(name));
            print_changed(changed, json!({ "id": id }))?;
        }
        HabitAction::Edit {
            id,
            name,
            notes,
            optimization,
            target,
            add_days,
            remove_days,
        } => {
            let Some(habit) = session.graph().habit(&id) else {
                return print_changed(false, json!({ "id": id }));
            };
            let mut details = HabitDetails::from(habit);
            if let Some(name) = name {
                details.habit_name = name;
            }
            if let Some(notes) = notes {
                details.notes = notes;
            }
            if let Some(optimization) = optimization {
                details.optimization_record = optimization;
            }
            if let Some(target) = target {
                details.target_count = target;
            }
            for day in add_days {
                details.completed_days.insert(day_key(day));
            }
            for day in remove_days {
                details.completed_days.remove(&day_key(day));
            }
            let change = session.save_details(&id, details);
            report_completion(&session, &id, change)?;
        }
        HabitAction::Delete { id } => {
            let changed = session.dispatch(&id, CanvasAction::Delete);
            print_changed(changed, json!({ "id": id }))?;
        }
    }
    Ok(())
}

fn report_completion(
    session: &super::CliSession,
    id: &str,
    change: Option<habitgraph_core::CompletionChange>,
) -> Result<(), Box<dyn std::error::Error>> {
    let habit = session.graph().habit(id);
    let changed = change.as_ref().is_some_and(|c| c.days_changed);
    print_changed(changed, json!({ "id": id, "change": change, "habit": habit }))
}
