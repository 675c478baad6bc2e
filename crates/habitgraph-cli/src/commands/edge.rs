use clap::Subcommand;
use serde_json::json;

use super::{open_session, print_changed};

#[derive(Subcommand)]
pub enum EdgeAction {
    /// Connect two nodes
    Connect {
        source: String,
        target: String,
    },
    /// Delete an edge by id
    Delete {
        id: String,
    },
    /// List edges
    List,
}

pub fn run(action: EdgeAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;

    match action {
        EdgeAction::Connect { source, target } => {
            let id = session.connect(&source, &target);
            print_changed(id.is_some(), json!({ "id": id, "source": source, "target": target }))?;
        }
        EdgeAction::Delete { id } => {
            let changed = session.delete_edge(&id);
            print_changed(changed, json!({ "id": id }))?;
        }
        EdgeAction::List => {
            println!("{}", serde_json::to_string_pretty(session.graph().edges())?);
        }
    }
    Ok(())
}
