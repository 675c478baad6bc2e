use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Subcommand;
use habitgraph_core::GraphState;

use super::open_session;

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a JSON export (stdout unless --out is given)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace all data with a JSON export
    Import {
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete all stored data and start over
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;

    match action {
        DataAction::Export { out } => {
            let doc = session.export()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, doc)?;
                    eprintln!("Exported to {}", path.display());
                }
                None => println!("{doc}"),
            }
        }
        DataAction::Import { file, yes } => {
            let payload = std::fs::read_to_string(&file)?;
            session.import(&payload, |incoming: &GraphState| {
                yes || confirm(&format!(
                    "Replace current data with {} nodes and {} edges from {}?",
                    incoming.node_count(),
                    incoming.edges().len(),
                    file.display()
                ))
            })?;
            eprintln!("Imported {}", file.display());
        }
        DataAction::Clear { yes } => {
            if !yes && !confirm("Clear all habit data? This cannot be undone.") {
                return Err("clear cancelled".into());
            }
            session.clear()?;
            eprintln!("Data cleared");
        }
    }
    Ok(())
}
