pub mod config;
pub mod data;
pub mod edge;
pub mod habit;
pub mod watch;

use habitgraph_core::{Config, Database, Session, SystemClock};

pub type CliSession = Session<Database, SystemClock>;

/// Open the on-disk store with the user's configuration.
pub fn open_session() -> Result<CliSession, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok(Session::open(db, SystemClock, config))
}

/// Print `{"changed": <bool>}` plus optional extra fields.
pub fn print_changed(changed: bool, extra: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = serde_json::json!({ "changed": changed });
    if let (Some(out), serde_json::Value::Object(extra)) = (out.as_object_mut(), extra) {
        out.extend(extra);
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
