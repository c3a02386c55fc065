pub mod alerts;
pub mod config;
pub mod plan;
pub mod run;

use std::path::Path;

use intervalo_core::{Config, SessionPlan};

/// Read a plan handed over by the authoring layer as JSON.
pub fn load_plan(path: &Path) -> Result<SessionPlan, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read plan {}: {e}", path.display()))?;
    Ok(SessionPlan::from_json(&json)?)
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    })
}
