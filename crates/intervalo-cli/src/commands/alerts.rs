use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;

use intervalo_core::{compute_alerts, resolved_duration};

use super::{load_config, load_plan};

#[derive(Args)]
pub struct AlertsArgs {
    /// Plan file (JSON)
    #[arg(long)]
    plan: PathBuf,
    /// Segment the session is currently in
    #[arg(long, default_value = "0")]
    index: usize,
    /// Seconds left in that segment (defaults to its full duration)
    #[arg(long)]
    remaining: Option<u64>,
    /// Override the "almost done" threshold in seconds
    #[arg(long)]
    warning: Option<u64>,
}

pub fn run(args: AlertsArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(&args.plan)?;
    let segment = plan.segment(args.index).ok_or_else(|| {
        format!(
            "segment index {} out of range (plan has {} segments)",
            args.index,
            plan.len()
        )
    })?;

    let full = resolved_duration(segment);
    let remaining = args.remaining.unwrap_or(full);
    if remaining == 0 || remaining > full {
        return Err(format!("remaining must be between 1 and {full} for '{}'", segment.label).into());
    }

    let warning = match args.warning {
        Some(w) => w,
        None => load_config(config_path)?.session.warning_seconds_before_end,
    };

    let now = Utc::now();
    let alerts: Vec<_> = compute_alerts(&plan, args.index, remaining, warning, now)
        .into_iter()
        .map(|alert| {
            serde_json::json!({
                "in_secs": (alert.fire_at - now).num_seconds(),
                "message": alert.message(),
                "alert": alert,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&alerts)?);
    Ok(())
}
