use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use intervalo_core::{resolved_duration, SegmentKind};

use super::load_plan;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Show each segment's resolved duration and the session total
    Show {
        /// Plan file (JSON)
        #[arg(long)]
        plan: PathBuf,
    },
}

#[derive(Serialize)]
struct SegmentRow<'a> {
    index: usize,
    label: &'a str,
    kind: SegmentKind,
    duration_secs: u64,
    starts_at_secs: u64,
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Show { plan } => {
            let plan = load_plan(&plan)?;
            let rows: Vec<SegmentRow> = plan
                .segments
                .iter()
                .enumerate()
                .map(|(index, seg)| SegmentRow {
                    index,
                    label: &seg.label,
                    kind: seg.kind,
                    duration_secs: resolved_duration(seg),
                    starts_at_secs: plan.cumulative_secs(index),
                })
                .collect();
            let out = serde_json::json!({
                "name": plan.name,
                "segments": rows,
                "total_secs": plan.total_duration_secs(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
