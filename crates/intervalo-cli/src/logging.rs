//! stderr tracing setup; stdout is reserved for JSON output.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "intervalo=info,intervalo_core=info";

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
