use miette::{IntoDiagnostic, Result, miette};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Events go to stderr so that stdout only carries the per-file
/// report.
pub fn init(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| miette!("failed to initialize logging: {e}"))
}
