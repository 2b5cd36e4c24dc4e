use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout belongs to the LSP connection.
///
/// `level` takes precedence over `RUST_LOG`, which defaults to `warn`.
pub(crate) fn init(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::format_err!("failed to install logger: {error}"))
}
