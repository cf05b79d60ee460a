use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (tracing `EnvFilter` syntax)
pub const LOG_ENV: &str = "VIDBATCH_LOG";

/// Install the global tracing subscriber.
///
/// Logs go to stderr, or to vidbatch.log in the current directory with `dev-logging`.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    #[cfg(feature = "dev-logging")]
    {
        use std::fs::OpenOptions;
        use std::sync::Mutex;

        let log_path = std::env::current_dir()?.join("vidbatch.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    #[cfg(not(feature = "dev-logging"))]
    builder
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
