use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log lines go while the process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Headless runs log to stderr
    Stderr,
    /// The terminal UI owns the screen, so logs go to a file
    File(&'a Path),
}

const fn default_directives(debug: bool) -> &'static str {
    if debug {
        "oiv_dashboard=debug,oiv_core=debug,sqlx=warn"
    } else {
        "oiv_dashboard=info,oiv_core=info,sqlx=warn"
    }
}

/// Installs the global tracing subscriber; `RUST_LOG` wins over the defaults
pub fn init_tracing(debug: bool, target: LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    installed.map_err(|e| eyre!("Failed to install tracing subscriber: {e}"))
}
