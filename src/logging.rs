use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Per-level log files; each is rotated daily, e.g. logs/info.log.2024-12-22
const LOG_FILES: [(&str, LevelFilter); 4] = [
    ("info.log", LevelFilter::INFO),
    ("warn.log", LevelFilter::WARN),
    ("error.log", LevelFilter::ERROR),
    ("debug.log", LevelFilter::DEBUG),
];

/// Install the global tracing subscriber.
///
/// Level-separated files go to `log_dir`; the console copy goes to stderr
/// so stdout only carries the import report, colored only on a terminal. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init(log_dir: &str) -> io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let file_layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = LOG_FILES
        .iter()
        .map(|(file_name, level)| {
            tracing_subscriber::fmt::layer()
                .with_writer(tracing_appender::rolling::daily(log_dir, file_name))
                .with_ansi(false)
                .with_filter(*level)
                .boxed()
        })
        .collect();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    tracing_subscriber::registry()
        .with(file_layers)
        .with(env_filter)
        .with(console_layer)
        .init();

    Ok(())
}
