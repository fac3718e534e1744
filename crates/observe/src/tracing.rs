use {
    std::sync::Once,
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{EnvFilter, fmt, prelude::*},
};

/// Output format of the installed subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Initializes the global tracing subscriber.
///
/// `env_filter` uses the `RUST_LOG` syntax, e.g. `warn,staking_pool=debug`.
/// Only the first call has an effect so tests and binaries can both call it.
pub fn initialize(env_filter: &str, format: Format) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| set_tracing_subscriber(env_filter, format));
}

fn set_tracing_subscriber(env_filter: &str, format: Format) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(env_filter);

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        Format::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        Format::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };
    if let Err(err) = result {
        eprintln!("tracing subscriber already installed: {err}");
    }
}
