use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the stderr subscriber. `RUST_LOG` wins over the default level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false),
    );

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
