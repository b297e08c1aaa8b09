//! Logging setup. Events go to stderr so tables printed on stdout stay clean.
//!
//! `-v` enables debug events for the `fxchart` targets only; dependencies such
//! as reqwest and hyper stay quiet. `RUST_LOG` replaces that default entirely,
//! e.g. `RUST_LOG=fxchart::providers=debug` to see only request URLs.
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "fxchart";

/// Filter used when `RUST_LOG` is not set.
pub fn default_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    Targets::new().with_target(APP_TARGET, level)
}

pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = env_filter.is_none().then(|| default_targets(verbose));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
