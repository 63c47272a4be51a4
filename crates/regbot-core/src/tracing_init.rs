//! Log output for `regbot-server`.
//!
//! Events from the server, the record store and the `tower_http` request
//! trace layer go to stdout, filtered by `RUST_LOG`. Deployments that ship
//! logs to an aggregator run with `--log-json` to get one JSON object per line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "regbot_server=info,regbot_core=info,tower_http=info";

/// Install the process-wide subscriber. Call once, before the store opens.
///
/// `default_filter` applies only when `RUST_LOG` is unset.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
