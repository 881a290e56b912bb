use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`; when that is unset or unparsable, `default_log_settings`
/// (e.g. `"api_ltx=debug,worker_ltx=debug,core_ltx=info"`) is used instead.
/// Calling it a second time in the same process is a no-op.
pub fn setup_logging(default_log_settings: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_settings.into());
    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}
