use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a process-wide `tracing` subscriber. The pipeline never calls
/// this itself — logging setup is an external-collaborator concern — but
/// embedding applications and this workspace's own tests/examples can use
/// it instead of hand-rolling a subscriber.
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
