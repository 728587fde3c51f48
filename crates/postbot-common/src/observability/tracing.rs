use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::Config;

pub fn init_tracer(service_name: String, service_version: String, config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(&config.log_level));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.");

    tracing::info!(service.name = %service_name, service.version = %service_version, "tracing initialized");
}
