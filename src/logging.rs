//! Tracing subscriber installation.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{BridgeConfig, LOG_ENV};

static INSTALLED: Once = Once::new();

/// Installs a `fmt` subscriber and routes panics through tracing.
///
/// The filter comes from `WATERBRIDGE_LOG` when it parses, otherwise from the config.
/// Only the first call has any effect. If the application already installed a global
/// subscriber, that one is kept.
pub fn install(config: &BridgeConfig) {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(config.log_filter()))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .without_time()
            .with_target(false)
            .try_init()
            .is_ok();

        std::panic::set_hook(Box::new(tracing_panic::panic_hook));
        if installed {
            tracing::debug!("tracing subscriber installed");
        }
    });
}
