//! Session configuration.

use tracing::warn;
use waterbridge_native::DEFAULT_PLACEHOLDER_LABEL;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "WATERBRIDGE_LOG";
/// Environment variable toggling identical-payload suppression.
pub const SKIP_IDENTICAL_ENV: &str = "WATERBRIDGE_SKIP_IDENTICAL";
/// Environment variable holding the placeholder caption.
pub const PLACEHOLDER_ENV: &str = "WATERBRIDGE_PLACEHOLDER";

const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration shared by a host session and its target runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    log_filter: String,
    skip_identical_payloads: bool,
    placeholder_label: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            skip_identical_payloads: true,
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Reads the configuration from the environment.
    ///
    /// Unset variables keep their defaults. Values that fail to parse are reported and
    /// ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_ENV).filter(|filter| !filter.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(raw) = lookup(SKIP_IDENTICAL_ENV) {
            match parse_flag(&raw) {
                Some(flag) => config.skip_identical_payloads = flag,
                None => warn!(
                    variable = SKIP_IDENTICAL_ENV,
                    value = %raw,
                    "expected a boolean, keeping default"
                ),
            }
        }
        if let Some(label) = lookup(PLACEHOLDER_ENV).filter(|label| !label.is_empty()) {
            config.placeholder_label = label;
        }
        config
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Enables or disables identical-payload suppression.
    #[must_use]
    pub const fn with_skip_identical_payloads(mut self, skip: bool) -> Self {
        self.skip_identical_payloads = skip;
        self
    }

    /// Sets the caption of the diagnostic placeholder.
    #[must_use]
    pub fn with_placeholder_label(mut self, label: impl Into<String>) -> Self {
        self.placeholder_label = label.into();
        self
    }

    /// Log filter directive.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Whether a payload identical to the last one sent is suppressed.
    #[must_use]
    pub const fn skip_identical_payloads(&self) -> bool {
        self.skip_identical_payloads
    }

    /// Caption of the diagnostic placeholder.
    #[must_use]
    pub const fn placeholder_label(&self) -> &str {
        self.placeholder_label.as_str()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = BridgeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.log_filter(), "info");
        assert!(config.skip_identical_payloads());
        assert_eq!(config.placeholder_label(), "Unable to render view");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[
            (LOG_ENV, "waterbridge=trace"),
            (SKIP_IDENTICAL_ENV, "off"),
            (PLACEHOLDER_ENV, "Broken view"),
        ]));
        assert_eq!(config.log_filter(), "waterbridge=trace");
        assert!(!config.skip_identical_payloads());
        assert_eq!(config.placeholder_label(), "Broken view");
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[(SKIP_IDENTICAL_ENV, "maybe"), (LOG_ENV, "  ")]));
        assert!(config.skip_identical_payloads());
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn builders_chain() {
        let config = BridgeConfig::default()
            .with_log_filter("debug")
            .with_skip_identical_payloads(false)
            .with_placeholder_label("x");
        assert_eq!(config.log_filter(), "debug");
        assert!(!config.skip_identical_payloads());
        assert_eq!(config.placeholder_label(), "x");
    }
}
