//! Logging setup for strata-di
//!
//! All container events are emitted through `tracing` under the
//! `strata_di` target. This module wires up a subscriber for binaries that
//! do not bring their own: JSON output behind `logging-json`, colorful
//! output behind `logging-pretty`. With neither subscriber feature enabled
//! the init functions compile to no-ops and events go wherever the host
//! application routes them.
//!
//! ```rust,ignore
//! use strata_di::logging;
//!
//! logging::init();
//!
//! // Or configured by hand:
//! logging::builder()
//!     .with_level(tracing::Level::TRACE)
//!     .di_only()
//!     .pretty()
//!     .init();
//! ```

use tracing::Level;

/// Output format for the bundled subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured output (production)
    #[default]
    Json,
    /// Colorful multi-line output (development)
    Pretty,
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level to emit.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Restrict output to a single target.
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Restrict output to container events.
    pub fn di_only(self) -> Self {
        self.with_target_filter("strata_di")
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Install the configured subscriber globally.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = match self.target {
            Some(target) => EnvFilter::new(format!("{}={}", target, self.level)),
            None => EnvFilter::new(self.level.to_string()),
        };
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => registry.with(fmt::layer().with_target(true)).init(),
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_target(true))
                .init(),
        }
    }

    /// No-op without a subscriber feature; events still reach whatever
    /// subscriber the host application installs.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Start a subscriber configuration.
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install a subscriber with default settings: JSON when `logging-json` is
/// enabled, pretty otherwise.
pub fn init() {
    #[cfg(feature = "logging-json")]
    builder().json().init();
    #[cfg(not(feature = "logging-json"))]
    builder().pretty().init();
}

/// Install the JSON subscriber.
pub fn init_json() {
    builder().json().init();
}

/// Install the pretty subscriber.
pub fn init_pretty() {
    builder().pretty().init();
}

/// Install a subscriber filtered to container events only.
pub fn init_di_only() {
    builder().di_only().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert!(builder.target.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::new()
            .with_level(Level::TRACE)
            .pretty()
            .di_only();

        assert_eq!(builder.level, Level::TRACE);
        assert_eq!(builder.format, LogFormat::Pretty);
        assert_eq!(builder.target, Some("strata_di"));
    }
}
