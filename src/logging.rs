//! Structured logging setup for the composition kernel.
//!
//! A thin `tracing-subscriber` configuration layer, independent of the
//! composition model itself: `container.rs`, `builder.rs`, and
//! `transversal.rs` emit `tracing::debug!`/`trace!` events at their own
//! module boundaries (registration, resolution, hook dispatch, advice
//! installation) under the `"assemblage"` target; this module only
//! wires up a subscriber for them.
//!
//! # Example
//!
//! ```rust,ignore
//! use assemblage::logging;
//!
//! logging::init(); // JSON if `logging-json`, pretty if `logging-pretty`
//!
//! logging::builder()
//!     .with_level(tracing::Level::DEBUG)
//!     .pretty()
//!     .init();
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

/// Output shape for the fallback subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging, for aggregation by log-shipping tools.
    #[default]
    Json,
    /// Human-readable, multi-line output, for local development.
    Pretty,
}

/// Configures and installs a `tracing-subscriber` for the `"assemblage"` target.
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum level events are emitted at.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// JSON structured output.
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Pretty, human-readable output.
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Install this configuration as the process-wide subscriber.
    ///
    /// Requires `logging-json` or `logging-pretty`; falls back to a
    /// compact formatter if the requested format's feature isn't on.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(format!("assemblage={}", self.level));

        match self.format {
            LogFormat::Json => {
                #[cfg(feature = "logging-json")]
                {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json().with_target(true))
                        .init();
                }
                #[cfg(not(feature = "logging-json"))]
                {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().with_target(true))
                        .init();
                }
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty().with_target(true))
                    .init();
            }
        }
    }

    /// No-op: neither subscriber feature is enabled.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// A fresh [`LoggingBuilder`] with the crate's defaults.
#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Installs a subscriber in whichever format is compiled in: JSON if
/// `logging-json`, otherwise pretty if `logging-pretty`.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init() {
    #[cfg(feature = "logging-json")]
    {
        init_json();
    }
    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    {
        init_pretty();
    }
}

#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init() {}

/// Installs a JSON subscriber at `DEBUG`.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_json() {
    builder().json().with_level(Level::DEBUG).init();
}

#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_json() {}

/// Installs a pretty subscriber at `DEBUG`.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_pretty() {
    builder().pretty().with_level(Level::DEBUG).init();
}

#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_pretty() {}
