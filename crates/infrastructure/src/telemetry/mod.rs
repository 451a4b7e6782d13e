//! Logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! human-readable or JSON output on stderr.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_tracing};
