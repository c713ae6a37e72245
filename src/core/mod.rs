pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use telemetry::{EconomyObserver, NullObserver, RecordingObserver, TracingObserver};
