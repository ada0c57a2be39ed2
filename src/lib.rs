// Hearing Check Core - hearing self-test engine
// Tone synthesis, frequency sweep and stereo discrimination state machines

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod context;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use config::AppConfig;
pub use context::AppContext;
pub use session::{HearingLevel, StepOutcome, TestKind, TestPhase, TestResult};

/// Install a stderr `tracing` subscriber at the given level.
///
/// `log` records from the error helpers are picked up by the subscriber's
/// log bridge. Safe to call more than once; later calls are ignored.
pub fn init_logging(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
