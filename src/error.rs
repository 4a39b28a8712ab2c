//! Errors the engine can surface, and the typed outcome of a single tick.

use thiserror::Error;

/// An error produced while driving the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// All configured candidate nicknames were rejected by the server.
    #[error("all {0} candidate nicknames were rejected")]
    NicksExhausted(usize),

    /// The remote end closed the connection.
    #[error("remote closed the connection")]
    RemoteClosed,

    /// The connection went unregistered long enough that the watchdog gave
    /// up retrying.
    #[error("registration timed out")]
    PingTimeout,
}

/// `Result` alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// The outcome of a single call to [`crate::engine::Engine::tick`].
#[derive(Debug)]
pub enum TickOutcome {
    /// The tick completed normally; call `tick()` again.
    Continue,
    /// A matched command handler returned a negative status. The engine
    /// is still usable; this is reported for observability, not as a
    /// reason to stop.
    CommandError,
    /// A fatal condition was reached; the caller should stop ticking and
    /// decide whether to reconnect.
    Fatal(EngineError),
}
