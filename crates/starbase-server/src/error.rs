//! Error types for the server binary.
//!
//! [`ServerError`] wraps the failures of the startup and shutdown helpers
//! so each can propagate with `?`.

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: starbase_core::config::ConfigError,
    },

    /// Galaxy generation failed.
    #[error("generation error: {source}")]
    Generation {
        /// The underlying generation error.
        #[from]
        source: starbase_core::generation::GenerationError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A tick worker ended on its own with an error.
    #[error("{kind} ticker failed: {message}")]
    WorkerFailed {
        /// The worker's station category.
        kind: starbase_types::StationKind,
        /// The error the worker reported.
        message: String,
    },

    /// The blocking shutdown task panicked or was cancelled.
    #[error("shutdown task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
