//! Error types for the demo binary.
//!
//! [`AppError`] wraps every failure `main` can run into, so startup and the
//! run itself propagate with `?`.

/// Top-level error for the demo binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading or saving failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: umbra_core::config::ConfigError,
    },

    /// Module registration failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: umbra_core::EngineError,
    },

    /// The frame loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: umbra_core::runner::RunnerError,
    },

    /// The terminal could not be set up or restored.
    #[error("terminal error: {source}")]
    Terminal {
        /// The underlying frontend error.
        #[from]
        source: umbra_core::runner::FrontendError,
    },

    /// The log file could not be created.
    #[error("log file error: {source}")]
    LogFile {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
