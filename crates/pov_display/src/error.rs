//! # Display Error Types
//!
//! Everything that can fail before the first tick. Once the pipeline runs,
//! nothing is an error: bad coordinates are ignored, overflowing queues drop
//! their oldest event, late ticks are counted.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or starting the pipeline.
#[derive(Error, Debug)]
pub enum PovError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::PovConfig`].
    #[error("invalid config syntax: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config parsed but a value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scene name did not match any registered scene.
    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// A pipeline thread could not be spawned.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread role.
        name: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The presenter failed and stopped the pipeline.
    #[error("presenter stopped: {0}")]
    Presenter(String),

    /// A pipeline thread panicked.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Result type for display operations.
pub type PovResult<T> = Result<T, PovError>;
