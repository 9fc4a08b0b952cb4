//! Runner error types.

use std::fmt;

use boolnet_core::CompileError;
use thiserror::Error;

use crate::sink::SinkError;

/// Invalid run configuration or command-line value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Worker count must be at least one
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// Step bound must be at least one
    #[error("max steps must be at least 1")]
    ZeroMaxSteps,

    /// Clamp argument is not `NAME=0` or `NAME=1`
    #[error("invalid clamp `{arg}`: expected NAME=0 or NAME=1")]
    InvalidClamp {
        /// Argument as given
        arg: String,
    },
}

/// Errors that stop a run before or while scheduling.
///
/// Per-task failures are not errors here: they are reported in the
/// [`RunReport`](crate::RunReport) and the run continues.
#[derive(Debug)]
pub enum RunError {
    /// Invalid configuration.
    ///
    /// Fatal before any work is scheduled.
    Config(ConfigError),

    /// Rule text failed to compile.
    ///
    /// Fatal before any work is scheduled; nothing is written.
    Compile(CompileError),

    /// Worker pool could not be created.
    ThreadPool(String),

    /// Output artifact could not be created or its header written.
    ///
    /// Failures after the header are recorded in the report instead.
    Sink(SinkError),

    /// Reading input or writing the report failed.
    Io(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Compile(err) => write!(f, "compile error: {err}"),
            Self::ThreadPool(msg) => write!(f, "thread pool error: {msg}"),
            Self::Sink(err) => write!(f, "output error: {err}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Compile(err) => Some(err),
            Self::Sink(err) => Some(err),
            Self::ThreadPool(_) | Self::Io(_) => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<CompileError> for RunError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl From<SinkError> for RunError {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for RunError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
