//! Errors produced by a map task.
//!
//! Every failure is fatal to the invocation it happens in. The variants carry
//! the stage that failed and the resource involved so the caller (usually a
//! scheduler) can decide whether re-dispatching the task makes sense.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::mapreducer::TransformError;

pub type Result<T> = std::result::Result<T, MapError>;

/// The part of a map task that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Load,
    Transform,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Setup => "setup",
            Stage::Load => "load",
            Stage::Transform => "transform",
            Stage::Write => "write",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("load: input partition {} unavailable: {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transform: map function failed on partition {partition}: {source}")]
    TransformFailure {
        partition: String,
        #[source]
        source: TransformError,
    },

    #[error("write: intermediate output {} unavailable: {source}", .path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write: sharder put key {key:?} in shard {shard}, but there are only {reducers} shards")]
    InvalidShard {
        key: String,
        shard: usize,
        reducers: usize,
    },

    #[error("setup: invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("setup: configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl MapError {
    pub fn stage(&self) -> Stage {
        match self {
            MapError::InputUnavailable { .. } => Stage::Load,
            MapError::TransformFailure { .. } => Stage::Transform,
            MapError::OutputUnavailable { .. } | MapError::InvalidShard { .. } => Stage::Write,
            MapError::InvalidParameters(_) | MapError::Config(_) => Stage::Setup,
        }
    }

    /// Whether re-running the same map task could succeed. Only I/O failures
    /// qualify; a failing map function or a broken sharder fails the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self,
                 MapError::InputUnavailable { .. } | MapError::OutputUnavailable { .. })
    }

    pub(crate) fn output<P: Into<PathBuf>>(path: P, source: io::Error) -> MapError {
        MapError::OutputUnavailable {
            path: path.into(),
            source,
        }
    }
}
