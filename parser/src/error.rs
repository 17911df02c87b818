use std::path::PathBuf;

use thiserror::Error;

use crate::extractor::EventKind;
use crate::types::PlayerName;

/// Unrecoverable failures. Any of these aborts the run before a report is produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open session log {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read session log after line {line}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report")]
    Write(#[from] std::io::Error),
}

/// Recoverable inconsistencies found while absorbing events.
///
/// The derived per-player update that needed the missing record is dropped; global
/// kill and suicide history is still kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("got {event} event for an unknown player: {name}")]
    UnknownPlayer { event: EventKind, name: PlayerName },
}

pub type Result<T> = std::result::Result<T, Error>;
