use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Reasons a ledger operation did not go through.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid Voter ID.")]
    InvalidVoterId,

    #[error("Invalid Voter Name.")]
    InvalidVoterName,

    #[error("Invalid party selection.")]
    InvalidParty(String),

    #[error("Comment too long.")]
    CommentTooLong,

    #[error("Duplicate Voter ID. Only one vote allowed per ID.")]
    DuplicateVoter(String),

    #[error("Ledger storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LedgerError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> Self {
        LedgerError::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    /// True for errors caused by the caller's input; resubmitting with
    /// different input may succeed. Storage failures are not rejections.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::StorageUnavailable { .. })
    }
}
