use std::error::Error;
use std::fmt;

use crate::player::UploadSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The file did not pass the acceptance filter of the slot it was
    /// offered to. Nothing was changed.
    Rejected { slot: UploadSlot, name: String },
    /// Playback control was requested before both files were loaded.
    NotReady,
}

impl Error for SyncError {}

impl fmt::Display for SyncError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncError::Rejected { slot, name } => {
                write!(fmt, "'{}' is not a valid {} file", name, slot)
            }
            SyncError::NotReady => {
                write!(fmt, "Both an audio file and a subtitle file must be loaded")
            }
        }
    }
}
