//! Follow SRT subtitles along an audio recording.
//!
//! [`parser::parse`] turns subtitle text into a [`CaptionTrack`], and
//! [`resolver::resolve_active`] finds the cue active at a playback position.
//! Both are pure functions. [`player::Player`] holds the state of a review
//! session and calls them whenever a file is loaded or the position moves.

pub mod error;
pub mod format;
pub mod parser;
pub mod player;
pub mod resolver;
pub mod srt;

pub use error::SyncError;
pub use format::{format_time, format_timestamp};
pub use parser::{parse, parse_with_diagnostics};
pub use resolver::resolve_active;
pub use srt::{CaptionEntry, CaptionTrack};
