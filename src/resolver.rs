use crate::srt::CaptionTrack;

/// Index of the cue active at `time`, or `None` when no cue covers it.
///
/// Cues are scanned in file order and the first one whose interval contains
/// `time` (bounds inclusive) wins, so where cues overlap the one written
/// earlier in the file takes precedence. The track does not need to be
/// sorted.
pub fn resolve_active(track: &CaptionTrack, time: f64) -> Option<usize> {
    track.iter().position(|entry| entry.contains(time))
}
