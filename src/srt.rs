use std::ops::Index;
use std::slice;

/// A single cue: a block of caption text shown between two points in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    /// The index line as written in the file. Kept for display only: it is
    /// neither required to be contiguous nor unique. `None` when the index
    /// line does not start with an integer.
    pub sequence_number: Option<i64>,
    /// Seconds since the start of the track.
    pub start_time: f64,
    /// Seconds since the start of the track.
    pub end_time: f64,
    /// Caption body, line breaks preserved.
    pub text: String,
}

impl CaptionEntry {
    /// Whether `time` falls inside this cue. Both bounds are inclusive.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }
}

/// The cues of one subtitle file, in the order they appear in the file.
///
/// A track is never re-sorted and cannot be modified after it has been
/// parsed; loading another file produces a new track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionTrack {
    entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    pub(crate) fn new(entries: Vec<CaptionEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CaptionEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, CaptionEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    /// Latest end time of any cue, or `None` for an empty track.
    pub fn end_time(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.end_time)
            .fold(None, |acc, t| Some(acc.map_or(t, |a: f64| a.max(t))))
    }

    /// Index of the cue active at `time`. See [`crate::resolver::resolve_active`].
    pub fn active_at(&self, time: f64) -> Option<usize> {
        crate::resolver::resolve_active(self, time)
    }
}

impl Index<usize> for CaptionTrack {
    type Output = CaptionEntry;

    fn index(&self, index: usize) -> &CaptionEntry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a CaptionTrack {
    type Item = &'a CaptionEntry;
    type IntoIter = slice::Iter<'a, CaptionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
