use crate::error::SyncError;
use crate::parser::{self, Diagnostic};
use crate::resolver::resolve_active;
use crate::srt::{CaptionEntry, CaptionTrack};

use std::fmt;

use tracing::{debug, info, trace};

/// The two places a file can be dropped or uploaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadSlot {
    Audio,
    Subtitles,
}

impl UploadSlot {
    /// Acceptance filter: audio by MIME type, subtitles by `.srt` name.
    /// Both checks are case-sensitive.
    pub fn accepts(&self, file: &IncomingFile) -> bool {
        match self {
            UploadSlot::Audio => file.mime_type.starts_with("audio/"),
            UploadSlot::Subtitles => file.name.ends_with(".srt"),
        }
    }
}

impl fmt::Display for UploadSlot {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UploadSlot::Audio => write!(fmt, "audio"),
            UploadSlot::Subtitles => write!(fmt, "subtitle"),
        }
    }
}

/// A file handed over by whatever lets the user pick files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// An accepted audio file. The bytes are passed through to the playback
/// element untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// A parsed subtitle file together with the cue active at the player's
/// current position. Always replaced as a whole.
#[derive(Debug, Clone)]
pub struct LoadedSubtitles {
    name: String,
    track: CaptionTrack,
    diagnostics: Vec<Diagnostic>,
    active: Option<usize>,
}

impl LoadedSubtitles {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn track(&self) -> &CaptionTrack {
        &self.track
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }
}

/// Whether a file is currently being dragged over each slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    pub audio: bool,
    pub subtitles: bool,
}

impl DragState {
    pub fn is_over(&self, slot: UploadSlot) -> bool {
        match slot {
            UploadSlot::Audio => self.audio,
            UploadSlot::Subtitles => self.subtitles,
        }
    }

    fn set(&mut self, slot: UploadSlot, over: bool) {
        match slot {
            UploadSlot::Audio => self.audio = over,
            UploadSlot::Subtitles => self.subtitles = over,
        }
    }
}

/// The media element that owns the playback clock.
pub trait PlaybackElement {
    fn load(&mut self, source: &AudioSource);
    fn unload(&mut self);
    /// Current position in seconds.
    fn current_time(&self) -> f64;
    /// Length of the loaded audio in seconds, once known.
    fn duration(&self) -> Option<f64>;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, time: f64);
}

/// Displays the track and highlights the active cue.
pub trait Renderer {
    fn render(&mut self, track: &CaptionTrack, active: Option<usize>);
}

/// Application state of one review session.
///
/// Every user action and media event has its own transition. Transitions
/// that can move the playback position return `true` when the active cue
/// changed as a result, which is the renderer's cue to redraw.
#[derive(Debug)]
pub struct Player<P> {
    playback: P,
    audio: Option<AudioSource>,
    subtitles: Option<LoadedSubtitles>,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    drag: DragState,
}

impl<P: PlaybackElement> Player<P> {
    pub fn new(playback: P) -> Self {
        Self {
            playback,
            audio: None,
            subtitles: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            drag: DragState::default(),
        }
    }

    /// Playback controls are only available once both files are loaded.
    pub fn is_ready(&self) -> bool {
        self.audio.is_some() && self.subtitles.is_some()
    }

    pub fn drag_over(&mut self, slot: UploadSlot) {
        self.drag.set(slot, true);
    }

    pub fn drag_leave(&mut self, slot: UploadSlot) {
        self.drag.set(slot, false);
    }

    /// Only the first dropped file is considered; `None` when the drop
    /// carried no file at all.
    pub fn drop_file(
        &mut self,
        slot: UploadSlot,
        file: Option<IncomingFile>,
    ) -> Result<(), SyncError> {
        self.drag.set(slot, false);
        match file {
            Some(file) => self.upload(slot, file),
            None => Ok(()),
        }
    }

    /// Load `file` into `slot`, replacing whatever was there. A file the
    /// slot does not accept leaves the session untouched.
    pub fn upload(&mut self, slot: UploadSlot, file: IncomingFile) -> Result<(), SyncError> {
        if !slot.accepts(&file) {
            debug!(%slot, name = %file.name, mime_type = %file.mime_type, "Rejected file");
            return Err(SyncError::Rejected {
                slot,
                name: file.name,
            });
        }

        match slot {
            UploadSlot::Audio => self.load_audio(file),
            UploadSlot::Subtitles => self.load_subtitles(file),
        }
        Ok(())
    }

    fn load_audio(&mut self, file: IncomingFile) {
        let source = AudioSource {
            name: file.name,
            mime_type: file.mime_type,
            data: file.data,
        };
        self.playback.load(&source);
        info!(name = %source.name, bytes = source.data.len(), "Loaded audio");
        self.audio = Some(source);
    }

    fn load_subtitles(&mut self, file: IncomingFile) {
        let text = String::from_utf8_lossy(&file.data);
        let outcome = parser::parse_with_diagnostics(&text);
        let active = resolve_active(&outcome.track, self.current_time);
        info!(
            name = %file.name,
            cues = outcome.track.len(),
            dropped = outcome.diagnostics.iter().filter(|d| d.problem.is_dropped()).count(),
            "Loaded subtitles"
        );

        self.subtitles = Some(LoadedSubtitles {
            name: file.name,
            track: outcome.track,
            diagnostics: outcome.diagnostics,
            active,
        });
    }

    /// Forget the audio file and reset the playback position.
    pub fn replace_audio(&mut self) -> bool {
        if self.audio.take().is_some() {
            self.playback.unload();
        }
        self.is_playing = false;
        self.duration = 0.0;
        self.set_current_time(0.0)
    }

    /// Forget the subtitle file, its track and the active cue.
    pub fn replace_subtitles(&mut self) {
        self.subtitles = None;
    }

    pub fn toggle_play(&mut self) -> Result<(), SyncError> {
        if !self.is_ready() {
            return Err(SyncError::NotReady);
        }
        if self.is_playing {
            self.playback.pause();
        } else {
            self.playback.play();
        }
        self.is_playing = !self.is_playing;
        Ok(())
    }

    pub fn on_play(&mut self) {
        self.is_playing = true;
    }

    pub fn on_pause(&mut self) {
        self.is_playing = false;
    }

    /// Sample the playback element's clock.
    pub fn time_update(&mut self) -> bool {
        let time = self.playback.current_time();
        self.set_current_time(time)
    }

    /// Sample the playback element's duration.
    pub fn loaded_metadata(&mut self) {
        if let Some(duration) = self.playback.duration() {
            self.duration = duration;
        }
    }

    /// Jump to `time`. The new position takes effect immediately rather than
    /// on the element's next time update.
    pub fn seek(&mut self, time: f64) -> Result<bool, SyncError> {
        if !self.is_ready() {
            return Err(SyncError::NotReady);
        }
        self.playback.seek(time);
        Ok(self.set_current_time(time))
    }

    fn set_current_time(&mut self, time: f64) -> bool {
        if time == self.current_time {
            return false;
        }
        self.current_time = time;

        let subtitles = match self.subtitles.as_mut() {
            Some(subtitles) => subtitles,
            None => return false,
        };
        let active = resolve_active(&subtitles.track, time);
        if active == subtitles.active {
            return false;
        }
        trace!(time, from = ?subtitles.active, to = ?active, "Active cue changed");
        subtitles.active = active;
        true
    }

    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        match &self.subtitles {
            Some(subtitles) => renderer.render(&subtitles.track, subtitles.active),
            None => renderer.render(&CaptionTrack::default(), None),
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.subtitles.as_ref().and_then(|s| s.active)
    }

    pub fn active_caption(&self) -> Option<&CaptionEntry> {
        let subtitles = self.subtitles.as_ref()?;
        subtitles.track.get(subtitles.active?)
    }

    pub fn track(&self) -> Option<&CaptionTrack> {
        self.subtitles.as_ref().map(|s| &s.track)
    }

    pub fn caption_count(&self) -> usize {
        self.track().map_or(0, CaptionTrack::len)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn audio(&self) -> Option<&AudioSource> {
        self.audio.as_ref()
    }

    pub fn subtitles(&self) -> Option<&LoadedSubtitles> {
        self.subtitles.as_ref()
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }
}

/// A playback element without audio output, advanced by hand.
///
/// Reports the configured duration for anything loaded into it and stops
/// at the end of it. Durations that are negative or not finite are ignored,
/// and the position never leaves `0..=duration`.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    length: Option<f64>,
    loaded: bool,
    position: f64,
    playing: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(length: f64) -> Self {
        Self {
            length: valid_length(length),
            ..Self::default()
        }
    }

    /// Duration reported for whatever is loaded next, or right away if
    /// something is already loaded.
    pub fn set_duration(&mut self, length: f64) {
        if let Some(length) = valid_length(length) {
            self.length = Some(length);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Move the clock forward by `delta` seconds if playing. Returns whether
    /// the clock is still playing afterwards.
    pub fn advance(&mut self, delta: f64) -> bool {
        if !self.playing {
            return false;
        }
        if !(delta.is_finite() && delta >= 0.0) {
            return true;
        }
        self.position += delta;
        if let Some(length) = self.duration() {
            if self.position >= length {
                self.position = length;
                self.playing = false;
            }
        }
        self.playing
    }
}

impl PlaybackElement for ManualClock {
    fn load(&mut self, _source: &AudioSource) {
        self.loaded = true;
        self.position = 0.0;
        self.playing = false;
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.position = 0.0;
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        if self.loaded {
            self.length
        } else {
            None
        }
    }

    fn play(&mut self) {
        if self.loaded {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, time: f64) {
        let upper = self.duration().unwrap_or(f64::INFINITY);
        let time = if time.is_nan() { self.position } else { time };
        self.position = time.min(upper).max(0.0);
    }
}

fn valid_length(length: f64) -> Option<f64> {
    if length.is_finite() && length >= 0.0 {
        Some(length)
    } else {
        None
    }
}
