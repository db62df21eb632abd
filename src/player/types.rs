//! Player-facing small types and handles.
//!
//! This module defines the command enum driving the engine thread, the
//! repeat mode, and the shared playback snapshot observers read.

use std::fs::File;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Track;
use crate::config::RepeatSetting;

use super::output::AudioError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    Off,
    /// Wrap around to the start of the queue.
    All,
    /// Repeat the current track when it ends.
    One,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Off
    }
}

impl RepeatMode {
    /// The repeat gesture cycles `off -> all -> one -> off`.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl From<RepeatSetting> for RepeatMode {
    fn from(setting: RepeatSetting) -> Self {
        match setting {
            RepeatSetting::Off => Self::Off,
            RepeatSetting::All => Self::All,
            RepeatSetting::One => Self::One,
        }
    }
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Play `track` within the context `queue`, replacing any prior queue.
    Select { track: Track, queue: Vec<Track> },
    /// Toggle pause/resume; never moves the queue.
    TogglePlayPause,
    /// Skip to the next track.
    Next,
    /// Go back, or restart the current track past the double-tap window.
    Prev,
    /// Flip shuffle mode.
    ToggleShuffle,
    /// Advance the repeat cycle.
    CycleRepeat,
    /// Mute, or restore the pre-mute volume.
    ToggleMute,
    /// Immediate seek to a `0..=1` fraction (progress-bar click).
    SeekClick(f64),
    /// Seek handle pressed; progress updates are suppressed until release.
    DragStart,
    /// Seek handle moved to a fraction; visual only, nothing committed.
    DragMove(f64),
    /// Seek handle released: commit the fraction, resume if paused.
    DragRelease(f64),
    /// Tear the session down to defaults.
    Reset,
    /// A loader thread finished acquiring media for `track_id`.
    MediaReady {
        track_id: String,
        media: Result<File, AudioError>,
    },
    /// Stop playback and exit the engine thread.
    Quit,
}

/// Display metadata for the current track.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub track_id: String,
    pub title: String,
    pub artist_name: String,
    pub image_url: String,
    pub duration: Duration,
}

impl From<&Track> for NowPlaying {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist_name: track.artist_name.clone(),
            image_url: track.image_url.clone(),
            duration: track.duration(),
        }
    }
}

/// Runtime playback information shared with observers (transport bars, time
/// labels, catalog views).
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    /// Metadata of the current track, if any.
    pub now_playing: Option<NowPlaying>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Committed progress through the track, `0.0..=1.0`.
    pub progress: f64,
    /// Seek-handle position while a drag is in flight; renderers draw this
    /// instead of `progress` so the handle does not fight playback.
    pub drag: Option<f64>,
    /// Whether playback is currently active.
    pub playing: bool,
    pub shuffled: bool,
    pub repeat: RepeatMode,
    /// Current volume; `0.0` renders as muted.
    pub volume: f32,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            now_playing: None,
            elapsed: Duration::ZERO,
            progress: 0.0,
            drag: None,
            playing: false,
            shuffled: false,
            repeat: RepeatMode::default(),
            volume: 1.0,
        }
    }
}

pub type PlayerHandle = Arc<Mutex<PlayerInfo>>;
