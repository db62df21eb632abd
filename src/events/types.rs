use crate::catalog::Track;

/// Everything that travels on the [`super::Bus`].
#[derive(Debug, Clone)]
pub enum Event {
    /// A catalog view requests playback of `track` within context `queue`.
    TrackSelected { track: Track, queue: Vec<Track> },
    /// Full teardown of the playback session to defaults.
    ResetPlayer,
    /// The engine's current track changed; views toggle their "currently
    /// playing" marker on cards with a matching id.
    NowPlayingChanged { track_id: String },
}

impl Event {
    /// Stable wire-style name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackSelected { .. } => "track-selected",
            Self::ResetPlayer => "reset-player",
            Self::NowPlayingChanged { .. } => "now-playing-changed",
        }
    }
}
