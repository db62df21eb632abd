use std::time::Duration;

use serde::Deserialize;

/// A playable track as the service describes it. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    /// Unique id; queue membership and now-playing markers compare by it.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist_name: String,
    /// Cover art location; may be empty, renderers substitute a placeholder.
    #[serde(default)]
    pub image_url: String,
    /// Directly playable media location.
    pub audio_url: String,
    /// Whole seconds, as served by the catalog.
    #[serde(default)]
    pub duration: u64,
}

impl Track {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    /// `M:SS` text for time labels.
    pub fn duration_display(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format whole seconds as `M:SS`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
