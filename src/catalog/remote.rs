use log::debug;
use serde_json::Value;

use crate::api::{ApiClient, HttpError};
use crate::events::{Bus, Event};

use super::model::Track;

/// Catalog source backed by the streaming service's REST API.
///
/// Each fetch returns the ordered sequence a view would render; `select`
/// turns a pick from such a sequence into a `track-selected` event for the
/// playback engine.
pub struct RemoteCatalog<C> {
    client: C,
    bus: Bus,
}

impl<C: ApiClient> RemoteCatalog<C> {
    pub fn new(client: C, bus: Bus) -> Self {
        Self { client, bus }
    }

    /// Today's hits: the trending tracks list.
    pub fn trending_tracks(&self, limit: usize) -> Result<Vec<Track>, HttpError> {
        let body = self.client.get(&format!("tracks/trending?limit={limit}"))?;
        tracks_from(body)
    }

    pub fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, HttpError> {
        let body = self.client.get(&format!("albums/{album_id}/tracks"))?;
        tracks_from(body)
    }

    pub fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, HttpError> {
        let body = self.client.get(&format!("playlists/{playlist_id}/tracks"))?;
        tracks_from(body)
    }

    /// Request playback of `track` within the context `queue` it was picked
    /// from.
    pub fn select(&self, track: &Track, queue: &[Track]) {
        debug!("selecting track {} ({})", track.id, track.title);
        self.bus.publish(Event::TrackSelected {
            track: track.clone(),
            queue: queue.to_vec(),
        });
    }
}

/// Track lists arrive either as a bare array or wrapped as `{"tracks": [...]}`.
fn tracks_from(body: Value) -> Result<Vec<Track>, HttpError> {
    let list = match body {
        list @ Value::Array(_) => list,
        Value::Object(mut map) => match map.remove("tracks") {
            Some(list) => list,
            None => return Err(HttpError::Payload("missing \"tracks\" field".into())),
        },
        other => {
            return Err(HttpError::Payload(format!(
                "expected array or object, got {other}"
            )));
        }
    };

    serde_json::from_value(list).map_err(|e| HttpError::Payload(e.to_string()))
}
