use serde_json::{Value, json};

use super::*;
use crate::api::{ApiClient, HttpError};
use crate::events::{Bus, Event};

/// Canned-response client: answers `get` from a fixed (path, body) table.
struct StubClient {
    responses: Vec<(&'static str, Result<Value, HttpError>)>,
}

impl ApiClient for StubClient {
    fn get(&self, path: &str) -> Result<Value, HttpError> {
        self.responses
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, r)| r.clone())
            .unwrap_or_else(|| {
                Err(HttpError::Status {
                    status: 404,
                    message: format!("no stub for {path}"),
                })
            })
    }

    fn post(&self, _path: &str, _body: &Value) -> Result<Value, HttpError> {
        unimplemented!("read-only stub")
    }

    fn put(&self, _path: &str, _body: &Value) -> Result<Value, HttpError> {
        unimplemented!("read-only stub")
    }

    fn delete(&self, _path: &str) -> Result<Value, HttpError> {
        unimplemented!("read-only stub")
    }
}

fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Track {id}"),
        "artist_name": "Artist",
        "image_url": format!("https://img.example/{id}.jpg"),
        "audio_url": format!("https://media.example/{id}.mp3"),
        "duration": 213,
    })
}

#[test]
fn trending_tracks_unwraps_the_tracks_envelope() {
    let client = StubClient {
        responses: vec![(
            "tracks/trending?limit=6",
            Ok(json!({ "tracks": [track_json("a"), track_json("b")] })),
        )],
    };
    let catalog = RemoteCatalog::new(client, Bus::new());

    let tracks = catalog.trending_tracks(6).unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "a");
    assert_eq!(tracks[0].artist_name, "Artist");
    assert_eq!(tracks[1].duration, 213);
}

#[test]
fn album_tracks_accepts_a_bare_array() {
    let client = StubClient {
        responses: vec![("albums/al1/tracks", Ok(json!([track_json("x")])))],
    };
    let catalog = RemoteCatalog::new(client, Bus::new());

    let tracks = catalog.album_tracks("al1").unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "x");
}

#[test]
fn missing_optional_fields_default() {
    let client = StubClient {
        responses: vec![(
            "playlists/p1/tracks",
            Ok(json!([{ "id": "x", "audio_url": "file:///x.mp3" }])),
        )],
    };
    let catalog = RemoteCatalog::new(client, Bus::new());

    let tracks = catalog.playlist_tracks("p1").unwrap();
    assert_eq!(tracks[0].title, "");
    assert_eq!(tracks[0].duration, 0);
}

#[test]
fn a_client_can_be_shared_by_reference() {
    let client = StubClient {
        responses: vec![("albums/al1/tracks", Ok(json!([track_json("x")])))],
    };
    let catalog = RemoteCatalog::new(&client, Bus::new());

    assert_eq!(catalog.album_tracks("al1").unwrap().len(), 1);
    // Borrowing leaves the caller's client usable.
    assert!(client.get("albums/al1/tracks").is_ok());
}

#[test]
fn http_errors_pass_through() {
    let client = StubClient {
        responses: vec![(
            "tracks/trending?limit=6",
            Err(HttpError::Status {
                status: 401,
                message: "token expired".into(),
            }),
        )],
    };
    let catalog = RemoteCatalog::new(client, Bus::new());

    let err = catalog.trending_tracks(6).unwrap_err();
    assert!(err.is_unauthorized());
}

#[test]
fn malformed_bodies_surface_as_payload_errors() {
    let client = StubClient {
        responses: vec![("tracks/trending?limit=6", Ok(json!({ "items": [] })))],
    };
    let catalog = RemoteCatalog::new(client, Bus::new());

    assert!(matches!(
        catalog.trending_tracks(6),
        Err(HttpError::Payload(_))
    ));
}

#[test]
fn select_publishes_track_selected_with_the_queue() {
    let client = StubClient { responses: vec![] };
    let bus = Bus::new();
    let rx = bus.subscribe();
    let catalog = RemoteCatalog::new(client, bus);

    let queue: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| serde_json::from_value::<Track>(track_json(id)).unwrap())
        .collect();
    catalog.select(&queue[1], &queue);

    match rx.try_recv().unwrap() {
        Event::TrackSelected { track, queue } => {
            assert_eq!(track.id, "b");
            assert_eq!(queue.len(), 3);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn format_duration_pads_seconds() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(59), "0:59");
    assert_eq!(format_duration(60), "1:00");
    assert_eq!(format_duration(213), "3:33");
    assert_eq!(format_duration(3601), "60:01");
}
