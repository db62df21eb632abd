use super::*;
use crate::catalog::Track;

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        title: format!("Track {id}"),
        artist_name: "Artist".into(),
        image_url: String::new(),
        audio_url: format!("file:///tmp/{id}.mp3"),
        duration: 180,
    }
}

#[test]
fn subscribers_receive_published_events() {
    let bus = Bus::new();
    let rx = bus.subscribe();

    bus.publish(Event::TrackSelected {
        track: t("a"),
        queue: vec![t("a"), t("b")],
    });

    match rx.try_recv().unwrap() {
        Event::TrackSelected { track, queue } => {
            assert_eq!(track.id, "a");
            assert_eq!(queue.len(), 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn every_subscriber_gets_its_own_copy() {
    let bus = Bus::new();
    let rx1 = bus.subscribe();
    let rx2 = bus.subscribe();

    bus.publish(Event::ResetPlayer);

    assert!(matches!(rx1.try_recv(), Ok(Event::ResetPlayer)));
    assert!(matches!(rx2.try_recv(), Ok(Event::ResetPlayer)));
}

#[test]
fn dropped_subscribers_are_pruned() {
    let bus = Bus::new();
    let rx1 = bus.subscribe();
    drop(bus.subscribe());

    // The dead subscriber must not block delivery to the live one.
    bus.publish(Event::NowPlayingChanged {
        track_id: "a".into(),
    });
    bus.publish(Event::NowPlayingChanged {
        track_id: "b".into(),
    });

    assert!(matches!(
        rx1.try_recv(),
        Ok(Event::NowPlayingChanged { track_id }) if track_id == "a"
    ));
    assert!(matches!(
        rx1.try_recv(),
        Ok(Event::NowPlayingChanged { track_id }) if track_id == "b"
    ));
}

#[test]
fn clones_share_the_subscriber_list() {
    let bus = Bus::new();
    let rx = bus.subscribe();

    bus.clone().publish(Event::ResetPlayer);
    assert!(matches!(rx.try_recv(), Ok(Event::ResetPlayer)));
}

#[test]
fn event_names_match_the_wire_names() {
    assert_eq!(
        Event::TrackSelected {
            track: t("a"),
            queue: vec![]
        }
        .name(),
        "track-selected"
    );
    assert_eq!(Event::ResetPlayer.name(), "reset-player");
    assert_eq!(
        Event::NowPlayingChanged {
            track_id: "a".into()
        }
        .name(),
        "now-playing-changed"
    );
}
