use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;

use crate::config::Settings;
use crate::events::{Bus, Event};

use super::thread::spawn_engine_thread;
use super::types::{PlayerCmd, PlayerHandle, PlayerInfo, RepeatMode};

/// Handle to the playback engine.
///
/// Owns the engine thread; collaborators send transport gestures through
/// [`Player::send`], read the shared snapshot through
/// [`Player::info_handle`] and drive selections over the event bus.
pub struct Player {
    tx: Sender<PlayerCmd>,
    info: PlayerHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Start the engine and attach it to `bus`: `track-selected` and
    /// `reset-player` events are forwarded to the engine as commands, and
    /// the engine publishes `now-playing-changed` back onto the same bus.
    pub fn new(bus: Bus, settings: Settings) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let info: PlayerHandle = Arc::new(Mutex::new(PlayerInfo {
            volume: settings.playback.volume,
            shuffled: settings.playback.shuffle,
            repeat: RepeatMode::from(settings.playback.repeat),
            ..PlayerInfo::default()
        }));

        let events = bus.subscribe();
        let events_tx = tx.clone();
        thread::spawn(move || {
            while let Ok(event) = events.recv() {
                let forwarded = match event {
                    Event::TrackSelected { track, queue } => {
                        events_tx.send(PlayerCmd::Select { track, queue })
                    }
                    Event::ResetPlayer => events_tx.send(PlayerCmd::Reset),
                    // Our own outbound signal; nothing to forward.
                    Event::NowPlayingChanged { .. } => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });

        let join = spawn_engine_thread(rx, tx.clone(), info.clone(), bus, settings);

        Self {
            tx,
            info,
            join: Mutex::new(Some(join)),
        }
    }

    /// Send a transport gesture to the engine.
    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Shared snapshot read by transport bars, time labels and catalog
    /// views.
    pub fn info_handle(&self) -> PlayerHandle {
        self.info.clone()
    }

    /// Stop playback and wait for the engine thread to exit.
    pub fn shutdown(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
