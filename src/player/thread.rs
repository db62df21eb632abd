//! The playback engine thread.
//!
//! A single command loop owns the audio output and the [`PlaybackSession`];
//! the receive timeout doubles as the periodic tick that detects
//! end-of-media and refreshes the shared [`PlayerInfo`] snapshot. Media
//! loads run on short-lived loader threads and come back through the
//! engine's own channel as [`PlayerCmd::MediaReady`], where a staleness
//! check decides whether they still apply.

use std::fs::File;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::thread_rng;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::catalog::Track;
use crate::config::Settings;
use crate::events::{Bus, Event};

use super::output::{self, AudioError};
use super::session::{EndStep, PlaybackSession, PrevStep};
use super::types::{NowPlaying, PlayerCmd, PlayerHandle, PlayerInfo};

pub(super) fn spawn_engine_thread(
    rx: Receiver<PlayerCmd>,
    loopback: Sender<PlayerCmd>,
    info: PlayerHandle,
    bus: Bus,
    settings: Settings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for an embedding application.
        let mut stream = stream;
        stream.log_on_drop(false);

        let tick = Duration::from_millis(settings.engine.tick_ms.max(1));
        let session = PlaybackSession::new(&settings.playback);
        let mut engine = Engine {
            stream,
            sink: None,
            loaded_url: None,
            started_at: None,
            accumulated: Duration::ZERO,
            paused: true,
            session,
            settings,
            loopback,
            info,
            bus,
        };

        loop {
            match rx.recv_timeout(tick) {
                Ok(PlayerCmd::Quit) => {
                    engine.stop();
                    break;
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Everything the engine thread owns. The audio output is exclusively held
/// here; no other component mutates its source, position or volume.
struct Engine {
    stream: OutputStream,
    sink: Option<Sink>,
    /// Source currently assigned to the sink; re-selecting it skips the swap.
    loaded_url: Option<String>,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
    paused: bool,
    session: PlaybackSession,
    settings: Settings,
    /// The engine's own command sender, handed to loader threads.
    loopback: Sender<PlayerCmd>,
    info: PlayerHandle,
    bus: Bus,
}

impl Engine {
    fn handle(&mut self, cmd: PlayerCmd) {
        match cmd {
            PlayerCmd::Select { track, queue } => {
                self.session.select(track.clone(), queue);
                self.begin_track(track);
            }

            PlayerCmd::TogglePlayPause => self.toggle_play_pause(),

            PlayerCmd::Next => {
                if let Some(track) = self.session.advance_next(&mut thread_rng()) {
                    self.begin_track(track);
                }
            }

            PlayerCmd::Prev => {
                // Inert until duration metadata exists, i.e. something is
                // actually loaded.
                if self.sink.is_none() {
                    return;
                }
                let elapsed = self.elapsed();
                match self.session.previous(elapsed, &mut thread_rng()) {
                    PrevStep::Restart => self.restart_current(),
                    PrevStep::Play(track) => self.begin_track(track),
                    PrevStep::Ignore => {}
                }
            }

            PlayerCmd::ToggleShuffle => {
                let shuffled = self.session.toggle_shuffle();
                debug!("shuffle {}", if shuffled { "on" } else { "off" });
                self.with_info(|info| info.shuffled = shuffled);
            }

            PlayerCmd::CycleRepeat => {
                let repeat = self.session.cycle_repeat();
                debug!("repeat mode {repeat:?}");
                self.with_info(|info| info.repeat = repeat);
            }

            PlayerCmd::ToggleMute => {
                let volume = self.session.toggle_mute();
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
                self.with_info(|info| info.volume = volume);
            }

            PlayerCmd::SeekClick(fraction) => {
                // A click that lands mid-drag is part of the drag gesture;
                // the release commits instead.
                if self.session.is_dragging() {
                    return;
                }
                self.commit_seek(fraction, false);
            }

            PlayerCmd::DragStart => self.session.begin_drag(),

            PlayerCmd::DragMove(fraction) => {
                if self.session.is_dragging() && self.sink.is_some() {
                    self.with_info(|info| info.drag = Some(fraction.clamp(0.0, 1.0)));
                }
            }

            PlayerCmd::DragRelease(fraction) => {
                let was_dragging = self.session.end_drag();
                self.with_info(|info| info.drag = None);
                if was_dragging {
                    self.commit_seek(fraction, true);
                }
            }

            PlayerCmd::Reset => self.reset(),

            PlayerCmd::MediaReady { track_id, media } => self.media_ready(track_id, media),

            // Handled by the loop before dispatch.
            PlayerCmd::Quit => {}
        }
    }

    /// Make `track` the displayed current track and kick off its load.
    ///
    /// Metadata and the now-playing signal update immediately; whether the
    /// "playing" state sticks is decided when the media arrives.
    fn begin_track(&mut self, track: Track) {
        self.with_info(|info| info.now_playing = Some(NowPlaying::from(&track)));
        self.bus.publish(Event::NowPlayingChanged {
            track_id: track.id.clone(),
        });

        // Re-selecting the already-assigned source keeps position and
        // playback state; nothing to load.
        if self.loaded_url.as_deref() == Some(track.audio_url.as_str()) {
            return;
        }

        if !self.session.begin_load(&track.id) {
            // A load is in flight; racing resource swaps from rapid clicks
            // is worse than dropping the request.
            debug!("load in flight, dropping request for {}", track.id);
            return;
        }

        self.with_info(|info| {
            info.elapsed = Duration::ZERO;
            info.progress = 0.0;
        });

        let loopback = self.loopback.clone();
        let track_id = track.id.clone();
        let audio_url = track.audio_url.clone();
        thread::spawn(move || {
            let media = output::open_media(&audio_url);
            let _ = loopback.send(PlayerCmd::MediaReady { track_id, media });
        });
    }

    fn media_ready(&mut self, track_id: String, media: Result<File, AudioError>) {
        if !self.session.finish_load(&track_id) {
            // A newer selection arrived while this load was in flight;
            // applying it now would clobber the newer track's state.
            debug!("dropping stale media for {track_id}");
            return;
        }

        // The new source replaces the old one even when it turns out to be
        // unplayable.
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.loaded_url = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        let started = media.and_then(|file| {
            let sink = output::create_sink_at(&self.stream, file, Duration::ZERO)?;
            sink.set_volume(self.session.load_volume());
            sink.play();
            Ok(sink)
        });

        match started {
            Ok(sink) => {
                self.sink = Some(sink);
                self.loaded_url = self.session.current().map(|t| t.audio_url.clone());
                self.paused = false;
                self.started_at = Some(Instant::now());
                let volume = self.session.volume();
                self.with_info(|info| {
                    info.playing = true;
                    info.elapsed = Duration::ZERO;
                    info.progress = 0.0;
                    info.volume = volume;
                });
            }
            Err(err) => {
                // Autoplay-style failures are non-fatal: fall back to the
                // paused visual state and wait for the next gesture.
                warn!("playback start failed for {track_id}: {err}");
                self.paused = true;
                self.with_info(|info| info.playing = false);
            }
        }
    }

    /// Restart the current track from position zero, keeping the live
    /// volume (a restart is not a source change).
    fn restart_current(&mut self) {
        let Some(track) = self.session.current().cloned() else {
            return;
        };

        match output::open_media(&track.audio_url)
            .and_then(|file| output::create_sink_at(&self.stream, file, Duration::ZERO))
        {
            Ok(sink) => {
                if let Some(old) = self.sink.take() {
                    old.stop();
                }
                sink.set_volume(self.session.volume());
                sink.play();
                self.sink = Some(sink);
                self.loaded_url = Some(track.audio_url.clone());
                self.paused = false;
                self.started_at = Some(Instant::now());
                self.accumulated = Duration::ZERO;
                self.with_info(|info| {
                    info.playing = true;
                    info.elapsed = Duration::ZERO;
                    info.progress = 0.0;
                });
            }
            Err(err) => {
                warn!("restart failed for {}: {err}", track.id);
                self.paused = true;
                self.with_info(|info| info.playing = false);
            }
        }
    }

    fn toggle_play_pause(&mut self) {
        if self.sink.is_none() {
            return;
        }
        if self.paused {
            if self.sink.as_ref().is_some_and(|s| s.empty()) {
                // Resuming an exhausted source restarts it from the top.
                self.restart_current();
                return;
            }
            if let Some(sink) = &self.sink {
                sink.play();
            }
            self.paused = false;
            self.started_at = Some(Instant::now());
            self.with_info(|info| info.playing = true);
        } else {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
            self.paused = true;
            self.with_info(|info| info.playing = false);
        }
    }

    /// Commit a seek to a `0..=1` fraction by rebuilding the sink at the
    /// target offset. A no-op until duration metadata is known.
    fn commit_seek(&mut self, fraction: f64, resume_if_paused: bool) {
        if self.sink.is_none() {
            return;
        }
        let Some(target) = self.session.seek_target(fraction) else {
            return;
        };
        let Some(track) = self.session.current().cloned() else {
            return;
        };

        match output::open_media(&track.audio_url)
            .and_then(|file| output::create_sink_at(&self.stream, file, target))
        {
            Ok(sink) => {
                if let Some(old) = self.sink.take() {
                    old.stop();
                }
                sink.set_volume(self.session.volume());
                let resume = !self.paused || resume_if_paused;
                if resume {
                    sink.play();
                    self.paused = false;
                    self.started_at = Some(Instant::now());
                } else {
                    self.started_at = None;
                }
                self.sink = Some(sink);
                self.accumulated = target;
                self.with_info(|info| {
                    info.elapsed = target;
                    info.progress = progress_of(target, track.duration());
                    info.playing = resume;
                });
            }
            Err(err) => {
                warn!("seek failed for {}: {err}", track.id);
            }
        }
    }

    /// Periodic work between commands: end-of-media detection, then the
    /// elapsed/progress refresh for observers.
    fn tick(&mut self) {
        let ended = !self.paused && self.sink.as_ref().is_some_and(|s| s.empty());
        if ended {
            self.on_track_ended();
            return;
        }

        // Position updates are suppressed while the seek handle is held so
        // the handle does not fight playback progress.
        if self.paused || self.session.is_dragging() {
            return;
        }

        let duration = self
            .session
            .current()
            .map(Track::duration)
            .unwrap_or_default();
        let mut elapsed = self.elapsed();
        if !duration.is_zero() && elapsed > duration {
            elapsed = duration;
        }
        self.with_info(|info| {
            info.elapsed = elapsed;
            info.progress = progress_of(elapsed, duration);
        });
    }

    fn on_track_ended(&mut self) {
        match self.session.track_ended(&mut thread_rng()) {
            EndStep::Restart => self.restart_current(),
            EndStep::Play(track) => self.begin_track(track),
            EndStep::Finished => {
                // Natural end of the queue: stay paused at the end, no
                // wraparound.
                debug!("queue ended");
                if let Some(st) = self.started_at.take() {
                    self.accumulated += st.elapsed();
                }
                let duration = self
                    .session
                    .current()
                    .map(Track::duration)
                    .unwrap_or_default();
                if !duration.is_zero() {
                    self.accumulated = duration;
                }
                self.paused = true;
                let elapsed = self.accumulated;
                self.with_info(|info| {
                    info.playing = false;
                    info.elapsed = elapsed;
                    if !duration.is_zero() {
                        info.progress = 1.0;
                    }
                });
            }
        }
    }

    /// Full teardown to defaults: session, audio resource, observer
    /// snapshot.
    fn reset(&mut self) {
        debug!("player reset");
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded_url = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.paused = true;
        self.session.reset(&self.settings.playback);

        let volume = self.session.volume();
        let shuffled = self.session.is_shuffled();
        let repeat = self.session.repeat();
        self.with_info(|info| {
            *info = PlayerInfo {
                volume,
                shuffled,
                repeat,
                ..PlayerInfo::default()
            };
        });
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.with_info(|info| info.playing = false);
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn with_info(&self, update: impl FnOnce(&mut PlayerInfo)) {
        if let Ok(mut info) = self.info.lock() {
            update(&mut info);
        }
    }
}

fn progress_of(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        0.0
    } else {
        (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}
