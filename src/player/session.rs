//! The playback session: all mutable playback state and the queue-traversal
//! algorithm.
//!
//! The session never touches the audio resource itself; its methods return
//! decisions ([`PrevStep`], [`EndStep`], picked tracks) that the engine
//! thread maps onto sink operations. That split keeps the state machine
//! deterministic and testable.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::Track;
use crate::config::PlaybackSettings;

use super::types::RepeatMode;

/// `previous` restarts the current track once it has played longer than
/// this; within the window it moves to the prior track instead (double-tap
/// to actually go back).
pub const PREV_RESTART_THRESHOLD: Duration = Duration::from_secs(2);

/// Outcome of a `previous` gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum PrevStep {
    /// Restart the current track from position zero; the index is unchanged.
    Restart,
    /// Load and play this track.
    Play(Track),
    /// Nothing to do (no current track, or nowhere to go).
    Ignore,
}

/// Outcome of the end-of-media signal.
#[derive(Debug, Clone, PartialEq)]
pub enum EndStep {
    /// Restart the current track from position zero.
    Restart,
    /// Load and play this track.
    Play(Track),
    /// The queue ran out: stop in the paused state, position at the end.
    Finished,
}

pub struct PlaybackSession {
    current: Option<Track>,
    queue: Vec<Track>,
    current_index: usize,
    shuffled: bool,
    repeat: RepeatMode,
    /// Ids already emitted during the current shuffle round.
    played: HashSet<String>,
    volume: f32,
    muted_previous: f32,
    /// Id of the track whose media load is in flight, if any. Doubles as
    /// the re-entrancy guard and the staleness reference.
    loading: Option<String>,
    /// True between a seek-handle press and release.
    dragging: bool,
}

impl PlaybackSession {
    pub fn new(settings: &PlaybackSettings) -> Self {
        Self {
            current: None,
            queue: Vec::new(),
            current_index: 0,
            shuffled: settings.shuffle,
            repeat: settings.repeat.into(),
            played: HashSet::new(),
            volume: settings.volume.clamp(0.0, 1.0),
            muted_previous: 1.0,
            loading: None,
            dragging: false,
        }
    }

    /// Return the session to its defaults without destroying it.
    pub fn reset(&mut self, settings: &PlaybackSettings) {
        *self = Self::new(settings);
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.id.as_str())
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }

    /// Number of tracks emitted so far in the current shuffle round. Never
    /// exceeds the queue length.
    pub fn shuffle_round_len(&self) -> usize {
        self.played.len()
    }

    /// Replace the queue and current track from a selection request and
    /// start a fresh shuffle round.
    ///
    /// The selected track is expected to appear in the supplied queue; when
    /// it does not, the index falls back to 0 rather than rejecting the
    /// selection.
    pub fn select(&mut self, track: Track, queue: Vec<Track>) {
        self.current_index = queue.iter().position(|t| t.id == track.id).unwrap_or(0);
        self.queue = queue;
        self.current = Some(track);
        self.played.clear();
    }

    /// Move to the next track: +1 with wraparound, or the shuffle-round pick.
    pub fn advance_next<R: Rng>(&mut self, rng: &mut R) -> Option<Track> {
        if self.queue.is_empty() {
            return None;
        }
        if self.shuffled {
            return self.shuffle_next(rng);
        }
        let index = (self.current_index + 1) % self.queue.len();
        Some(self.set_current_index(index))
    }

    /// The `previous` gesture, given how long the current track has played.
    pub fn previous<R: Rng>(&mut self, elapsed: Duration, rng: &mut R) -> PrevStep {
        if self.current.is_none() || self.queue.is_empty() {
            return PrevStep::Ignore;
        }
        if elapsed > PREV_RESTART_THRESHOLD {
            return PrevStep::Restart;
        }
        if self.shuffled {
            // No memory of the actual play order under shuffle: a uniform
            // pick over the rest of the queue, never recorded into the
            // round.
            let candidates = self.candidates_excluding_current();
            match candidates.choose(rng) {
                Some(&index) => PrevStep::Play(self.set_current_index(index)),
                None => PrevStep::Ignore,
            }
        } else {
            let index = if self.current_index == 0 {
                self.queue.len() - 1
            } else {
                self.current_index - 1
            };
            PrevStep::Play(self.set_current_index(index))
        }
    }

    /// Resolve the end-of-media signal, in priority order: repeat-one,
    /// shuffle, repeat-all, plain advance until the queue runs out.
    pub fn track_ended<R: Rng>(&mut self, rng: &mut R) -> EndStep {
        if self.repeat == RepeatMode::One {
            return EndStep::Restart;
        }
        if self.shuffled {
            if let Some(id) = self.current_id().map(str::to_owned) {
                self.played.insert(id);
            }
            return match self.shuffle_next(rng) {
                Some(track) => EndStep::Play(track),
                None => EndStep::Finished,
            };
        }
        if self.queue.is_empty() {
            return EndStep::Finished;
        }
        if self.repeat == RepeatMode::All {
            let index = (self.current_index + 1) % self.queue.len();
            return EndStep::Play(self.set_current_index(index));
        }
        if self.current_index + 1 < self.queue.len() {
            let index = self.current_index + 1;
            EndStep::Play(self.set_current_index(index))
        } else {
            EndStep::Finished
        }
    }

    /// Flip shuffle; turning it ON starts a fresh round. Current track and
    /// index are left untouched.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffled = !self.shuffled;
        if self.shuffled {
            self.played.clear();
        }
        self.shuffled
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    /// Mute, or restore the stashed pre-mute volume (1.0 if never stashed).
    pub fn toggle_mute(&mut self) -> f32 {
        if self.volume > 0.0 {
            self.muted_previous = self.volume;
            self.volume = 0.0;
        } else {
            self.volume = if self.muted_previous > 0.0 {
                self.muted_previous
            } else {
                1.0
            };
        }
        self.volume
    }

    /// Volume to apply to a freshly assigned source. A new source always
    /// comes up audible, restoring the pre-mute level when the session was
    /// muted.
    pub fn load_volume(&mut self) -> f32 {
        if self.volume == 0.0 {
            self.volume = if self.muted_previous > 0.0 {
                self.muted_previous
            } else {
                1.0
            };
        }
        self.volume
    }

    /// Take the loading guard for `track_id`. Returns false while another
    /// load is in flight; the caller must then drop the request.
    pub fn begin_load(&mut self, track_id: &str) -> bool {
        if self.loading.is_some() {
            return false;
        }
        self.loading = Some(track_id.to_owned());
        true
    }

    /// Release the loading guard and report whether the finished load is
    /// still current. The guard is released even for stale completions; a
    /// permanently held guard would deadlock every later selection.
    pub fn finish_load(&mut self, track_id: &str) -> bool {
        let loading = self.loading.take();
        loading.as_deref() == Some(track_id) && self.current_id() == Some(track_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Leave the dragging state; returns whether a drag was in flight.
    pub fn end_drag(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Absolute position for a `0..=1` seek fraction, or `None` while no
    /// duration metadata is available (nothing selected, or the catalog
    /// reported a zero duration).
    pub fn seek_target(&self, fraction: f64) -> Option<Duration> {
        let duration = self.current.as_ref().map(Track::duration)?;
        if duration.is_zero() {
            return None;
        }
        Some(duration.mul_f64(fraction.clamp(0.0, 1.0)))
    }

    fn set_current_index(&mut self, index: usize) -> Track {
        let track = self.queue[index].clone();
        self.current_index = index;
        self.current = Some(track.clone());
        track
    }

    fn candidates_excluding_current(&self) -> Vec<usize> {
        (0..self.queue.len())
            .filter(|&i| Some(self.queue[i].id.as_str()) != self.current_id())
            .collect()
    }

    /// One step of the shuffle round: pick uniformly among the unplayed
    /// tracks, restarting the round when it is exhausted.
    fn shuffle_next<R: Rng>(&mut self, rng: &mut R) -> Option<Track> {
        let mut unplayed: Vec<usize> = (0..self.queue.len())
            .filter(|&i| !self.played.contains(&self.queue[i].id))
            .collect();
        if unplayed.is_empty() {
            // Round exhausted: start a fresh one, keeping the track that
            // just played out of the new candidate set so the queue makes
            // forward progress.
            self.played.clear();
            unplayed = self.candidates_excluding_current();
            if unplayed.is_empty() {
                // Single-track queue: replaying it is the only option.
                unplayed = (0..self.queue.len()).collect();
            }
        }
        let &index = unplayed.choose(rng)?;
        let track = self.set_current_index(index);
        self.played.insert(track.id.clone());
        Some(track)
    }
}
