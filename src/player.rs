//! The playback core: session state machine, queue traversal and the engine
//! thread that owns the audio output.
//!
//! [`PlaybackSession`] holds every piece of mutable playback state and makes
//! the traversal decisions; the engine thread maps those decisions onto the
//! rodio sink and keeps the shared [`PlayerInfo`] snapshot consistent.
//! [`Player`] is the handle the rest of the application talks to.

mod engine;
mod output;
mod session;
mod thread;
mod types;

pub use engine::*;
pub use output::AudioError;
pub use session::{EndStep, PREV_RESTART_THRESHOLD, PlaybackSession, PrevStep};
pub use types::*;
