//! Typed event bus between the playback engine and catalog/UI collaborators.
//!
//! Catalog views publish `track-selected` and `reset-player`; the engine
//! publishes `now-playing-changed` so views can mark the active track.

mod bus;
mod types;

pub use bus::*;
pub use types::*;

#[cfg(test)]
mod tests;
