//! Settings loading for the playback engine.
//!
//! Settings come from an optional TOML file plus `CODA__` environment
//! overrides and fall back to struct defaults; see [`Settings::load`].

mod load;
mod schema;

pub use load::*;
pub use schema::*;

#[cfg(test)]
mod tests;
