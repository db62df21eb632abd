//! Opening media and building `rodio` sinks from it.
//!
//! The helpers here encapsulate resolving a track's `audio_url` to readable
//! media and preparing a paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;

/// Why media could not be brought to a playing state. Always non-fatal:
/// the engine logs it and falls back to the paused visual state.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The engine only opens local media; fetching remote urls is the
    /// transport layer's job.
    #[error("unsupported media url: {0}")]
    UnsupportedUrl(String),
    #[error("failed to open media: {0}")]
    Open(#[from] std::io::Error),
    #[error("failed to decode media: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Open the media behind a track's `audio_url`.
///
/// Accepts `file://` urls and plain filesystem paths. Runs on a loader
/// thread; the result travels back to the engine as a `MediaReady` command.
pub(super) fn open_media(audio_url: &str) -> Result<File, AudioError> {
    let path = if let Some(stripped) = audio_url.strip_prefix("file://") {
        stripped
    } else if audio_url.contains("://") {
        return Err(AudioError::UnsupportedUrl(audio_url.to_owned()));
    } else {
        audio_url
    };

    Ok(File::open(path)?)
}

/// Create a paused `Sink` for already-opened media that starts playback at
/// `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    media: File,
    start_at: Duration,
) -> Result<Sink, AudioError> {
    let source = Decoder::new(BufReader::new(media))?
        // `skip_duration` is the seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
