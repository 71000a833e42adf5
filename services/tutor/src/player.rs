//! Speaker output for synthesized replies.
//!
//! `rodio`'s output stream is not `Send`, so each clip is decoded and played
//! on a blocking thread. Dropping the returned future stops the sink.

use async_trait::async_trait;
use bytes::Bytes;
use rodio::{Decoder, OutputStream, Sink};
use std::{
    io::Cursor,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tracing::debug;
use tutor_core::playback::{AudioClip, AudioPlayer, PlaybackError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default, Clone, Copy)]
pub struct SpeakerPlayer;

/// Raises the stop flag when playback is abandoned.
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn play_blocking(data: Cursor<Bytes>, stop: &AtomicBool) -> Result<(), PlaybackError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|_| PlaybackError::Unavailable)?;
    let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::Failed(e.to_string()))?;
    let source = Decoder::new(data).map_err(|e| PlaybackError::Decode(e.to_string()))?;

    sink.append(source);
    while !sink.empty() {
        if stop.load(Ordering::SeqCst) {
            sink.stop();
            debug!("Playback stopped early");
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}

#[async_trait]
impl AudioPlayer for SpeakerPlayer {
    async fn play(&self, clip: AudioClip) -> Result<(), PlaybackError> {
        let stop = Arc::new(AtomicBool::new(false));
        let _guard = StopOnDrop(stop.clone());
        let data = Cursor::new(clip.data().clone());

        let result = tokio::task::spawn_blocking(move || play_blocking(data, &stop))
            .await
            .map_err(|e| PlaybackError::Failed(e.to_string()))?;

        debug!(clip = %clip.id(), "Playback finished");
        result
    }
}
