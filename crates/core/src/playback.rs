//! Audio playback seam used by the orchestrator.
//!
//! An [`AudioClip`] is the temporary resource created for one reply. It is
//! handed to the player by value, so it is released exactly once: when the
//! playback future resolves, fails, or is dropped.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("no audio output available")]
    Unavailable,
    #[error("audio could not be decoded: {0}")]
    Decode(String),
    #[error("playback failed: {0}")]
    Failed(String),
}

/// Encoded audio for a single reply.
pub struct AudioClip {
    id: Uuid,
    data: Bytes,
    mime_type: &'static str,
}

impl AudioClip {
    pub fn new(data: Bytes, mime_type: &'static str) -> Self {
        let clip = Self {
            id: Uuid::new_v4(),
            data,
            mime_type,
        };
        debug!(clip = %clip.id, bytes = clip.data.len(), "Audio clip created");
        clip
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("id", &self.id)
            .field("bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl Drop for AudioClip {
    fn drop(&mut self) {
        debug!(clip = %self.id, "Audio clip released");
    }
}

/// Plays a clip to completion.
///
/// The returned future resolves once playback has ended, or with an error
/// if the audio could not be played.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, clip: AudioClip) -> Result<(), PlaybackError>;
}

/// A player for environments without audio output.
///
/// Always reports [`PlaybackError::Unavailable`], which sends the
/// orchestrator down the timed fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, _clip: AudioClip) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable)
    }
}
