//! Conversation Orchestrator
//!
//! Sequences one conversation cycle at a time:
//!
//! 1. Append the user's message and move the avatar to `Thinking`.
//! 2. Ask the tutor service for a reply. On failure append a fixed apology
//!    and return to `Idle`.
//! 3. Append the reply, move to `Speaking` and request synthesized speech.
//! 4. Play the audio, racing playback against a watchdog. If speech or
//!    playback fails, hold `Speaking` for a duration derived from the reply
//!    length instead.
//! 5. Return to `Idle`.
//!
//! Submissions that arrive while a cycle is in flight are ignored.

use crate::{
    avatar::{AvatarEvent, AvatarStatus, InvalidTransition},
    client::TutorApi,
    playback::{AudioClip, AudioPlayer},
    speech::AUDIO_MPEG,
    transcript::{Message, Role, Transcript},
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, mpsc, watch},
    time::sleep,
};
use tracing::{debug, error, info, instrument, warn};

/// Appended in place of a reply when the chat request fails.
pub const CHAT_ERROR_REPLY: &str = "I apologize, but I encountered an error. Please try again.";

/// Predefined prompts offered before the first message.
pub const QUICK_TOPICS: [&str; 4] = [
    "Explain quadratic equations",
    "What is Newton's law?",
    "How does photosynthesis work?",
    "Solve: 2x + 5 = 15",
];

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fallback speaking time per reply character.
    pub ms_per_char: u64,
    /// Upper bound of the fallback speaking time.
    pub max_fallback: Duration,
    /// Longest a single playback may run before the cycle moves on.
    pub playback_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            ms_per_char: 50,
            max_fallback: Duration::from_millis(10_000),
            playback_timeout: Duration::from_secs(300),
        }
    }
}

impl OrchestratorConfig {
    /// How long the avatar keeps speaking when there is no audio to follow.
    pub fn fallback_hold(&self, reply: &str) -> Duration {
        let chars = reply.chars().count() as u64;
        Duration::from_millis(chars.saturating_mul(self.ms_per_char)).min(self.max_fallback)
    }
}

/// A change observed by the presentation layer, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationUpdate {
    Status(AvatarStatus),
    Message(Message),
}

/// How a call to [`ConversationOrchestrator::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Blank input, or a cycle was already in flight.
    Ignored,
    /// The tutor replied and the speaking phase completed.
    Answered,
    /// The chat request failed and the apology was shown.
    ChatFailed,
}

pub struct ConversationOrchestrator {
    api: Arc<dyn TutorApi>,
    player: Arc<dyn AudioPlayer>,
    config: OrchestratorConfig,
    status: watch::Sender<AvatarStatus>,
    transcript: Mutex<Transcript>,
    updates: Option<mpsc::Sender<ConversationUpdate>>,
}

impl ConversationOrchestrator {
    pub fn new(
        api: Arc<dyn TutorApi>,
        player: Arc<dyn AudioPlayer>,
        config: OrchestratorConfig,
    ) -> Self {
        let (status, _) = watch::channel(AvatarStatus::Idle);
        Self {
            api,
            player,
            config,
            status,
            transcript: Mutex::new(Transcript::new()),
            updates: None,
        }
    }

    /// Publishes every status change and appended message on `tx`.
    ///
    /// The receiver must be drained, otherwise the cycle waits for capacity.
    pub fn with_updates(mut self, tx: mpsc::Sender<ConversationUpdate>) -> Self {
        self.updates = Some(tx);
        self
    }

    pub fn status(&self) -> AvatarStatus {
        *self.status.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.status().is_busy()
    }

    /// Watches the avatar status.
    pub fn subscribe(&self) -> watch::Receiver<AvatarStatus> {
        self.status.subscribe()
    }

    /// A copy of the transcript so far.
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().await.messages().to_vec()
    }

    /// Equivalent to submitting the topic text.
    pub async fn select_topic(&self, topic: &str) -> CycleOutcome {
        self.submit(topic).await
    }

    /// Runs one full conversation cycle for `text`.
    ///
    /// Resolves once the avatar is back to `Idle`. Blank input and input
    /// received while busy are ignored without touching the transcript.
    /// Dropping the future mid-cycle also returns the avatar to `Idle`.
    #[instrument(name = "conversation_cycle", skip_all, fields(chars = text.chars().count()))]
    pub async fn submit(&self, text: &str) -> CycleOutcome {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return CycleOutcome::Ignored;
        }

        let user_message = {
            let mut transcript = self.transcript.lock().await;
            if let Err(e) = self.transition(AvatarEvent::Submitted) {
                debug!(status = %e.from, "Tutor is busy, ignoring submission");
                return CycleOutcome::Ignored;
            }
            transcript.append(Role::User, text)
        };
        let cycle = CycleGuard {
            orchestrator: self,
            finished: false,
        };
        self.publish(ConversationUpdate::Message(user_message)).await;
        self.publish(ConversationUpdate::Status(AvatarStatus::Thinking))
            .await;

        let reply = match self.api.chat(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.append(Role::Assistant, CHAT_ERROR_REPLY).await;
                cycle.finish();
                self.advance(AvatarEvent::ChatFailed).await;
                return CycleOutcome::ChatFailed;
            }
        };

        self.append(Role::Assistant, &reply).await;
        self.advance(AvatarEvent::ReplyReceived).await;

        let end = self.speak(&reply).await;
        cycle.finish();
        self.advance(end).await;
        info!("Conversation cycle complete");
        CycleOutcome::Answered
    }

    /// Runs the speaking phase and reports which event ended it.
    async fn speak(&self, reply: &str) -> AvatarEvent {
        let hold = self.config.fallback_hold(reply);

        let audio = match self.api.tts(reply).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, hold_ms = hold.as_millis() as u64, "Speech unavailable, using fallback timer");
                sleep(hold).await;
                return AvatarEvent::FallbackElapsed;
            }
        };

        let clip = AudioClip::new(audio, AUDIO_MPEG);
        tokio::select! {
            played = self.player.play(clip) => match played {
                Ok(()) => AvatarEvent::PlaybackEnded,
                Err(e) => {
                    warn!(error = %e, hold_ms = hold.as_millis() as u64, "Playback failed, using fallback timer");
                    sleep(hold).await;
                    AvatarEvent::FallbackElapsed
                }
            },
            _ = sleep(self.config.playback_timeout) => {
                warn!(timeout_s = self.config.playback_timeout.as_secs(), "Playback did not finish in time");
                AvatarEvent::PlaybackEnded
            }
        }
    }

    fn transition(&self, event: AvatarEvent) -> Result<AvatarStatus, InvalidTransition> {
        let mut outcome = Err(InvalidTransition {
            from: self.status(),
            event,
        });
        self.status.send_if_modified(|status| {
            outcome = status.apply(event);
            match outcome {
                Ok(next) => {
                    *status = next;
                    true
                }
                Err(_) => false,
            }
        });
        outcome
    }

    async fn advance(&self, event: AvatarEvent) {
        match self.transition(event) {
            Ok(next) => self.publish(ConversationUpdate::Status(next)).await,
            Err(e) => error!(error = %e, "Conversation cycle out of sequence"),
        }
    }

    async fn append(&self, role: Role, content: &str) {
        let message = self.transcript.lock().await.append(role, content);
        self.publish(ConversationUpdate::Message(message)).await;
    }

    /// Returns a dropped cycle to `Idle` without waiting on the update channel.
    fn abandon(&self) {
        if let Ok(next) = self.transition(AvatarEvent::Abandoned) {
            warn!("Conversation cycle dropped before completion");
            if let Some(tx) = &self.updates {
                if tx.try_send(ConversationUpdate::Status(next)).is_err() {
                    warn!("Failed to publish conversation update: channel full or closed.");
                }
            }
        }
    }

    async fn publish(&self, update: ConversationUpdate) {
        if let Some(tx) = &self.updates {
            if tx.send(update).await.is_err() {
                warn!("Failed to publish conversation update: receiver dropped.");
            }
        }
    }
}

/// Owns the busy status of an in-flight cycle until it finishes.
struct CycleGuard<'a> {
    orchestrator: &'a ConversationOrchestrator,
    finished: bool,
}

impl CycleGuard<'_> {
    /// Called right before the final transition, which has no await ahead of it.
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.orchestrator.abandon();
        }
    }
}
