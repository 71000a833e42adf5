//! Speech Synthesis Gateway
//!
//! Converts reply text into MP3 audio through the Google Cloud Text-to-Speech
//! REST API.

use crate::error::GatewayError;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

pub const GOOGLE_TTS_API_BASE: &str = "https://texttospeech.googleapis.com";
pub const GOOGLE_TTS_KEY_VAR: &str = "GOOGLE_CLOUD_TTS_API_KEY";

/// MIME type of the audio produced by the gateway.
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Voice and audio settings sent with every synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub language_code: String,
    pub voice_name: String,
    pub speaking_rate: f64,
    pub pitch: f64,
    pub volume_gain_db: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            voice_name: "en-US-Neural2-F".to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
            volume_gain_db: 0.0,
        }
    }
}

/// Encoded audio returned by a synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub data: Bytes,
    pub mime_type: &'static str,
}

impl SynthesizedAudio {
    pub fn mpeg(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            mime_type: AUDIO_MPEG,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` into encoded audio.
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, GatewayError>;
}

// --- Google Cloud TTS wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f64,
    pitch: f64,
    volume_gain_db: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

/// A `SpeechSynthesizer` backed by Google Cloud Text-to-Speech.
///
/// The API key is optional at construction time so that the service can
/// start without it; every synthesis attempt then fails with
/// [`GatewayError::MissingCredential`] before touching the network.
pub struct GoogleCloudTts {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    voice: VoiceSettings,
}

impl GoogleCloudTts {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            api_base: GOOGLE_TTS_API_BASE.to_string(),
            voice: VoiceSettings::default(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    async fn request_audio(&self, api_key: &str, text: &str) -> Result<Bytes, String> {
        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code: &self.voice.language_code,
                name: &self.voice.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.voice.speaking_rate,
                pitch: self.voice.pitch,
                volume_gain_db: self.voice.volume_gain_db,
            },
        };

        let url = format!("{}/v1/text:synthesize", self.api_base.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("TTS API returned {}: {}", status, detail.trim()));
        }

        let payload: SynthesizeResponse = response.json().await.map_err(|e| e.to_string())?;
        let encoded = payload
            .audio_content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| "No audio content received from TTS API".to_string())?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| format!("Invalid audio content: {}", e))?;
        Ok(Bytes::from(audio))
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleCloudTts {
    #[instrument(name = "synthesize", skip_all, fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingCredential {
                provider: "Google Cloud TTS",
                env_var: GOOGLE_TTS_KEY_VAR,
            })?;

        let data = self.request_audio(api_key, text).await.map_err(|e| {
            error!(error = %e, "Error generating speech");
            GatewayError::Provider(format!("Failed to generate speech: {}", e))
        })?;
        debug!(bytes = data.len(), "Speech synthesized");

        Ok(SynthesizedAudio::mpeg(data))
    }
}
