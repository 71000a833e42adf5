use clap::Parser;
use std::time::Duration;
use tracing::Level;
use tutor_core::orchestrator::OrchestratorConfig;

/// Talk to the tutor service from a terminal.
#[derive(Debug, Parser)]
#[command(name = "tutor", version, about)]
pub struct Args {
    /// Base URL of the tutor API service.
    #[arg(long, env = "TUTOR_SERVER_URL", default_value = "http://localhost:5000")]
    pub server_url: String,

    /// Fallback speaking time per reply character, in milliseconds.
    #[arg(long, env = "TUTOR_MS_PER_CHAR", default_value_t = 50)]
    pub ms_per_char: u64,

    /// Upper bound of the fallback speaking time, in milliseconds.
    #[arg(long, env = "TUTOR_MAX_FALLBACK_MS", default_value_t = 10_000)]
    pub max_fallback_ms: u64,

    /// Longest a single request to the tutor service may take, in seconds.
    #[arg(long, env = "TUTOR_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Longest a single playback may run, in seconds.
    #[arg(long, env = "TUTOR_PLAYBACK_TIMEOUT_SECS", default_value_t = 300)]
    pub playback_timeout_secs: u64,

    /// Log level written to stderr.
    #[arg(long, env = "TUTOR_LOG_LEVEL", default_value = "warn")]
    pub log_level: Level,
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            ms_per_char: self.ms_per_char,
            max_fallback: Duration::from_millis(self.max_fallback_ms),
            playback_timeout: Duration::from_secs(self.playback_timeout_secs),
        }
    }
}
