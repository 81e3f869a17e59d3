use clap::Parser;
use std::time::Duration;

/// Chat with the movie relay from the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-shell", version, about)]
pub struct ShellArgs {
    /// Base URL of the relay service
    #[arg(long, env = "KINO_SERVER_URL", default_value = "http://localhost:5000")]
    pub server_url: String,

    /// Seconds between liveness probes
    #[arg(long, env = "KINO_PROBE_INTERVAL_SECS", default_value_t = 30)]
    pub probe_interval_secs: u64,

    /// Timeout for a liveness probe, in seconds
    #[arg(long, env = "KINO_PING_TIMEOUT_SECS", default_value_t = 5)]
    pub ping_timeout_secs: u64,

    /// Timeout for a chat request, in seconds
    #[arg(long, env = "KINO_CHAT_TIMEOUT_SECS", default_value_t = 60)]
    pub chat_timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset. Logs go to stderr next to the
    /// transcript, so only errors are shown by default.
    #[arg(long, env = "KINO_LOG_LEVEL", default_value = "error")]
    pub log_level: String,
}

impl ShellArgs {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }
}
