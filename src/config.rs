use clap::Parser;
use std::time::Duration;

pub const DEFAULT_COOLDOWN_SECS: u64 = 600;
pub const MAX_COOLDOWN_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_KEY_PREFIX: &str = "contact_limit:";

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-gateway")]
#[command(about = "Contact form endpoint with a per-caller submission cooldown")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Cooldown window in seconds, one admitted submission per caller per window
    #[arg(
        long,
        env = "COOLDOWN_SECS",
        default_value_t = DEFAULT_COOLDOWN_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_COOLDOWN_SECS)
    )]
    pub cooldown_secs: u64,

    // Namespace for cooldown keys in the store
    #[arg(long, env = "COOLDOWN_KEY_PREFIX", default_value = DEFAULT_KEY_PREFIX)]
    pub key_prefix: String,

    // Upper bound for a single store round trip
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,

    // Upper bound for sending both notification mails
    #[arg(long, env = "DISPATCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub dispatch_timeout_ms: u64,

    // Upstash REST endpoint, in-memory store is used when missing
    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    pub upstash_url: Option<String>,

    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    pub upstash_token: Option<String>,

    // HTTP mail API (Resend compatible payload)
    #[arg(long, env = "MAIL_API_URL", default_value = "https://api.resend.com/emails")]
    pub mail_api_url: String,

    // Without a key, leads are only logged
    #[arg(long, env = "MAIL_API_KEY", hide_env_values = true)]
    pub mail_api_key: Option<String>,

    // Sender address for both mails
    #[arg(long, env = "MAIL_FROM", default_value = "contact@localhost")]
    pub mail_from: String,

    // Where lead alerts go, defaults to the sender
    #[arg(long, env = "MAIL_ADMIN_TO")]
    pub mail_admin_to: Option<String>,

    // Name printed under the acknowledgement mail
    #[arg(long, env = "MAIL_SIGNATURE", default_value = "Portfolio Uplink")]
    pub mail_signature: String,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Args {
    pub fn cooldown_window(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    pub fn admin_address(&self) -> &str {
        self.mail_admin_to.as_deref().unwrap_or(&self.mail_from)
    }

    /// Both Upstash settings, or `None` when either one is missing.
    pub fn upstash_credentials(&self) -> Option<(&str, &str)> {
        match (self.upstash_url.as_deref(), self.upstash_token.as_deref()) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => Some((url, token)),
            _ => None,
        }
    }
}
