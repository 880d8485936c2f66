use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::guard::GuardConfig;
use crate::rate_limit::RateLimitConfig;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "contact-guard")]
#[command(about = "Contact form guard: validation, bot checks and rate limiting in front of a form endpoint")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Where accepted submissions are posted, log only when unset
    #[arg(short, long)]
    pub relay_url: Option<String>,

    // Value of the form-name field sent with every submission
    #[arg(long, default_value = "contact")]
    pub form_name: String,

    // JSON file for cooldown markers, kept in memory when unset
    #[arg(short, long)]
    pub store_path: Option<PathBuf>,

    // Max submissions per window
    #[arg(long, default_value_t = 3)]
    pub max_attempts: usize,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Cooldown after the limit is hit, in seconds
    #[arg(long, default_value_t = 300)]
    pub cooldown: u64,

    // Faster submissions than this are treated as bots
    #[arg(long, default_value_t = 3000)]
    pub min_fill_ms: u64,

    // Ignore the hidden bot-field
    #[arg(long)]
    pub no_honeypot: bool,

    // Identify visitors by X-Forwarded-For, only behind a proxy that sets it
    #[arg(long)]
    pub trust_forwarded: bool,

    // Idle guard sweep interval in seconds
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,
}

impl Args {
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            rate: RateLimitConfig {
                max_attempts: self.max_attempts,
                window: Duration::from_secs(self.rate_window),
                cooldown: Duration::from_secs(self.cooldown),
            },
            min_fill_time: Duration::from_millis(self.min_fill_ms),
            honeypot: !self.no_honeypot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_guard_defaults() {
        let args = Args::parse_from(["contact-guard"]);
        assert_eq!(args.guard_config(), GuardConfig::default());
        assert!(args.relay_url.is_none());
        assert_eq!(args.form_name, "contact");
        assert!(!args.trust_forwarded);
    }

    #[test]
    fn flags_override_limits() {
        let args = Args::parse_from([
            "contact-guard",
            "--max-attempts",
            "5",
            "--cooldown",
            "30",
            "--no-honeypot",
            "--trust-forwarded",
            "--relay-url",
            "https://example.com/",
        ]);
        let config = args.guard_config();
        assert_eq!(config.rate.max_attempts, 5);
        assert_eq!(config.rate.cooldown, Duration::from_secs(30));
        assert!(!config.honeypot);
        assert!(args.trust_forwarded);
        assert_eq!(args.relay_url.as_deref(), Some("https://example.com/"));
    }
}
