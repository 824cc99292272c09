//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default lead-submission endpoint.
pub const DEFAULT_LEAD_ENDPOINT: &str =
    "https://functions.poehali.dev/dce04ff2-c355-491c-ba7b-d7d24cce51b7";

/// Bot opened from the chat simulator's "continue in Telegram" option.
pub const DEFAULT_CHAT_URL: &str = "https://t.me/razblok_bot";

/// Bot opened after a lead was accepted.
pub const DEFAULT_FOLLOW_UP_URL: &str = "https://t.me/Bot_RazblokBot";

/// Delays of the simulated typing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTiming {
    /// From selection until the echoed user message appears.
    pub echo_delay: Duration,
    /// From the echo until the bot starts typing.
    pub pause: Duration,
    /// How long the bot "types" before its reply appears.
    pub reply_delay: Duration,
}

impl Default for TypingTiming {
    fn default() -> Self {
        Self {
            echo_delay: Duration::from_millis(300),
            pause: Duration::from_millis(500),
            reply_delay: Duration::from_millis(1000),
        }
    }
}

impl TypingTiming {
    /// Time from a selection until the bot reply is on screen.
    pub fn total(&self) -> Duration {
        self.echo_delay + self.pause + self.reply_delay
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP/WebSocket listen port.
    pub port: u16,
    /// Where accepted leads are posted.
    pub lead_endpoint: String,
    /// Testimonial content endpoint (routes answer 503 when unset).
    pub testimonials_endpoint: Option<String>,
    /// External chat opened from the dialogue.
    pub chat_url: String,
    /// External chat opened after a successful lead submission.
    pub follow_up_url: String,
    /// Chat sessions idle this long are dropped.
    pub session_idle_timeout: Duration,
    /// Typing simulation delays.
    pub typing: TypingTiming,
    /// Also run the terminal chat simulator on stdin/stdout.
    pub terminal: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            lead_endpoint: DEFAULT_LEAD_ENDPOINT.to_string(),
            testimonials_endpoint: None,
            chat_url: DEFAULT_CHAT_URL.to_string(),
            follow_up_url: DEFAULT_FOLLOW_UP_URL.to_string(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            typing: TypingTiming::default(),
            terminal: false,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("RAZBLOK_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "RAZBLOK_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?,
            None => defaults.port,
        };

        let session_idle_timeout = match lookup("RAZBLOK_SESSION_IDLE_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RAZBLOK_SESSION_IDLE_SECS".to_string(),
                    message: format!("expected seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.session_idle_timeout,
        };

        let non_empty = |key: &str| lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Ok(Self {
            port,
            lead_endpoint: non_empty("RAZBLOK_LEAD_ENDPOINT").unwrap_or(defaults.lead_endpoint),
            testimonials_endpoint: non_empty("RAZBLOK_TESTIMONIALS_ENDPOINT"),
            chat_url: non_empty("RAZBLOK_CHAT_URL").unwrap_or(defaults.chat_url),
            follow_up_url: non_empty("RAZBLOK_FOLLOW_UP_URL").unwrap_or(defaults.follow_up_url),
            session_idle_timeout,
            typing: defaults.typing,
            terminal: matches!(lookup("RAZBLOK_TERMINAL").as_deref(), Some("1" | "true")),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.lead_endpoint, DEFAULT_LEAD_ENDPOINT);
        assert_eq!(config.chat_url, "https://t.me/razblok_bot");
        assert_eq!(config.follow_up_url, "https://t.me/Bot_RazblokBot");
        assert!(config.testimonials_endpoint.is_none());
        assert!(!config.terminal);
        assert_eq!(config.typing.total(), Duration::from_millis(1800));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RAZBLOK_PORT", "9000"),
            ("RAZBLOK_TESTIMONIALS_ENDPOINT", "http://localhost:3000/testimonials"),
            ("RAZBLOK_SESSION_IDLE_SECS", "60"),
            ("RAZBLOK_TERMINAL", "1"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.testimonials_endpoint.as_deref(),
            Some("http://localhost:3000/testimonials")
        );
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert!(config.terminal);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RAZBLOK_LEAD_ENDPOINT", "   "),
            ("RAZBLOK_TESTIMONIALS_ENDPOINT", ""),
        ]))
        .unwrap();
        assert_eq!(config.lead_endpoint, DEFAULT_LEAD_ENDPOINT);
        assert!(config.testimonials_endpoint.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("RAZBLOK_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("RAZBLOK_PORT"));
    }
}
