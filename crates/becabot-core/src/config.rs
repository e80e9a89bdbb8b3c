use becabot_types::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration, read from an optional JSON blob handed to the
/// entry points by the server-rendered page. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    // Navigation
    pub container_selector: String,
    pub nav_link_selector: String,
    pub sidebar_link_selector: String,
    pub page_marker_attribute: String,
    pub resize_delay_ms: u32,

    // Chat endpoints
    pub send_message_url: String,
    pub clear_chat_url: String,
    pub chat_history_url: String,
    pub csrf_cookie: String,
    pub csrf_header: String,

    // Chat session timing
    pub inactivity_timeout_ms: u32,
    pub greeting_delay_ms: u32,
    pub farewell_delay_ms: u32,
    pub auto_submit_delay_ms: u32,

    // Copy
    pub greeting_text: String,
    pub farewell_text: String,

    pub voice_locale: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            container_selector: "#main-content".to_string(),
            nav_link_selector: "[data-partial-link]".to_string(),
            sidebar_link_selector: ".sidebar [data-partial-link]".to_string(),
            page_marker_attribute: "data-page".to_string(),
            resize_delay_ms: 60,
            send_message_url: "/send-message/".to_string(),
            clear_chat_url: "/clear-chat/".to_string(),
            chat_history_url: "/get-chat-history/".to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            inactivity_timeout_ms: 120_000,
            greeting_delay_ms: 300,
            farewell_delay_ms: 2_000,
            auto_submit_delay_ms: 500,
            greeting_text: "¡Hola! Soy BecaBot. ¿En qué puedo ayudarte con las becas?".to_string(),
            farewell_text: "La conversación se cerró por inactividad. ¡Hasta pronto!".to_string(),
            voice_locale: "es-ES".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a configuration blob. `None` or an empty string
    /// yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, Error> {
        let config = match json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => serde_json::from_str::<ClientConfig>(raw)
                .map_err(|e| Error::Config { cause: e.to_string() })?,
            None => ClientConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let timings = [
            ("inactivity_timeout_ms", self.inactivity_timeout_ms),
            ("greeting_delay_ms", self.greeting_delay_ms),
            ("farewell_delay_ms", self.farewell_delay_ms),
            ("auto_submit_delay_ms", self.auto_submit_delay_ms),
        ];
        for (name, value) in timings {
            if value == 0 {
                return Err(Error::Config {
                    cause: format!("{} must be greater than zero", name),
                });
            }
        }
        if self.container_selector.trim().is_empty() {
            return Err(Error::Config {
                cause: "container_selector must not be empty".to_string(),
            });
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<log::Level, Error> {
        self.log_level.parse::<log::Level>().map_err(|_| Error::Config {
            cause: format!("unknown log level: {}", self.log_level),
        })
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms as u64)
    }

    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms as u64)
    }

    pub fn farewell_delay(&self) -> Duration {
        Duration::from_millis(self.farewell_delay_ms as u64)
    }

    pub fn auto_submit_delay(&self) -> Duration {
        Duration::from_millis(self.auto_submit_delay_ms as u64)
    }

    pub fn resize_delay(&self) -> Duration {
        Duration::from_millis(self.resize_delay_ms as u64)
    }
}
