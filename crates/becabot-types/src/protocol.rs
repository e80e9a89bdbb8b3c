use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{check_status, Error};
use crate::Sender;

/// Response body of `POST /send-message/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sources: Option<Sources>,
}

/// Documents the backend consulted to produce a reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sources {
    #[serde(default, deserialize_with = "deserialize_source_map")]
    pub pdf_sources: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_source_map")]
    pub web_sources: BTreeMap<String, Vec<String>>,
}

impl Sources {
    pub fn is_empty(&self) -> bool {
        self.pdf_sources.is_empty() && self.web_sources.is_empty()
    }
}

/// A successful bot reply
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub text: String,
    pub sources: Sources,
}

impl SendMessageResponse {
    /// Turn the `success` flag into a `Result`
    pub fn into_reply(self) -> Result<BotReply, Error> {
        if self.success {
            Ok(BotReply {
                text: self.response.unwrap_or_default(),
                sources: self.sources.unwrap_or_default(),
            })
        } else {
            Err(Error::BackendReported {
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Response body of `POST /clear-chat/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearChatResponse {
    pub success: bool,
    #[serde(default)]
    pub messages_deleted: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ClearChatResponse {
    pub fn into_result(self) -> Result<(), Error> {
        if self.success {
            Ok(())
        } else {
            Err(Error::BackendReported {
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

/// Response body of `GET /get-chat-history/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// One stored message as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub content: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryMessage {
    /// `human` messages are the user's, everything else came from the bot
    pub fn sender(&self) -> Sender {
        if self.role == "human" {
            Sender::User
        } else {
            Sender::Bot
        }
    }
}

/// Form-encoded body of a `/send-message/` request
pub fn send_message_body(text: &str) -> String {
    format!("message={}", urlencoding::encode(text))
}

/// Interpret a `/send-message/` response. The endpoint answers errors with a
/// JSON body and a 4xx/5xx status, so a body reporting `success: false` wins
/// over the status code.
pub fn parse_send_response(status: u16, body: &str) -> Result<BotReply, Error> {
    match serde_json::from_str::<SendMessageResponse>(body) {
        Ok(resp) if !resp.success => resp.into_reply(),
        Ok(resp) => {
            check_status(status)?;
            resp.into_reply()
        }
        Err(e) => {
            check_status(status)?;
            Err(Error::decode(e))
        }
    }
}

/// Interpret a `/clear-chat/` response
pub fn parse_clear_response(status: u16, body: &str) -> Result<(), Error> {
    match serde_json::from_str::<ClearChatResponse>(body) {
        Ok(resp) if !resp.success => resp.into_result(),
        Ok(resp) => {
            check_status(status)?;
            resp.into_result()
        }
        Err(e) => {
            check_status(status)?;
            Err(Error::decode(e))
        }
    }
}

/// Interpret a `/get-chat-history/` response
pub fn parse_history_response(status: u16, body: &str) -> Result<Vec<HistoryMessage>, Error> {
    check_status(status)?;
    let resp: ChatHistoryResponse = serde_json::from_str(body).map_err(Error::decode)?;
    if resp.success {
        Ok(resp.messages)
    } else {
        Err(Error::BackendReported {
            message: "history unavailable".to_string(),
        })
    }
}

/// Accept page numbers and titles delivered either as strings or numbers
fn deserialize_source_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Vec<serde_json::Value>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| {
            let values = values
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (name, values)
        })
        .collect())
}
