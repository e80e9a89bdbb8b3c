use async_trait::async_trait;
use becabot_types::{BotReply, Error, HistoryMessage};

use super::session::{ChatEvent, ChatRequest};

/// The chatbot's JSON endpoints
#[async_trait(?Send)]
pub trait ChatBackend {
    async fn send_message(&self, text: &str) -> Result<BotReply, Error>;
    async fn clear_chat(&self) -> Result<(), Error>;
    async fn chat_history(&self) -> Result<Vec<HistoryMessage>, Error>;
}

/// Issue a request and turn its outcome into the event that completes it
pub async fn perform(backend: &dyn ChatBackend, request: ChatRequest) -> ChatEvent {
    match request {
        ChatRequest::Send(text) => ChatEvent::ReplyReceived(backend.send_message(&text).await),
        ChatRequest::Clear => ChatEvent::ClearFinished(backend.clear_chat().await),
        ChatRequest::History => ChatEvent::HistoryLoaded(backend.chat_history().await),
    }
}
