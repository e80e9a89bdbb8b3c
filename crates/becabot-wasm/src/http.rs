use async_trait::async_trait;
use becabot_core::chat::ChatBackend;
use becabot_core::{ClientConfig, PartialSource};
use becabot_types::{
    error::check_status, parse_clear_response, parse_history_response, parse_send_response, send_message_body, BotReply,
    Error, HistoryMessage, PARTIAL_HEADER_NAME, PARTIAL_HEADER_VALUE,
};
use gloo_net::http::{Request, RequestBuilder, Response};

use crate::utils;

/// Loads HTML partials for the navigation shell
pub struct PartialClient;

#[async_trait(?Send)]
impl PartialSource for PartialClient {
    async fn fetch_partial(&self, url: &str) -> Result<String, Error> {
        let response = Request::get(url)
            .header(PARTIAL_HEADER_NAME, PARTIAL_HEADER_VALUE)
            .send()
            .await
            .map_err(|e| Error::transport(format!("{:?}", e)))?;
        check_status(response.status())?;
        response.text().await.map_err(|e| Error::decode(format!("{:?}", e)))
    }
}

/// The chatbot endpoints over fetch
pub struct HttpChatBackend {
    send_url: String,
    clear_url: String,
    history_url: String,
    csrf_cookie: String,
    csrf_header: String,
}

impl HttpChatBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            send_url: config.send_message_url.clone(),
            clear_url: config.clear_chat_url.clone(),
            history_url: config.chat_history_url.clone(),
            csrf_cookie: config.csrf_cookie.clone(),
            csrf_header: config.csrf_header.clone(),
        }
    }

    fn with_csrf(&self, builder: RequestBuilder) -> RequestBuilder {
        match utils::csrf_token(&self.csrf_cookie) {
            Some(token) => builder.header(&self.csrf_header, &token),
            None => {
                log::warn!("No CSRF cookie '{}' found", self.csrf_cookie);
                builder
            }
        }
    }
}

/// Status and body of a finished request
async fn read(response: Response) -> Result<(u16, String), Error> {
    let status = response.status();
    let body = response.text().await.map_err(|e| Error::decode(format!("{:?}", e)))?;
    Ok((status, body))
}

#[async_trait(?Send)]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, text: &str) -> Result<BotReply, Error> {
        log::debug!("Sending message ({} chars)", text.chars().count());
        let body = send_message_body(text);
        let response = self
            .with_csrf(Request::post(&self.send_url))
            .header(PARTIAL_HEADER_NAME, PARTIAL_HEADER_VALUE)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .map_err(|e| Error::transport(format!("{:?}", e)))?
            .send()
            .await
            .map_err(|e| Error::transport(format!("{:?}", e)))?;
        let (status, body) = read(response).await?;
        parse_send_response(status, &body)
    }

    async fn clear_chat(&self) -> Result<(), Error> {
        let response = self
            .with_csrf(Request::post(&self.clear_url))
            .header(PARTIAL_HEADER_NAME, PARTIAL_HEADER_VALUE)
            .send()
            .await
            .map_err(|e| Error::transport(format!("{:?}", e)))?;
        let (status, body) = read(response).await?;
        parse_clear_response(status, &body)
    }

    async fn chat_history(&self) -> Result<Vec<HistoryMessage>, Error> {
        let response = Request::get(&self.history_url)
            .header(PARTIAL_HEADER_NAME, PARTIAL_HEADER_VALUE)
            .send()
            .await
            .map_err(|e| Error::transport(format!("{:?}", e)))?;
        let (status, body) = read(response).await?;
        parse_history_response(status, &body)
    }
}
