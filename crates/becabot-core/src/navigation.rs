//! Partial navigation: loading placeholder, fetch, swap, history and
//! re-initialization of the swapped content.
//!
//! Fetches may complete in any order. Every navigation is tagged with a
//! sequence number and only the completion carrying the latest one is
//! allowed to touch the container.

use async_trait::async_trait;
use becabot_types::{Error, NavigationEntry};
use std::cell::RefCell;
use std::time::Duration;

use crate::history::resolve_popped;

/// Fetches HTML fragments for a URL
#[async_trait(?Send)]
pub trait PartialSource {
    async fn fetch_partial(&self, url: &str) -> Result<String, Error>;
}

/// One issued navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTicket {
    pub seq: u64,
    pub url: String,
    pub push: bool,
}

/// Work for the shell to carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    ShowLoading,
    Fetch(NavTicket),
    ReplaceContent(String),
    ShowError(String),
    RecordInitial(NavigationEntry),
    PushHistory(NavigationEntry),
    SetActive(String),
    BindLinks,
    EmitNavigated(String),
    DispatchPageInit,
    ScheduleResize(Duration),
}

#[derive(Debug)]
pub struct Navigator {
    latest: u64,
    current_url: Option<String>,
    resize_delay: Duration,
}

impl Navigator {
    pub fn new(resize_delay: Duration) -> Self {
        Self {
            latest: 0,
            current_url: None,
            resize_delay,
        }
    }

    /// URL of the content currently mounted in the container
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Sequence number of the most recently issued navigation
    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    /// The server rendered the first page in full; adopt it as loaded.
    pub fn initial(&mut self, url: &str) -> Vec<NavEffect> {
        self.current_url = Some(url.to_string());
        vec![
            NavEffect::RecordInitial(NavigationEntry::new(url)),
            NavEffect::SetActive(url.to_string()),
            NavEffect::BindLinks,
            NavEffect::DispatchPageInit,
        ]
    }

    /// Start loading `url`. The returned effects end with the fetch to issue.
    pub fn navigate(&mut self, url: &str, push: bool) -> Vec<NavEffect> {
        self.latest += 1;
        log::info!("Navigating to {} (seq {})", url, self.latest);
        let ticket = NavTicket {
            seq: self.latest,
            url: url.to_string(),
            push,
        };
        vec![NavEffect::ShowLoading, NavEffect::Fetch(ticket)]
    }

    /// Back/forward step. Reloads the entry's URL without pushing.
    pub fn popped(&mut self, state: Option<NavigationEntry>, location: &str) -> Vec<NavEffect> {
        let url = resolve_popped(state, location);
        self.navigate(&url, false)
    }

    /// Apply the outcome of a fetch. Stale completions produce no effects.
    pub fn complete(&mut self, ticket: NavTicket, result: Result<String, Error>) -> Vec<NavEffect> {
        if ticket.seq != self.latest {
            log::debug!(
                "Dropping stale response for {} (seq {}, latest {})",
                ticket.url,
                ticket.seq,
                self.latest
            );
            return Vec::new();
        }

        match result {
            Ok(body) => {
                self.current_url = Some(ticket.url.clone());
                let mut effects = vec![NavEffect::ReplaceContent(body)];
                if ticket.push {
                    effects.push(NavEffect::PushHistory(NavigationEntry::new(&ticket.url)));
                }
                effects.extend([
                    NavEffect::SetActive(ticket.url.clone()),
                    NavEffect::BindLinks,
                    NavEffect::EmitNavigated(ticket.url),
                    NavEffect::DispatchPageInit,
                    NavEffect::ScheduleResize(self.resize_delay),
                ]);
                effects
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", ticket.url, e);
                vec![NavEffect::ShowError(error_text(&e))]
            }
        }
    }
}

/// Fetch the ticket's URL and complete it. The navigator is not borrowed
/// across the fetch, so other navigations may start meanwhile.
pub async fn drive(
    navigator: &RefCell<Navigator>,
    source: &dyn PartialSource,
    ticket: NavTicket,
) -> Vec<NavEffect> {
    let result = source.fetch_partial(&ticket.url).await;
    navigator.borrow_mut().complete(ticket, result)
}

fn error_text(error: &Error) -> String {
    match error {
        Error::HttpStatus { status } => format!("No se pudo cargar el contenido (HTTP {}).", status),
        Error::Transport { .. } | Error::Decode { .. } => {
            "No se pudo conectar con el servidor. Verifica tu conexión e inténtalo de nuevo.".to_string()
        }
        other => format!("No se pudo cargar el contenido: {}", other),
    }
}
