#![allow(dead_code)]

use async_trait::async_trait;
use becabot_core::binder::{active_states, LinkRegistry};
use becabot_core::chat::{ChatBackend, ChatEffect, ChatEvent, ChatRequest, ChatSession};
use becabot_core::clock::FixedClock;
use becabot_core::history::{HistoryAdapter, MemoryHistory};
use becabot_core::navigation::{NavEffect, NavTicket, PartialSource};
use becabot_core::page_init::{Dispatch, PageInitRegistry};
use becabot_core::timer::TimerToken;
use becabot_core::ClientConfig;
use becabot_types::{BotReply, ChatMessage, Error, HistoryMessage, PageMarker};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

// ============================================================================
// Navigation fixtures
// ============================================================================

/// A link element in the fake document
#[derive(Debug, Clone)]
pub struct FakeLink {
    pub target: String,
    pub key: Option<String>,
    pub active: bool,
    pub in_sidebar: bool,
}

/// Document model the navigation effects are applied to
pub struct FakePage {
    pub history: MemoryHistory,
    pub container: String,
    pub sidebar: Vec<FakeLink>,
    pub content_links: Vec<FakeLink>,
    pub registry: LinkRegistry<Rc<Cell<u32>>>,
    pub navigated: Vec<String>,
    pub dispatches: Vec<Dispatch>,
    pub resizes: Vec<Duration>,
    pub fetches: Vec<NavTicket>,
    pub pages: PageInitRegistry<RefCell<Vec<String>>>,
    pub page_log: RefCell<Vec<String>>,
}

impl FakePage {
    pub fn new(sidebar_targets: &[&str]) -> Self {
        let pages = PageInitRegistry::new()
            .with("dashboard", |log: &RefCell<Vec<String>>| log.borrow_mut().push("dashboard".to_string()))
            .with("pdf", |log: &RefCell<Vec<String>>| log.borrow_mut().push("pdf".to_string()));
        Self {
            history: MemoryHistory::new(),
            container: String::new(),
            sidebar: sidebar_targets
                .iter()
                .map(|t| FakeLink {
                    target: t.to_string(),
                    key: None,
                    active: false,
                    in_sidebar: true,
                })
                .collect(),
            content_links: Vec::new(),
            registry: LinkRegistry::new(),
            navigated: Vec::new(),
            dispatches: Vec::new(),
            resizes: Vec::new(),
            fetches: Vec::new(),
            pages,
            page_log: RefCell::new(Vec::new()),
        }
    }

    pub fn apply(&mut self, effects: Vec<NavEffect>) {
        for effect in effects {
            match effect {
                NavEffect::ShowLoading => self.container = "loading".to_string(),
                NavEffect::Fetch(ticket) => self.fetches.push(ticket),
                NavEffect::ReplaceContent(html) => {
                    self.content_links = parse_links(&html);
                    self.container = html;
                }
                NavEffect::ShowError(message) => {
                    self.content_links.clear();
                    self.container = format!("error: {}", message);
                }
                NavEffect::RecordInitial(entry) => self.history.record_initial(&entry).unwrap(),
                NavEffect::PushHistory(entry) => self.history.push(&entry).unwrap(),
                NavEffect::SetActive(url) => {
                    let flags = active_states(self.sidebar.iter().map(|l| l.target.as_str()), &url);
                    for (link, flag) in self.sidebar.iter_mut().zip(flags) {
                        link.active = flag;
                    }
                }
                NavEffect::BindLinks => self.bind(),
                NavEffect::EmitNavigated(url) => self.navigated.push(url),
                NavEffect::DispatchPageInit => {
                    let marker = PageMarker::from_attribute(parse_marker(&self.container));
                    let outcome = self.pages.dispatch(marker.as_ref(), &self.page_log);
                    self.dispatches.push(outcome);
                }
                NavEffect::ScheduleResize(delay) => self.resizes.push(delay),
            }
        }
    }

    /// Bind the way the browser shell does: reconcile the registry, then
    /// write back the keys it stamped.
    pub fn bind(&mut self) {
        let links: Vec<&mut FakeLink> = self.sidebar.iter_mut().chain(self.content_links.iter_mut()).collect();
        let keys: Vec<Option<String>> = links.iter().map(|l| l.key.clone()).collect();
        let bindings = self.registry.sync(keys, || Rc::new(Cell::new(0)));
        for (link, binding) in links.into_iter().zip(bindings) {
            if binding.stamp {
                link.key = Some(binding.key);
            }
        }
    }

    /// Simulate a click; returns how many handlers ran
    pub fn click(&self, target: &str) -> u32 {
        let mut fired = 0;
        for link in self.sidebar.iter().chain(self.content_links.iter()) {
            if link.target != target {
                continue;
            }
            if let Some(counter) = link.key.as_deref().and_then(|k| self.registry.get(k)) {
                counter.set(counter.get() + 1);
                fired += 1;
            }
        }
        fired
    }

    pub fn active_targets(&self) -> Vec<&str> {
        self.sidebar
            .iter()
            .filter(|l| l.active)
            .map(|l| l.target.as_str())
            .collect()
    }

    pub fn take_fetch(&mut self) -> NavTicket {
        self.fetches.pop().expect("a fetch was issued")
    }
}

/// Pull `href="..."` values out of a fragment
fn parse_links(html: &str) -> Vec<FakeLink> {
    html.split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(|target| FakeLink {
            target: target.to_string(),
            key: None,
            active: false,
            in_sidebar: false,
        })
        .collect()
}

fn parse_marker(html: &str) -> Option<String> {
    html.split("data-page=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .map(str::to_string)
}

/// Partial source whose responses are released by the test
#[derive(Default)]
pub struct ScriptedSource {
    pending: RefCell<HashMap<String, oneshot::Sender<Result<String, Error>>>>,
}

impl ScriptedSource {
    pub fn resolve(&self, url: &str, result: Result<String, Error>) {
        let sender = self
            .pending
            .borrow_mut()
            .remove(url)
            .expect("fetch for url is pending");
        let _ = sender.send(result);
    }
}

#[async_trait(?Send)]
impl PartialSource for ScriptedSource {
    async fn fetch_partial(&self, url: &str) -> Result<String, Error> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().insert(url.to_string(), tx);
        rx.await.unwrap_or_else(|_| Err(Error::transport("cancelled")))
    }
}

// ============================================================================
// Chat fixtures
// ============================================================================

/// Backend with canned replies that records every call
#[derive(Default)]
pub struct FakeBackend {
    pub sent: RefCell<Vec<String>>,
    pub clears: Cell<u32>,
    pub history: RefCell<Vec<HistoryMessage>>,
    pub fail_send: Cell<bool>,
}

#[async_trait(?Send)]
impl ChatBackend for FakeBackend {
    async fn send_message(&self, text: &str) -> Result<BotReply, Error> {
        self.sent.borrow_mut().push(text.to_string());
        if self.fail_send.get() {
            return Err(Error::transport("connection refused"));
        }
        Ok(BotReply {
            text: format!("Respuesta a **{}**", text),
            sources: Default::default(),
        })
    }

    async fn clear_chat(&self) -> Result<(), Error> {
        self.clears.set(self.clears.get() + 1);
        Ok(())
    }

    async fn chat_history(&self) -> Result<Vec<HistoryMessage>, Error> {
        Ok(self.history.borrow().clone())
    }
}

/// Drives a chat session against a virtual clock and a fake backend,
/// the way the browser shell drives it against real timers and fetches.
pub struct ChatHarness {
    pub session: ChatSession<FixedClock>,
    pub backend: FakeBackend,
    pub now_ms: u64,
    pub timers: BTreeMap<(u64, u64), TimerToken>,
    pub dom: Vec<ChatMessage>,
    pub typing: bool,
    pub send_enabled: bool,
    pub visible: bool,
    /// When set, send requests wait in `held` until released
    pub hold_sends: bool,
    pub held: Vec<ChatRequest>,
}

impl ChatHarness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            session: ChatSession::with_clock(&config, FixedClock("12:00".to_string())),
            backend: FakeBackend::default(),
            now_ms: 0,
            timers: BTreeMap::new(),
            dom: Vec::new(),
            typing: false,
            send_enabled: true,
            visible: false,
            hold_sends: false,
            held: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        let effects = self.session.start();
        self.run(effects);
    }

    pub fn event(&mut self, event: ChatEvent) {
        let effects = self.session.handle(event);
        self.run(effects);
    }

    /// Advance virtual time, firing due timers in order
    pub fn advance(&mut self, ms: u64) {
        let until = self.now_ms + ms;
        loop {
            let due = match self.timers.keys().next() {
                Some(&(at, seq)) if at <= until => (at, seq),
                _ => break,
            };
            let token = self.timers.remove(&due).expect("due timer present");
            self.now_ms = due.0;
            self.event(ChatEvent::TimerFired(token));
        }
        self.now_ms = until;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn run(&mut self, effects: Vec<ChatEffect>) {
        for effect in effects {
            match effect {
                ChatEffect::ShowWidget => self.visible = true,
                ChatEffect::HideWidget => self.visible = false,
                ChatEffect::FocusInput | ChatEffect::ClearInput => {}
                ChatEffect::Append(rendered) => self.dom.push(rendered.message),
                ChatEffect::TruncateTranscript => {
                    if let Some(last) = self.dom.pop() {
                        self.dom = vec![last];
                    }
                }
                ChatEffect::ShowTyping => self.typing = true,
                ChatEffect::HideTyping => self.typing = false,
                ChatEffect::SetSendEnabled(enabled) => self.send_enabled = enabled,
                ChatEffect::StartTimer { token, delay } => {
                    let at = self.now_ms + delay.as_millis() as u64;
                    self.timers.insert((at, token.generation), token);
                }
                ChatEffect::CancelTimer(token) => {
                    self.timers.retain(|_, t| *t != token);
                }
                ChatEffect::Request(request @ ChatRequest::Send(_)) if self.hold_sends => {
                    self.held.push(request);
                }
                ChatEffect::Request(request) => {
                    let event = futures::executor::block_on(becabot_core::chat::perform(&self.backend, request));
                    self.event(event);
                }
            }
        }
    }

    /// Complete every held send request
    pub fn release_sends(&mut self) {
        self.hold_sends = false;
        for request in std::mem::take(&mut self.held) {
            let event = futures::executor::block_on(becabot_core::chat::perform(&self.backend, request));
            self.event(event);
        }
    }

    pub fn requests_sent(&self) -> usize {
        self.backend.sent.borrow().len()
    }
}

/// Requests issued by a batch of effects
pub fn requests(effects: &[ChatEffect]) -> Vec<ChatRequest> {
    effects
        .iter()
        .filter_map(|e| match e {
            ChatEffect::Request(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}
