use becabot_types::{BotReply, ChatMessage, Error, HistoryMessage, Sources};
use std::time::Duration;

use super::render::render_message;
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::timer::{TimerKind, TimerSlot, TimerToken, TokenSource};

const BACKEND_ERROR_PREFIX: &str = "Lo siento, ocurrió un error al procesar tu consulta";
const TRANSPORT_ERROR_TEXT: &str =
    "Lo siento, no pude comunicarme con el servidor. Verifica tu conexión e inténtalo de nuevo.";

/// Flags shared by every state of an open widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub active: bool,
    pub greeted: bool,
    /// Pending inactivity timer
    pub timer: Option<TimerToken>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active: true,
            greeted: false,
            timer: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Closed,
    OpenIdle,
    OpenAwaitingResponse,
    ClosingOnTimeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Open,
    Close,
    Toggle,
    /// Keystroke in the input or click inside the chat box
    Activity,
    Submit(String),
    ReplyReceived(Result<BotReply, Error>),
    HistoryLoaded(Result<Vec<HistoryMessage>, Error>),
    ClearFinished(Result<(), Error>),
    TimerFired(TimerToken),
}

/// Backend calls the shell must issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    Send(String),
    Clear,
    History,
}

/// A transcript entry ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub message: ChatMessage,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    ShowWidget,
    HideWidget,
    FocusInput,
    Append(RenderedMessage),
    /// Remove every transcript entry except the most recent one
    TruncateTranscript,
    ClearInput,
    ShowTyping,
    HideTyping,
    SetSendEnabled(bool),
    StartTimer { token: TimerToken, delay: Duration },
    CancelTimer(TimerToken),
    Request(ChatRequest),
}

#[derive(Debug, Clone)]
struct Timing {
    inactivity: Duration,
    greeting: Duration,
    farewell: Duration,
}

/// Chat widget controller state. One instance per widget; nothing global.
pub struct ChatSession<C: Clock = SystemClock> {
    clock: C,
    timing: Timing,
    greeting_text: String,
    farewell_text: String,
    state: SessionState,
    open: bool,
    awaiting: bool,
    closing: bool,
    tokens: TokenSource,
    inactivity: TimerSlot,
    greeting: TimerSlot,
    farewell: TimerSlot,
    transcript: Vec<ChatMessage>,
}

impl ChatSession<SystemClock> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ChatSession<C> {
    pub fn with_clock(config: &ClientConfig, clock: C) -> Self {
        Self {
            clock,
            timing: Timing {
                inactivity: config.inactivity_timeout(),
                greeting: config.greeting_delay(),
                farewell: config.farewell_delay(),
            },
            greeting_text: config.greeting_text.clone(),
            farewell_text: config.farewell_text.clone(),
            state: SessionState::default(),
            open: false,
            awaiting: false,
            closing: false,
            tokens: TokenSource::default(),
            inactivity: TimerSlot::default(),
            greeting: TimerSlot::default(),
            farewell: TimerSlot::default(),
            transcript: Vec::new(),
        }
    }

    pub fn phase(&self) -> ChatPhase {
        if self.closing {
            ChatPhase::ClosingOnTimeout
        } else if !self.open {
            ChatPhase::Closed
        } else if self.awaiting {
            ChatPhase::OpenAwaitingResponse
        } else {
            ChatPhase::OpenIdle
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Effects to run when the widget is mounted
    pub fn start(&mut self) -> Vec<ChatEffect> {
        vec![ChatEffect::Request(ChatRequest::History)]
    }

    pub fn handle(&mut self, event: ChatEvent) -> Vec<ChatEffect> {
        let mut fx = Vec::new();
        match event {
            ChatEvent::Open => self.open(&mut fx),
            ChatEvent::Close => self.close(&mut fx),
            ChatEvent::Toggle => {
                if self.open {
                    self.close(&mut fx)
                } else {
                    self.open(&mut fx)
                }
            }
            ChatEvent::Activity => {
                if self.open {
                    self.reset_inactivity(&mut fx);
                }
            }
            ChatEvent::Submit(text) => self.submit(&text, &mut fx),
            ChatEvent::ReplyReceived(result) => self.reply(result, &mut fx),
            ChatEvent::HistoryLoaded(result) => self.restore(result, &mut fx),
            ChatEvent::ClearFinished(result) => self.cleared(result, &mut fx),
            ChatEvent::TimerFired(token) => self.timer_fired(token, &mut fx),
        }
        fx
    }

    fn open(&mut self, fx: &mut Vec<ChatEffect>) {
        if self.open {
            self.reset_inactivity(fx);
            return;
        }
        self.open = true;
        fx.push(ChatEffect::ShowWidget);
        fx.push(ChatEffect::FocusInput);

        if !self.state.greeted && !self.greeting.is_armed() {
            let (token, _) = self.greeting.arm(&mut self.tokens, TimerKind::Greeting);
            fx.push(ChatEffect::StartTimer {
                token,
                delay: self.timing.greeting,
            });
        }
        self.reset_inactivity(fx);
    }

    fn close(&mut self, fx: &mut Vec<ChatEffect>) {
        if !self.open {
            return;
        }
        self.open = false;
        fx.push(ChatEffect::HideWidget);

        if let Some(token) = self.inactivity.cancel() {
            fx.push(ChatEffect::CancelTimer(token));
        }
        if let Some(token) = self.greeting.cancel() {
            fx.push(ChatEffect::CancelTimer(token));
        }
        self.state.timer = None;
    }

    fn submit(&mut self, text: &str, fx: &mut Vec<ChatEffect>) {
        let text = text.trim();
        if text.is_empty() || !self.open || self.closing {
            return;
        }
        if self.awaiting {
            log::debug!("Ignoring submit while a reply is pending");
            return;
        }

        self.awaiting = true;
        let message = ChatMessage::user(text, self.clock.timestamp());
        self.append(message, None, fx);
        fx.push(ChatEffect::ClearInput);
        fx.push(ChatEffect::ShowTyping);
        fx.push(ChatEffect::SetSendEnabled(false));
        self.reset_inactivity(fx);
        fx.push(ChatEffect::Request(ChatRequest::Send(text.to_string())));
    }

    fn reply(&mut self, result: Result<BotReply, Error>, fx: &mut Vec<ChatEffect>) {
        if !self.awaiting {
            log::warn!("Reply received with no request in flight");
        }
        self.awaiting = false;
        fx.push(ChatEffect::HideTyping);
        fx.push(ChatEffect::SetSendEnabled(true));

        let now = self.clock.timestamp();
        match result {
            Ok(reply) => {
                let sources = (!reply.sources.is_empty()).then_some(reply.sources);
                self.append(ChatMessage::bot(reply.text, now), sources.as_ref(), fx);
            }
            Err(e) => {
                log::error!("Failed to send message: {}", e);
                self.append(ChatMessage::bot(reply_error_text(&e), now), None, fx);
            }
        }

        if self.open && !self.closing {
            self.reset_inactivity(fx);
        }
    }

    fn restore(&mut self, result: Result<Vec<HistoryMessage>, Error>, fx: &mut Vec<ChatEffect>) {
        let messages = match result {
            Ok(messages) => messages,
            Err(e) => {
                log::warn!("Could not restore chat history: {}", e);
                return;
            }
        };
        if messages.is_empty() {
            return;
        }

        log::info!("Restoring {} messages from history", messages.len());
        let now = self.clock.timestamp();
        for stored in messages {
            let message = ChatMessage {
                sender: stored.sender(),
                timestamp: stored.created_at.as_deref().map(short_time).unwrap_or_else(|| now.clone()),
                text: stored.content,
            };
            self.append(message, None, fx);
        }

        self.state.greeted = true;
        if let Some(token) = self.greeting.cancel() {
            fx.push(ChatEffect::CancelTimer(token));
        }
    }

    fn timer_fired(&mut self, token: TimerToken, fx: &mut Vec<ChatEffect>) {
        match token.kind {
            TimerKind::Greeting => {
                if self.greeting.fire(token) && !self.state.greeted {
                    let greeting = ChatMessage::bot(self.greeting_text.clone(), self.clock.timestamp());
                    self.append(greeting, None, fx);
                    self.state.greeted = true;
                }
            }
            TimerKind::Inactivity => {
                if !self.inactivity.fire(token) {
                    return;
                }
                self.state.timer = None;
                if self.closing {
                    return;
                }
                log::info!("Chat inactive, closing conversation");
                self.state.active = false;
                self.closing = true;
                let farewell = ChatMessage::bot(self.farewell_text.clone(), self.clock.timestamp());
                self.append(farewell, None, fx);
                let (token, _) = self.farewell.arm(&mut self.tokens, TimerKind::Farewell);
                fx.push(ChatEffect::StartTimer {
                    token,
                    delay: self.timing.farewell,
                });
            }
            TimerKind::Farewell => {
                if self.farewell.fire(token) {
                    fx.push(ChatEffect::Request(ChatRequest::Clear));
                }
            }
            TimerKind::AutoSubmit => {}
        }
    }

    fn cleared(&mut self, result: Result<(), Error>, fx: &mut Vec<ChatEffect>) {
        if !self.closing {
            log::warn!("Unexpected clear completion");
            return;
        }
        if let Err(e) = result {
            log::error!("Failed to clear conversation: {}", e);
        }

        if let Some(last) = self.transcript.pop() {
            self.transcript = vec![last];
        }
        fx.push(ChatEffect::TruncateTranscript);

        self.closing = false;
        self.state.active = true;
        self.state.greeted = false;
    }

    fn reset_inactivity(&mut self, fx: &mut Vec<ChatEffect>) {
        if self.closing {
            return;
        }
        let (token, replaced) = self.inactivity.arm(&mut self.tokens, TimerKind::Inactivity);
        if let Some(old) = replaced {
            fx.push(ChatEffect::CancelTimer(old));
        }
        self.state.timer = Some(token);
        fx.push(ChatEffect::StartTimer {
            token,
            delay: self.timing.inactivity,
        });
    }

    fn append(&mut self, message: ChatMessage, sources: Option<&Sources>, fx: &mut Vec<ChatEffect>) {
        let html = render_message(&message, sources);
        self.transcript.push(message.clone());
        fx.push(ChatEffect::Append(RenderedMessage { message, html }));
    }
}

/// Bot message shown in place of a reply that failed
fn reply_error_text(error: &Error) -> String {
    if error.is_transport() {
        return TRANSPORT_ERROR_TEXT.to_string();
    }
    match error {
        Error::BackendReported { message } => format!("{}: {}", BACKEND_ERROR_PREFIX, message),
        Error::HttpStatus { status } => {
            format!("{} (el servidor respondió con el código {}).", BACKEND_ERROR_PREFIX, status)
        }
        _ => format!("{}.", BACKEND_ERROR_PREFIX),
    }
}

/// `2024-01-01 10:05:00` -> `10:05`; anything else is passed through
fn short_time(created_at: &str) -> String {
    created_at
        .split_once(' ')
        .and_then(|(_, time)| time.get(..5))
        .map(str::to_string)
        .unwrap_or_else(|| created_at.to_string())
}
