use becabot_core::chat::{perform, ChatEffect, ChatEvent, ChatSession};
use becabot_core::timer::as_millis_u32;
use becabot_core::{ClientConfig, TimerKind, TimerToken, VoiceEffect, VoiceEvent, VoiceInput};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent};

use crate::dom;
use crate::http::HttpChatBackend;
use crate::voice::{RecognitionSignal, Recognizer};

const TYPING_INDICATOR_ID: &str = "typingIndicator";

/// Transcript bubbles; the typing indicator is styled as one but is not an entry
const TRANSCRIPT_ENTRY_SELECTOR: &str = ".message:not(.typing-indicator)";

/// The floating chat widget
pub struct ChatWidget {
    inner: Rc<WidgetInner>,
}

struct WidgetInner {
    config: ClientConfig,
    document: Document,
    widget: HtmlElement,
    toggle: Element,
    messages: Element,
    input: HtmlInputElement,
    send_button: HtmlButtonElement,
    voice_button: Option<Element>,
    session: RefCell<ChatSession>,
    voice: RefCell<VoiceInput>,
    recognizer: RefCell<Option<Recognizer>>,
    backend: HttpChatBackend,
    timers: RefCell<HashMap<TimerKind, (TimerToken, Timeout)>>,
}

impl ChatWidget {
    pub fn new(config: ClientConfig) -> Result<Self, JsValue> {
        let document = crate::document()?;

        let inner = WidgetInner {
            widget: dom::get_html_element_by_id(&document, "chatWidget")?,
            toggle: dom::get_element_by_id(&document, "chatToggle")?,
            messages: dom::get_element_by_id(&document, "messagesContainer")?,
            input: dom::get_input_by_id(&document, "messageInput")?,
            send_button: dom::get_button_by_id(&document, "sendButton")?,
            voice_button: document.get_element_by_id("voiceButton"),
            session: RefCell::new(ChatSession::new(&config)),
            voice: RefCell::new(VoiceInput::new(false, config.auto_submit_delay())),
            recognizer: RefCell::new(None),
            backend: HttpChatBackend::new(&config),
            timers: RefCell::new(HashMap::new()),
            document,
            config,
        };

        Ok(Self { inner: Rc::new(inner) })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_toggle()?;
        self.setup_message_input()?;
        self.setup_voice()?;

        let effects = self.inner.session.borrow_mut().start();
        self.inner.apply_chat(effects);
        Ok(())
    }

    fn setup_toggle(&self) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        dom::listen(&self.inner.toggle, "click", move |_: MouseEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.dispatch(ChatEvent::Toggle);
            }
        })?;

        if let Some(close) = self.inner.document.get_element_by_id("chatClose") {
            let weak = Rc::downgrade(&self.inner);
            dom::listen(&close, "click", move |event: MouseEvent| {
                event.stop_propagation();
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(ChatEvent::Close);
                }
            })?;
        }

        // Any click inside the box counts as activity
        let weak = Rc::downgrade(&self.inner);
        dom::listen(&self.inner.widget, "click", move |_: MouseEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.dispatch(ChatEvent::Activity);
            }
        })
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        dom::listen(&self.inner.send_button, "click", move |event: MouseEvent| {
            event.prevent_default();
            if let Some(inner) = weak.upgrade() {
                inner.submit_input();
            }
        })?;

        // Enter key handler
        let weak = Rc::downgrade(&self.inner);
        dom::listen(&self.inner.input, "keydown", move |event: KeyboardEvent| {
            let Some(inner) = weak.upgrade() else { return };
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                inner.submit_input();
            } else {
                inner.dispatch(ChatEvent::Activity);
            }
        })
    }

    fn setup_voice(&self) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        let recognizer = Recognizer::create(&self.inner.config.voice_locale, move |signal| {
            let Some(inner) = weak.upgrade() else { return };
            let event = match signal {
                RecognitionSignal::Transcript { text, is_final: true } => VoiceEvent::Final(text),
                RecognitionSignal::Transcript { text, is_final: false } => VoiceEvent::Interim(text),
                RecognitionSignal::Error(code) => VoiceEvent::Failed(code),
                RecognitionSignal::End => VoiceEvent::Ended,
            };
            inner.dispatch_voice(event);
        });
        if recognizer.is_none() {
            log::info!("Speech recognition not available");
        }
        *self.inner.voice.borrow_mut() =
            VoiceInput::new(recognizer.is_some(), self.inner.config.auto_submit_delay());
        *self.inner.recognizer.borrow_mut() = recognizer;

        let Some(button) = &self.inner.voice_button else {
            return Ok(());
        };
        let weak = Rc::downgrade(&self.inner);
        dom::listen(button, "click", move |event: MouseEvent| {
            event.prevent_default();
            if let Some(inner) = weak.upgrade() {
                inner.dispatch_voice(VoiceEvent::Toggle);
            }
        })
    }
}

/// Remove every transcript entry in `messages` except the most recent one.
/// A pending typing indicator is left in place.
pub fn truncate_transcript(messages: &Element) -> Result<(), JsValue> {
    let entries = dom::query_all_in(messages, TRANSCRIPT_ENTRY_SELECTOR)?;
    if let Some((_, older)) = entries.split_last() {
        older.iter().for_each(Element::remove);
    }
    Ok(())
}

impl WidgetInner {
    fn submit_input(self: &Rc<Self>) {
        let text = self.input.value();
        self.dispatch(ChatEvent::Submit(text));
    }

    fn dispatch(self: &Rc<Self>, event: ChatEvent) {
        let effects = self.session.borrow_mut().handle(event);
        self.apply_chat(effects);
    }

    fn dispatch_voice(self: &Rc<Self>, event: VoiceEvent) {
        let effects = self.voice.borrow_mut().handle(event);
        self.apply_voice(effects);
    }

    fn apply_chat(self: &Rc<Self>, effects: Vec<ChatEffect>) {
        for effect in effects {
            if let Err(e) = self.run_chat(effect) {
                log::error!("Chat effect failed: {:?}", e);
            }
        }
    }

    fn run_chat(self: &Rc<Self>, effect: ChatEffect) -> Result<(), JsValue> {
        match effect {
            ChatEffect::ShowWidget => {
                dom::show_element(&self.widget);
                self.toggle.class_list().add_1("active")?;
            }
            ChatEffect::HideWidget => {
                dom::hide_element(&self.widget);
                self.toggle.class_list().remove_1("active")?;
            }
            ChatEffect::FocusInput => self.input.focus()?,
            ChatEffect::Append(rendered) => {
                let class = format!("message {}-message", rendered.message.sender.as_str());
                let element = dom::create_element_with_class(&self.document, "div", &class)?;
                element.set_inner_html(&rendered.html);
                self.insert_message(&element)?;
            }
            ChatEffect::TruncateTranscript => truncate_transcript(&self.messages)?,
            ChatEffect::ClearInput => self.input.set_value(""),
            ChatEffect::ShowTyping => {
                let indicator =
                    dom::create_element_with_class(&self.document, "div", "message bot-message typing-indicator")?;
                indicator.set_id(TYPING_INDICATOR_ID);
                indicator.set_inner_html("<span></span><span></span><span></span>");
                self.messages.append_child(&indicator)?;
                dom::scroll_to_bottom(&self.messages);
            }
            ChatEffect::HideTyping => {
                if let Some(indicator) = self.document.get_element_by_id(TYPING_INDICATOR_ID) {
                    indicator.remove();
                }
            }
            ChatEffect::SetSendEnabled(enabled) => self.send_button.set_disabled(!enabled),
            ChatEffect::StartTimer { token, delay } => self.schedule(token, delay),
            ChatEffect::CancelTimer(token) => self.cancel(token),
            ChatEffect::Request(request) => {
                let inner = Rc::clone(self);
                wasm_bindgen_futures::spawn_local(async move {
                    let event = perform(&inner.backend, request).await;
                    inner.dispatch(event);
                });
            }
        }
        Ok(())
    }

    /// Append a transcript entry, keeping the typing indicator last
    fn insert_message(&self, element: &Element) -> Result<(), JsValue> {
        match self.document.get_element_by_id(TYPING_INDICATOR_ID) {
            Some(indicator) => {
                self.messages.insert_before(element, Some(indicator.as_ref()))?;
            }
            None => {
                self.messages.append_child(element)?;
            }
        }
        dom::scroll_to_bottom(&self.messages);
        Ok(())
    }

    fn apply_voice(self: &Rc<Self>, effects: Vec<VoiceEffect>) {
        for effect in effects {
            match effect {
                VoiceEffect::StartRecognition => {
                    let started = match self.recognizer.borrow().as_ref() {
                        Some(recognizer) => recognizer.start(),
                        None => Err(JsValue::from_str("no recognizer")),
                    };
                    if let Err(e) = started {
                        self.dispatch_voice(VoiceEvent::StartFailed(format!("{:?}", e)));
                    }
                }
                VoiceEffect::StopRecognition => {
                    if let Some(recognizer) = self.recognizer.borrow().as_ref() {
                        if let Err(e) = recognizer.stop() {
                            log::warn!("Failed to stop speech recognition: {:?}", e);
                        }
                    }
                }
                VoiceEffect::SetListening(listening) => {
                    if let Some(button) = &self.voice_button {
                        let _ = button.class_list().toggle_with_force("listening", listening);
                    }
                }
                VoiceEffect::SetInput(text) => self.input.set_value(&text),
                VoiceEffect::StartTimer { token, delay } => self.schedule(token, delay),
                VoiceEffect::CancelTimer(token) => self.cancel(token),
                VoiceEffect::Submit => self.submit_input(),
                VoiceEffect::Alert(message) => {
                    if let Ok(window) = crate::window() {
                        let _ = window.alert_with_message(&message);
                    }
                }
            }
        }
    }

    /// Arm a browser timeout for `token`, replacing any pending one of its kind
    fn schedule(self: &Rc<Self>, token: TimerToken, delay: Duration) {
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(as_millis_u32(delay), move || {
            let Some(inner) = weak.upgrade() else { return };
            let fired = inner.timers.borrow_mut().remove(&token.kind);
            // The running callback is owned by `fired`; release it afterwards
            wasm_bindgen_futures::spawn_local(async move { drop(fired) });
            match token.kind {
                TimerKind::AutoSubmit => inner.dispatch_voice(VoiceEvent::TimerFired(token)),
                _ => inner.dispatch(ChatEvent::TimerFired(token)),
            }
        });
        self.timers.borrow_mut().insert(token.kind, (token, timeout));
    }

    /// Dropping a gloo timeout clears it
    fn cancel(&self, token: TimerToken) {
        let mut timers = self.timers.borrow_mut();
        if timers.get(&token.kind).is_some_and(|(pending, _)| *pending == token) {
            timers.remove(&token.kind);
        }
    }
}
