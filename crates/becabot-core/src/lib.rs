//! State machines for the becabot browser client
//!
//! Everything in this crate is free of browser bindings. Each state machine
//! consumes events and returns a list of effects; the wasm shell executes the
//! effects against the DOM, the network and the timer queue, and feeds the
//! outcomes back in as new events.

pub mod binder;
pub mod chat;
pub mod clock;
pub mod config;
pub mod csrf;
pub mod history;
pub mod navigation;
pub mod page_init;
pub mod timer;
pub mod utils;
pub mod voice;

pub use becabot_types as types;

pub use binder::{active_states, LinkBinding, LinkRegistry};
pub use chat::{ChatBackend, ChatEffect, ChatEvent, ChatPhase, ChatRequest, ChatSession, SessionState};
pub use clock::{Clock, SystemClock};
pub use config::ClientConfig;
pub use history::{resolve_popped, HistoryAdapter, MemoryHistory};
pub use navigation::{NavEffect, NavTicket, Navigator, PartialSource};
pub use page_init::{Dispatch, PageInitRegistry};
pub use timer::{TimerKind, TimerToken};
pub use voice::{RecognitionErrorCode, RecognitionState, VoiceEffect, VoiceEvent, VoiceInput};
