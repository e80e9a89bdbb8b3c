//! Chat widget: session lifecycle, transcript rendering and the backend seam.

mod backend;
pub mod markdown;
pub mod render;
mod session;

pub use backend::{perform, ChatBackend};
pub use markdown::render_markdown;
pub use session::{ChatEffect, ChatEvent, ChatPhase, ChatRequest, ChatSession, RenderedMessage, SessionState};
