//! Shared types for the becabot browser client
//!
//! This crate provides the data model and the JSON wire format used by the
//! navigation and chat crates. It has no browser dependency so it can be
//! tested on the host.

use serde::{Deserialize, Serialize};

pub mod error;
pub mod protocol;

pub use error::Error;
pub use protocol::*;

// ============================================================================
// Constants
// ============================================================================

/// Header marking a request as a partial-content request
pub const PARTIAL_HEADER_NAME: &str = "X-Requested-With";

/// Value sent with [`PARTIAL_HEADER_NAME`]
pub const PARTIAL_HEADER_VALUE: &str = "XMLHttpRequest";

/// Name of the event dispatched on `window` after a successful partial load
pub const NAVIGATED_EVENT: &str = "partial:navigated";

// ============================================================================
// Navigation Types
// ============================================================================

/// One history stack slot, as stored in the browser's history state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub url: String,
}

impl NavigationEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Page name carried by the root of a mounted partial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMarker {
    pub page_name: String,
}

impl PageMarker {
    /// Build a marker from a raw attribute value. Blank values carry no marker.
    pub fn from_attribute(value: Option<String>) -> Option<Self> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|page_name| Self { page_name })
    }
}

// ============================================================================
// Chat Types
// ============================================================================

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A single transcript entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: timestamp.into(),
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp: timestamp.into(),
        }
    }
}
