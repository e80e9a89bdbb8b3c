use std::time::Duration;

/// The fixed-duration waits the client schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Greeting,
    Inactivity,
    Farewell,
    AutoSubmit,
}

/// Identifies one scheduling of a timer. A firing is only honoured when its
/// token is still the pending one for its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Issues tokens with strictly increasing generations
#[derive(Debug, Default)]
pub struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub fn issue(&mut self, kind: TimerKind) -> TimerToken {
        self.next += 1;
        TimerToken {
            kind,
            generation: self.next,
        }
    }
}

/// A single cancellable timer slot
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<TimerToken>,
}

impl TimerSlot {
    /// Arm the slot, returning the new token and the one it replaced
    pub fn arm(&mut self, tokens: &mut TokenSource, kind: TimerKind) -> (TimerToken, Option<TimerToken>) {
        let token = tokens.issue(kind);
        (token, self.pending.replace(token))
    }

    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take()
    }

    /// Consume a firing. Returns false for stale or cancelled tokens.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

/// Milliseconds for browser timer APIs, saturating at `u32::MAX`
pub fn as_millis_u32(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}
