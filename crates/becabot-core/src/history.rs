use becabot_types::{Error, NavigationEntry};
use std::cell::RefCell;

/// Thin wrapper over the platform navigation-history stack
pub trait HistoryAdapter {
    /// Replace the current entry with `entry` without creating a new one
    fn record_initial(&self, entry: &NavigationEntry) -> Result<(), Error>;

    /// Create a new entry and make it current
    fn push(&self, entry: &NavigationEntry) -> Result<(), Error>;
}

/// URL to load for a back/forward step. Entries created outside this client
/// carry no state; those fall back to the displayed location.
pub fn resolve_popped(state: Option<NavigationEntry>, location: &str) -> String {
    match state {
        Some(entry) if !entry.url.is_empty() => entry.url,
        _ => location.to_string(),
    }
}

/// In-memory history stack with browser semantics: pushing drops any forward
/// entries, stepping back and forth moves a cursor.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: RefCell<Stack>,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<Option<NavigationEntry>>,
    cursor: usize,
}

impl MemoryHistory {
    /// A stack holding one foreign entry, like a freshly opened tab
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Stack {
                entries: vec![None],
                cursor: 0,
            }),
        }
    }

    /// Append an entry that carries no recorded state
    pub fn push_foreign(&self) {
        let mut stack = self.inner.borrow_mut();
        let cursor = stack.cursor;
        stack.entries.truncate(cursor + 1);
        stack.entries.push(None);
        stack.cursor += 1;
    }

    /// Step back, returning the state of the entry that became current
    pub fn back(&self) -> Option<Option<NavigationEntry>> {
        let mut stack = self.inner.borrow_mut();
        if stack.cursor == 0 {
            return None;
        }
        stack.cursor -= 1;
        Some(stack.entries[stack.cursor].clone())
    }

    /// Step forward, returning the state of the entry that became current
    pub fn forward(&self) -> Option<Option<NavigationEntry>> {
        let mut stack = self.inner.borrow_mut();
        if stack.cursor + 1 >= stack.entries.len() {
            return None;
        }
        stack.cursor += 1;
        Some(stack.entries[stack.cursor].clone())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current(&self) -> Option<NavigationEntry> {
        let stack = self.inner.borrow();
        stack.entries[stack.cursor].clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryAdapter for MemoryHistory {
    fn record_initial(&self, entry: &NavigationEntry) -> Result<(), Error> {
        let mut stack = self.inner.borrow_mut();
        let cursor = stack.cursor;
        stack.entries[cursor] = Some(entry.clone());
        Ok(())
    }

    fn push(&self, entry: &NavigationEntry) -> Result<(), Error> {
        let mut stack = self.inner.borrow_mut();
        let cursor = stack.cursor;
        stack.entries.truncate(cursor + 1);
        stack.entries.push(Some(entry.clone()));
        stack.cursor += 1;
        Ok(())
    }
}
