//! Bookkeeping for click interception on internal navigation links.
//!
//! Handlers are kept in a registry keyed by a per-element key, so binding
//! again after a content swap only attaches handlers to links that do not
//! have one yet.

use std::collections::{HashMap, HashSet};

/// Attribute the shell stamps on bound link elements
pub const BINDING_KEY_ATTRIBUTE: &str = "data-nav-key";

/// What the shell must do for one link after [`LinkRegistry::sync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBinding {
    pub key: String,
    /// The element carried no key yet; `key` must be written to it
    pub stamp: bool,
    /// A handler was created for `key` and must be attached to the element
    pub attach: bool,
}

#[derive(Debug)]
pub struct LinkRegistry<H> {
    handlers: HashMap<String, H>,
    next_key: u64,
}

impl<H> LinkRegistry<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_key: 0,
        }
    }

    /// A key no element has carried before
    pub fn next_key(&mut self) -> String {
        self.next_key += 1;
        format!("nav-{}", self.next_key)
    }

    /// Attach a handler for `key` unless one already exists.
    /// Returns true when a handler was created.
    pub fn ensure(&mut self, key: &str, make: impl FnOnce() -> H) -> bool {
        if self.handlers.contains_key(key) {
            return false;
        }
        self.handlers.insert(key.to_string(), make());
        true
    }

    /// Drop handlers whose elements left the document. Returns how many.
    pub fn retain_live(&mut self, live: &HashSet<String>) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|key, _| live.contains(key));
        before - self.handlers.len()
    }

    /// Reconcile the registry with the links now in the document, given in
    /// document order by their current key attribute. Links without a key
    /// get a fresh one, links without a handler get one from `make`, and
    /// handlers of links that are gone are released. The result lines up
    /// with the input.
    pub fn sync<I>(&mut self, keys: I, mut make: impl FnMut() -> H) -> Vec<LinkBinding>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut live = HashSet::new();
        let mut bindings = Vec::new();
        for existing in keys {
            let (key, stamp) = match existing {
                Some(key) => (key, false),
                None => (self.next_key(), true),
            };
            let attach = self.ensure(&key, &mut make);
            live.insert(key.clone());
            bindings.push(LinkBinding { key, stamp, attach });
        }
        let released = self.retain_live(&live);
        log::debug!(
            "Bound {} new links, released {}",
            bindings.iter().filter(|b| b.attach).count(),
            released
        );
        bindings
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.handlers.get(key)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H> Default for LinkRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Active flags for a list of link targets: set exactly where the target
/// equals `url` (plain string equality).
pub fn active_states<'a, I>(targets: I, url: &str) -> Vec<bool>
where
    I: IntoIterator<Item = &'a str>,
{
    targets.into_iter().map(|target| target == url).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_is_idempotent() {
        let mut registry: LinkRegistry<u32> = LinkRegistry::new();
        let key = registry.next_key();
        assert!(registry.ensure(&key, || 1));
        assert!(!registry.ensure(&key, || 2));
        assert_eq!(registry.get(&key), Some(&1));
    }

    #[test]
    fn test_keys_are_unique() {
        let mut registry: LinkRegistry<()> = LinkRegistry::new();
        let a = registry.next_key();
        let b = registry.next_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_retain_live_drops_removed_links() {
        let mut registry: LinkRegistry<()> = LinkRegistry::new();
        let a = registry.next_key();
        let b = registry.next_key();
        registry.ensure(&a, || ());
        registry.ensure(&b, || ());
        let live: HashSet<String> = [a.clone()].into_iter().collect();
        assert_eq!(registry.retain_live(&live), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&a).is_some());
    }

    #[test]
    fn test_sync_stamps_and_attaches_once() {
        let mut registry: LinkRegistry<u32> = LinkRegistry::new();
        let mut made = 0;
        let first = registry.sync([None, None], || {
            made += 1;
            made
        });
        assert!(first.iter().all(|b| b.stamp && b.attach));
        assert_ne!(first[0].key, first[1].key);

        let keys: Vec<Option<String>> = first.iter().map(|b| Some(b.key.clone())).collect();
        for _ in 0..3 {
            let again = registry.sync(keys.clone(), || unreachable!("handler already attached"));
            assert!(again.iter().all(|b| !b.stamp && !b.attach));
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(made, 2);
    }

    #[test]
    fn test_sync_releases_removed_links() {
        let mut registry: LinkRegistry<()> = LinkRegistry::new();
        let first = registry.sync([None, None, None], || ());
        let kept = Some(first[1].key.clone());
        let second = registry.sync([kept, None], || ());

        assert_eq!(second[0], LinkBinding { key: first[1].key.clone(), stamp: false, attach: false });
        assert!(second[1].stamp && second[1].attach);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&first[0].key).is_none());
    }

    #[test]
    fn test_sync_reattaches_unknown_key() {
        // Markup that arrives already stamped, e.g. copied from a bound page
        let mut registry: LinkRegistry<()> = LinkRegistry::new();
        let bindings = registry.sync([Some("nav-99".to_string())], || ());
        assert_eq!(bindings[0], LinkBinding { key: "nav-99".to_string(), stamp: false, attach: true });
    }

    #[test]
    fn test_active_states_exact_match() {
        let targets = ["/admin-panel/", "/admin-panel/pdf/", "/admin-panel/pdf"];
        assert_eq!(
            active_states(targets, "/admin-panel/pdf/"),
            vec![false, true, false]
        );
        assert_eq!(active_states(targets, "/nowhere/"), vec![false, false, false]);
    }
}
