use becabot_types::PageMarker;
use std::collections::HashMap;

type Initializer<C> = Box<dyn Fn(&C)>;

/// Outcome of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The mounted content carries no page marker
    NoMarker,
    /// The marker names a page with no registered initializer
    Unknown(String),
    Ran(String),
}

/// Fixed registry of page initializers, keyed by page name. `C` is whatever
/// the initializers need to reach the mounted content.
pub struct PageInitRegistry<C> {
    initializers: HashMap<String, Initializer<C>>,
}

impl<C> PageInitRegistry<C> {
    pub fn new() -> Self {
        Self {
            initializers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, page_name: &str, init: F)
    where
        F: Fn(&C) + 'static,
    {
        self.initializers.insert(page_name.to_string(), Box::new(init));
    }

    pub fn with<F>(mut self, page_name: &str, init: F) -> Self
    where
        F: Fn(&C) + 'static,
    {
        self.register(page_name, init);
        self
    }

    pub fn contains(&self, page_name: &str) -> bool {
        self.initializers.contains_key(page_name)
    }

    /// Run the initializer matching `marker`. Missing markers and unknown
    /// page names are not errors.
    pub fn dispatch(&self, marker: Option<&PageMarker>, ctx: &C) -> Dispatch {
        let Some(marker) = marker else {
            return Dispatch::NoMarker;
        };
        match self.initializers.get(&marker.page_name) {
            Some(init) => {
                init(ctx);
                Dispatch::Ran(marker.page_name.clone())
            }
            None => {
                log::debug!("No initializer for page '{}'", marker.page_name);
                Dispatch::Unknown(marker.page_name.clone())
            }
        }
    }
}

impl<C> Default for PageInitRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
