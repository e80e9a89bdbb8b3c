use becabot_core::HistoryAdapter;
use becabot_types::{Error, NavigationEntry};
use wasm_bindgen::JsValue;
use web_sys::History;

/// `window.history`, storing a [`NavigationEntry`] as each entry's state
pub struct BrowserHistory {
    history: History,
}

impl BrowserHistory {
    pub fn new(history: History) -> Self {
        Self { history }
    }
}

impl HistoryAdapter for BrowserHistory {
    fn record_initial(&self, entry: &NavigationEntry) -> Result<(), Error> {
        self.history
            .replace_state_with_url(&to_state(entry)?, "", Some(&entry.url))
            .map_err(|e| Error::transport(format!("{:?}", e)))
    }

    fn push(&self, entry: &NavigationEntry) -> Result<(), Error> {
        self.history
            .push_state_with_url(&to_state(entry)?, "", Some(&entry.url))
            .map_err(|e| Error::transport(format!("{:?}", e)))
    }
}

fn to_state(entry: &NavigationEntry) -> Result<JsValue, Error> {
    let json = serde_json::to_string(entry).map_err(Error::decode)?;
    js_sys::JSON::parse(&json).map_err(|e| Error::decode(format!("{:?}", e)))
}

/// Entry recorded in a popstate event's state. Entries pushed by other
/// scripts, or none at all, yield `None`.
pub fn entry_from_state(state: &JsValue) -> Option<NavigationEntry> {
    if state.is_null() || state.is_undefined() {
        return None;
    }
    let json: String = js_sys::JSON::stringify(state).ok()?.into();
    serde_json::from_str(&json).ok()
}
