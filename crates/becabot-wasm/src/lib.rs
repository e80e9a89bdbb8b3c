use becabot_core::ClientConfig;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

pub mod chat_ui;
mod dashboard;
pub mod dom;
pub mod history;
mod http;
mod navigation;
mod utils;
mod voice;

pub use becabot_core::types::*;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // The backend accepts everything; the configured level is applied via max_level
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
    log::set_max_level(log::LevelFilter::Info);

    log::info!("BecaBot WASM initialized");
}

/// Initialize partial navigation for the admin panel
#[wasm_bindgen]
pub async fn init_admin_panel(config_json: Option<String>) -> Result<(), JsValue> {
    let config = load_config(config_json.as_deref())?;
    log::info!("Initializing admin panel navigation");
    navigation::NavShell::new(config)?.start()
}

/// Initialize the floating chat widget
#[wasm_bindgen]
pub async fn init_chat_widget(config_json: Option<String>) -> Result<(), JsValue> {
    let config = load_config(config_json.as_deref())?;
    log::info!("Initializing chat widget");
    chat_ui::ChatWidget::new(config)?.start()
}

/// Parse the configuration and apply its log level
fn load_config(json: Option<&str>) -> Result<ClientConfig, JsValue> {
    let config = ClientConfig::from_json(json).map_err(|e| {
        log::error!("Invalid client configuration: {}", e);
        utils::js_error(e)
    })?;
    if let Ok(level) = config.level() {
        log::set_max_level(level.to_level_filter());
    }
    Ok(config)
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
