//! Browser tests: `wasm-pack test --headless --firefox crates/becabot-wasm`

use becabot_types::NavigationEntry;
use becabot_wasm::chat_ui::truncate_transcript;
use becabot_wasm::dom;
use becabot_wasm::history::entry_from_state;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn test_query_all_in_document_order() {
    let document = document();
    let root = document.create_element("div").unwrap();
    root.set_inner_html(r#"<a data-partial-link href="/a/">a</a><p></p><a data-partial-link href="/b/">b</a>"#);
    document.body().unwrap().append_child(&root).unwrap();

    let links = dom::query_all_in(&root, "[data-partial-link]").unwrap();
    let hrefs: Vec<String> = links.iter().filter_map(|l| l.get_attribute("href")).collect();
    assert_eq!(hrefs, vec!["/a/", "/b/"]);
    root.remove();
}

#[wasm_bindgen_test]
fn test_missing_element_is_an_error() {
    assert!(dom::get_element_by_id(&document(), "doesNotExist").is_err());
    assert!(dom::query_element(&document(), "#doesNotExist").is_err());
}

#[wasm_bindgen_test]
fn test_show_and_hide_toggle_open_class() {
    let document = document();
    let element = dom::create_element_with_class(&document, "div", "chat-widget").unwrap();
    let element: web_sys::HtmlElement = wasm_bindgen::JsCast::dyn_into(element).unwrap();

    dom::show_element(&element);
    assert!(element.class_list().contains("open"));
    dom::hide_element(&element);
    assert!(!element.class_list().contains("open"));
    assert_eq!(element.style().get_property_value("display").unwrap(), "none");
}

#[wasm_bindgen_test]
fn test_history_state_round_trip() {
    let state = js_sys::JSON::parse(r#"{"url": "/admin-panel/pdf/"}"#).unwrap();
    assert_eq!(entry_from_state(&state), Some(NavigationEntry::new("/admin-panel/pdf/")));
    assert_eq!(entry_from_state(&JsValue::NULL), None);
    assert_eq!(entry_from_state(&JsValue::from_str("foreign")), None);
}

#[wasm_bindgen_test]
fn test_truncate_keeps_last_entry_and_typing_indicator() {
    let document = document();
    let messages = document.create_element("div").unwrap();
    messages.set_inner_html(concat!(
        r#"<div class="message user-message">hola</div>"#,
        r#"<div class="message bot-message">respuesta</div>"#,
        r#"<div class="message bot-message">farewell</div>"#,
        r#"<div id="typingIndicator" class="message bot-message typing-indicator"></div>"#,
    ));

    truncate_transcript(&messages).unwrap();

    let remaining = dom::query_all_in(&messages, ".message").unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].text_content().unwrap(), "farewell");
    assert!(remaining[1].class_list().contains("typing-indicator"));
}

#[wasm_bindgen_test]
fn test_truncate_without_indicator_keeps_last_entry() {
    let document = document();
    let messages = document.create_element("div").unwrap();
    messages.set_inner_html(r#"<div class="message">a</div><div class="message">b</div>"#);

    truncate_transcript(&messages).unwrap();

    let remaining = dom::query_all_in(&messages, ".message").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].text_content().unwrap(), "b");
}
