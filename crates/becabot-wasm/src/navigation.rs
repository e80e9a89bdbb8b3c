use becabot_core::binder::BINDING_KEY_ATTRIBUTE;
use becabot_core::navigation::drive;
use becabot_core::utils::escape_html;
use becabot_core::{active_states, ClientConfig, HistoryAdapter, LinkRegistry, NavEffect, Navigator, PageInitRegistry};
use becabot_types::{PageMarker, NAVIGATED_EVENT};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Event, MouseEvent, PopStateEvent, Window};

use crate::dashboard;
use crate::dom;
use crate::history::{entry_from_state, BrowserHistory};
use crate::http::PartialClient;
use crate::utils;

const LOADING_HTML: &str = r#"<div class="partial-loading"><div class="spinner"></div><p>Cargando...</p></div>"#;

type ClickHandler = Closure<dyn FnMut(MouseEvent)>;

/// Partial navigation for the admin panel
pub struct NavShell {
    inner: Rc<NavInner>,
}

struct NavInner {
    config: ClientConfig,
    window: Window,
    document: Document,
    container: Element,
    navigator: RefCell<Navigator>,
    history: BrowserHistory,
    source: PartialClient,
    links: RefCell<LinkRegistry<ClickHandler>>,
    pages: PageInitRegistry<Element>,
}

impl NavShell {
    pub fn new(config: ClientConfig) -> Result<Self, JsValue> {
        let window = crate::window()?;
        let document = crate::document()?;
        let container = dom::query_element(&document, &config.container_selector)?;
        let history = BrowserHistory::new(window.history()?);

        let inner = NavInner {
            navigator: RefCell::new(Navigator::new(config.resize_delay())),
            config,
            window,
            document,
            container,
            history,
            source: PartialClient,
            links: RefCell::new(LinkRegistry::new()),
            pages: dashboard::page_registry(),
        };

        Ok(Self { inner: Rc::new(inner) })
    }

    /// Adopt the server-rendered page and start intercepting navigation
    pub fn start(self) -> Result<(), JsValue> {
        self.setup_popstate()?;
        dashboard::install_resize_handler(&self.inner.window)?;

        let url = utils::current_location()?;
        let effects = self.inner.navigator.borrow_mut().initial(&url);
        self.inner.apply(effects);
        Ok(())
    }

    fn setup_popstate(&self) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        dom::listen(&self.inner.window, "popstate", move |event: PopStateEvent| {
            let Some(inner) = weak.upgrade() else { return };
            let state = entry_from_state(&event.state());
            let location = match utils::current_location() {
                Ok(location) => location,
                Err(e) => {
                    log::error!("Cannot read location on popstate: {:?}", e);
                    return;
                }
            };
            let effects = inner.navigator.borrow_mut().popped(state, &location);
            inner.apply(effects);
        })
    }
}

impl NavInner {
    /// Execute navigator effects in order
    fn apply(self: &Rc<Self>, effects: Vec<NavEffect>) {
        for effect in effects {
            if let Err(e) = self.run(effect) {
                log::error!("Navigation effect failed: {:?}", e);
            }
        }
    }

    fn run(self: &Rc<Self>, effect: NavEffect) -> Result<(), JsValue> {
        match effect {
            NavEffect::ShowLoading => self.container.set_inner_html(LOADING_HTML),
            NavEffect::Fetch(ticket) => {
                let inner = Rc::clone(self);
                wasm_bindgen_futures::spawn_local(async move {
                    let effects = drive(&inner.navigator, &inner.source, ticket).await;
                    inner.apply(effects);
                });
            }
            NavEffect::ReplaceContent(html) => self.container.set_inner_html(&html),
            NavEffect::ShowError(message) => self.container.set_inner_html(&format!(
                r#"<div class="alert alert-danger" role="alert"><strong>Error:</strong> {}</div>"#,
                escape_html(&message)
            )),
            NavEffect::RecordInitial(entry) => self.history.record_initial(&entry).map_err(utils::js_error)?,
            NavEffect::PushHistory(entry) => self.history.push(&entry).map_err(utils::js_error)?,
            NavEffect::SetActive(url) => self.mark_active(&url)?,
            NavEffect::BindLinks => self.bind_links()?,
            NavEffect::EmitNavigated(url) => {
                let detail = js_sys::Object::new();
                js_sys::Reflect::set(&detail, &JsValue::from_str("url"), &JsValue::from_str(&url))?;
                let init = CustomEventInit::new();
                init.set_detail(&detail);
                let event = CustomEvent::new_with_event_init_dict(NAVIGATED_EVENT, &init)?;
                self.window.dispatch_event(&event)?;
            }
            NavEffect::DispatchPageInit => {
                let attribute = &self.config.page_marker_attribute;
                let marker = self
                    .container
                    .query_selector(&format!("[{}]", attribute))?
                    .and_then(|root| PageMarker::from_attribute(root.get_attribute(attribute)));
                let outcome = self.pages.dispatch(marker.as_ref(), &self.container);
                log::debug!("Page init: {:?}", outcome);
            }
            NavEffect::ScheduleResize(delay) => {
                let window = self.window.clone();
                Timeout::new(becabot_core::timer::as_millis_u32(delay), move || {
                    match Event::new("resize") {
                        Ok(event) => {
                            if let Err(e) = window.dispatch_event(&event) {
                                log::error!("Failed to dispatch resize event: {:?}", e);
                            }
                        }
                        Err(e) => log::error!("Failed to create resize event: {:?}", e),
                    }
                })
                .forget();
            }
        }
        Ok(())
    }

    fn mark_active(&self, url: &str) -> Result<(), JsValue> {
        let links = dom::query_all(&self.document, &self.config.sidebar_link_selector)?;
        let targets: Vec<String> = links
            .iter()
            .map(|link| link.get_attribute("href").unwrap_or_default())
            .collect();
        let states = active_states(targets.iter().map(String::as_str), url);
        for (link, active) in links.iter().zip(states) {
            link.class_list().toggle_with_force("active", active)?;
        }
        Ok(())
    }

    /// Attach click interception to every navigation link that has none yet
    fn bind_links(self: &Rc<Self>) -> Result<(), JsValue> {
        let links = dom::query_all(&self.document, &self.config.nav_link_selector)?;
        let keys = links.iter().map(|link| link.get_attribute(BINDING_KEY_ATTRIBUTE));
        let weak = Rc::downgrade(self);
        let mut registry = self.links.borrow_mut();
        let bindings = registry.sync(keys, || click_handler(weak.clone()));

        for (link, binding) in links.iter().zip(&bindings) {
            if binding.stamp {
                link.set_attribute(BINDING_KEY_ATTRIBUTE, &binding.key)?;
            }
            if binding.attach {
                if let Some(handler) = registry.get(&binding.key) {
                    link.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
                }
            }
        }
        Ok(())
    }
}

fn click_handler(weak: Weak<NavInner>) -> ClickHandler {
    Closure::wrap(Box::new(move |event: MouseEvent| {
        // Let the browser handle new-tab and download clicks
        if event.ctrl_key() || event.meta_key() || event.shift_key() || event.button() != 0 {
            return;
        }
        let href = event
            .current_target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|link| link.get_attribute("href"));
        let (Some(inner), Some(href)) = (weak.upgrade(), href) else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();
        let effects = inner.navigator.borrow_mut().navigate(&href, true);
        inner.apply(effects);
    }) as Box<dyn FnMut(MouseEvent)>)
}
