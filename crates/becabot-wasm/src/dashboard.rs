//! Admin panel page initializers.
//!
//! Chart rendering belongs to the page's own scripts; the dashboard
//! initializer only sizes the `[data-chart]` placeholders and labels them so
//! the layout is stable before the charts draw.

use becabot_core::PageInitRegistry;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, Window};

use crate::dom;

const CHART_SELECTOR: &str = "[data-chart]";
const CHART_ASPECT: f64 = 0.5;

/// Initializers for every admin section the server renders
pub fn page_registry() -> PageInitRegistry<Element> {
    PageInitRegistry::new()
        .with("dashboard", init_dashboard)
        .with("corpus", |_: &Element| log::debug!("Corpus page ready"))
        .with("pdf", |_: &Element| log::debug!("PDF page ready"))
        .with("messages", |_: &Element| log::debug!("Messages page ready"))
        .with("scraping", |_: &Element| log::debug!("Scraping page ready"))
}

fn init_dashboard(container: &Element) {
    let charts = match dom::query_all_in(container, CHART_SELECTOR) {
        Ok(charts) => charts,
        Err(e) => {
            log::error!("Failed to look up chart placeholders: {:?}", e);
            return;
        }
    };
    for chart in &charts {
        if chart.child_element_count() == 0 {
            let name = chart.get_attribute("data-chart").unwrap_or_default();
            chart.set_inner_html(&format!(
                r#"<div class="chart-placeholder">{}</div>"#,
                becabot_core::utils::escape_html(&name)
            ));
        }
        measure(chart);
    }
    log::info!("Dashboard initialized with {} charts", charts.len());
}

/// Give a placeholder a height proportional to its current width
fn measure(chart: &Element) {
    if let Ok(chart) = chart.clone().dyn_into::<HtmlElement>() {
        let height = (chart.offset_width() as f64 * CHART_ASPECT).round();
        let _ = chart.style().set_property("min-height", &format!("{}px", height));
    }
}

/// Re-measure every chart on the page whenever the window resizes.
/// Installed once; it looks charts up on each event so swapped content is
/// covered without re-registering.
pub fn install_resize_handler(window: &Window) -> Result<(), JsValue> {
    let document = crate::document()?;
    dom::listen(window, "resize", move |_: web_sys::Event| {
        if let Ok(charts) = dom::query_all(&document, CHART_SELECTOR) {
            charts.iter().for_each(measure);
        }
    })
}
