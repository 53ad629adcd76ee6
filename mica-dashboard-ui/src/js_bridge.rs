//! Typed wrappers around JS interop via `js_sys::eval()`.
//!
//! The OpenLayers map and the D3 histogram live in `assets/js/*.js` and are
//! loaded at runtime as globals. This module serializes Rust values and calls
//! those globals.

use mica_core::config::DashboardConfig;
use mica_core::map_view::{MapCommand, Popup};
use wasm_bindgen::JsValue;

// Embed the JS files at compile time
static MAP_JS: &str = include_str!("../assets/js/map.js");
static HISTOGRAM_CHART_JS: &str = include_str!("../assets/js/histogram-chart.js");

/// Global the host page may set to override the default configuration.
const CONFIG_GLOBAL: &str = "micaDashboardConfig";

/// Script evaluated with `document::eval` to forward map events to Rust.
pub const MAP_EVENTS_JS: &str = r#"
    window.micaMapEvents = function(event) { dioxus.send(event); };
    await new Promise(function() {});
"#;

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('MICA JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Escape a JSON document for embedding in a single-quoted JS string.
fn js_string(json: &str) -> String {
    json.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "")
}

/// Evaluate the map and chart scripts once OpenLayers and D3 are loaded.
///
/// The scripts are evaluated at global scope via indirect eval so their
/// function declarations become `window.*` globals.
pub fn init_scripts() {
    let all_js = [MAP_JS, HISTOGRAM_CHART_JS].join("\n");
    let store_js = format!(
        "window.__micaScripts = {};",
        serde_json::to_string(&all_js).unwrap_or_default()
    );
    let _ = js_sys::eval(&store_js);

    let init_js = r#"
        (function() {
            var waitForLibs = setInterval(function() {
                if (typeof d3 !== 'undefined' && typeof ol !== 'undefined') {
                    clearInterval(waitForLibs);
                    (0, eval)(window.__micaScripts);
                    delete window.__micaScripts;
                    window.__micaReady = true;
                    console.log('MICA scripts initialized');
                }
            }, 100);
        })();
    "#;
    let _ = js_sys::eval(init_js);
}

/// Create the OpenLayers map in `container_id` and apply any queued commands.
pub fn init_map(container_id: &str, config: &DashboardConfig) {
    let config_json = serde_json::json!({
        "initialLat": config.initial_lat,
        "initialLon": config.initial_lon,
        "initialZoom": config.initial_zoom,
    })
    .to_string();
    call_js(&format!(
        r#"
        (function() {{
            var poll = setInterval(function() {{
                if (window.__micaReady && document.getElementById('{container_id}')) {{
                    clearInterval(poll);
                    try {{
                        micaInitMap('{container_id}', '{config}');
                    }} catch(e) {{ console.error('[MICA] micaInitMap error:', e); }}
                }}
            }}, 100);
        }})();
        "#,
        config = js_string(&config_json),
    ));
}

/// Queue map commands; they are applied in order as soon as the map exists.
pub fn apply_map_commands(commands: &[MapCommand]) {
    let json = match serde_json::to_string(commands) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize map commands: {}", e);
            return;
        }
    };
    call_js(&format!(
        r#"
        window.__micaCommandQueue = (window.__micaCommandQueue || []).concat(JSON.parse('{}'));
        if (typeof micaFlushCommands !== 'undefined') micaFlushCommands();
        "#,
        js_string(&json)
    ));
}

pub fn show_popup(popup: &Popup) {
    let coordinate = serde_json::to_string(&popup.coordinate).unwrap_or_default();
    call_js(&format!(
        "if (typeof micaShowPopup !== 'undefined') micaShowPopup({}, '{}');",
        coordinate,
        js_string(&popup.to_html())
    ));
}

pub fn hide_popup() {
    call_js("if (typeof micaHidePopup !== 'undefined') micaHidePopup();");
}

/// Render the monthly histogram.
///
/// Polls until the scripts are initialized and the container exists.
pub fn render_histogram(container_id: &str, data_json: &str, config_json: &str) {
    call_js(&format!(
        r#"
        (function() {{
            var poll = setInterval(function() {{
                if (window.__micaReady && document.getElementById('{container_id}')) {{
                    clearInterval(poll);
                    try {{
                        renderHistogramChart('{container_id}', '{data}', '{config}');
                    }} catch(e) {{ console.error('[MICA] renderHistogramChart error:', e); }}
                }}
            }}, 100);
        }})();
        "#,
        data = js_string(data_json),
        config = js_string(config_json),
    ));
}

pub fn destroy_histogram(container_id: &str) {
    call_js(&format!(
        "if (typeof destroyHistogramChart !== 'undefined') destroyHistogramChart('{}');",
        container_id
    ));
}

/// Read `window.micaDashboardConfig` as JSON, if the page defines it.
pub fn page_config_json() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    js_sys::JSON::stringify(&value).ok().map(String::from)
}
