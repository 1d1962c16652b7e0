//! Page controller for settings-sync pages
//!
//! Loaded as a module by the settings pages, which call:
//! - `init_all(inSetup)` once the DOM is ready
//! - `changed(this)` / `changed(this, value)` from `onchange` handlers
//! - `trigger(url)` from buttons that only poke the server

mod dom;
mod events;
mod network;
mod page;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use settings_sync_protocol::{messages, ChangedControl};

use crate::dom::trace;
use crate::page::with_page;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// Load settings, wire the message panel and start live updates
///
/// The setup page reports settings it has no field for, and does not take
/// live `data` events so that edits in progress are not overwritten.
#[wasm_bindgen]
pub fn init_all(in_setup: bool) -> Result<(), JsValue> {
    with_page(|p| p.in_setup = in_setup);
    network::spawn_load_settings(in_setup);
    dom::init_messages()?;
    events::start_events(!in_setup);
    Ok(())
}

/// A field was edited: tell the server with `/changed/{key}/{value}`
#[wasm_bindgen]
pub fn changed(element: &Element, value: Option<String>) -> Result<(), JsValue> {
    let id = element.id();
    let name = element.get_attribute("name").unwrap_or_default();
    let current = prop_string(element, "value");
    let checked = js_sys::Reflect::get(element, &"checked".into())?
        .as_bool()
        .unwrap_or(false);

    trace(&messages::set_changed(&id, &name, &current));

    let control = ChangedControl {
        id: &id,
        name: &name,
        value: &current,
        checked,
    };
    let request = control.to_request(value.as_deref());
    network::send_get(network::origin_url(&request.path())?);
    Ok(())
}

/// Send a GET to `url` on the page origin, reporting failures
#[wasm_bindgen]
pub fn trigger(url: &str) -> Result<(), JsValue> {
    trace(&messages::send_trigger(url));
    network::send_get(network::origin_url(url)?);
    Ok(())
}

/// `value` property of inputs, selects and textareas alike
fn prop_string(element: &Element, prop: &str) -> String {
    js_sys::Reflect::get(element, &prop.into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}
