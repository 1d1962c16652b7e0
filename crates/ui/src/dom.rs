use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlElement, HtmlInputElement, NodeList};

use settings_sync_protocol::messages;
use settings_sync_protocol::{binding, Binding, ElementKind, SettingValue, SettingsMap, Target};

use crate::page::{trace_enabled, with_page};

/// Get document helper
fn get_document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// Show a message on the console and/or on top of the `#messages` panel
pub fn show_message(message: &str, on_browser: bool, on_console: bool) {
    if on_console {
        web_sys::console::log_1(&message.into());
    }
    if !on_browser {
        return;
    }
    if let Some(doc) = get_document() {
        if let Some(panel) = doc.get_element_by_id("messages") {
            if let Ok(line) = doc.create_element("div") {
                line.set_text_content(Some(message));
                let _ = panel.prepend_with_node_1(&line);
            }
        }
    }
}

/// Trace message: always on the console, in the panel only in trace mode
pub fn trace(message: &str) {
    show_message(message, trace_enabled(), true);
}

/// Double click on the panel toggles its height
pub fn init_messages() -> Result<(), JsValue> {
    let Some(panel) = get_document().and_then(|doc| doc.get_element_by_id("messages")) else {
        return Ok(());
    };

    let target = panel.clone();
    let ondblclick = Closure::wrap(Box::new(move || {
        let extended = with_page(|p| {
            p.messages_extended = !p.messages_extended;
            p.messages_extended
        });
        target.set_class_name(messages::panel_class(extended));
    }) as Box<dyn FnMut()>);
    panel.add_event_listener_with_callback("dblclick", ondblclick.as_ref().unchecked_ref())?;
    ondblclick.forget();

    Ok(())
}

/// Write every setting into the page. Missing keys are reported when asked.
pub fn apply_settings(settings: &SettingsMap, report_missing: bool) {
    for (key, value) in settings {
        if !set_data(key, value) && report_missing {
            show_message(&messages::missing_key(key), true, true);
        }
    }
}

/// Keys dropped while parsing still leave the rest of the document usable
pub fn report_skipped(skipped: &[String]) {
    for key in skipped {
        show_message(&messages::skipped_key(key), true, true);
    }
}

/// Merge a pushed `data` fragment. Missing keys are always reported.
pub fn load_data(json: &str) {
    match settings_sync_protocol::parse_settings_lossy(json) {
        Ok((fragment, skipped)) => {
            report_skipped(&skipped);
            apply_settings(&fragment, true);
        }
        Err(e) => show_message(&format!("Bad data event: {e}"), true, true),
    }
}

/// Write one setting. Returns false if nothing on the page carries the key.
pub fn set_data(key: &str, value: &SettingValue) -> bool {
    let Some(doc) = get_document() else {
        return false;
    };

    let by_id = doc.get_element_by_id(key);
    let by_name = if by_id.is_none() {
        Some(doc.get_elements_by_name(key)).filter(|list| list.length() > 0)
    } else {
        None
    };

    let target = match (&by_id, &by_name) {
        (Some(el), _) => Target::ById(classify(key, el)),
        (None, Some(_)) => Target::ByName,
        (None, None) => Target::Missing,
    };

    let binding = binding::resolve(target, value);
    match (by_id, by_name) {
        (Some(el), _) => apply_to_element(&el, &binding),
        (None, Some(list)) => apply_to_group(&list, &binding),
        (None, None) => {}
    }

    binding != Binding::Missing
}

fn classify(key: &str, el: &Element) -> ElementKind {
    let input_type = el.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::type_);
    ElementKind::classify(key, &el.node_name(), input_type.as_deref())
}

fn apply_to_element(el: &Element, binding: &Binding) {
    match binding {
        Binding::Checked(checked) => {
            if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                input.set_checked(*checked);
            }
        }
        Binding::Hidden(hidden) => {
            web_sys::console::log_1(&format!("{} is {hidden}", el.id()).into());
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                html.set_hidden(*hidden);
            }
        }
        Binding::Value(value) => {
            if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                input.set_value(value);
            }
        }
        Binding::Text(text) => {
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                html.set_inner_text(text);
            }
        }
        Binding::CheckMatching(_) | Binding::Missing => {}
    }
}

/// Radio groups: check the member whose value matches
fn apply_to_group(list: &NodeList, binding: &Binding) {
    let Binding::CheckMatching(wanted) = binding else {
        return;
    };
    for i in 0..list.length() {
        if let Some(input) = list.get(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) {
            input.set_checked(input.value() == *wanted);
        }
    }
}
