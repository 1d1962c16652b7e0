//! `/events` stream with capped linear reconnect
//!
//! One `EventSource` at a time. When the browser gives up on it
//! (`readyState == CLOSED`) a single retry is scheduled through
//! `ReconnectBackoff`; the retry replaces the old source and its callbacks.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Event, EventSource, MessageEvent};

use settings_sync_protocol::{messages, EventKind, PageAction, ServerEvent, EVENTS_PATH};

use crate::dom::{load_data, show_message, trace};
use crate::network::spawn_load_settings;
use crate::page::{in_setup, with_page};

type Callback = Closure<dyn FnMut(Event)>;

/// Open source plus the callbacks it points to
struct Connection {
    source: EventSource,
    _callbacks: Vec<Callback>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.source.set_onopen(None);
        self.source.set_onerror(None);
        self.source.close();
    }
}

thread_local! {
    static CONNECTION: RefCell<Option<Connection>> = const { RefCell::new(None) };
}

/// Connect to /events. `data` events are only listened to when `with_data`.
pub fn start_events(with_data: bool) {
    with_page(|p| p.backoff.begin_connect());

    match connect(with_data) {
        Ok(connection) => {
            // Dropping the previous connection detaches and closes it
            CONNECTION.with(|c| c.replace(Some(connection)));
        }
        Err(e) => {
            web_sys::console::error_1(&e);
            show_message("### Events connection failed ###", true, true);
            schedule_reconnect(with_data);
        }
    }
}

fn connect(with_data: bool) -> Result<Connection, JsValue> {
    let source = EventSource::new(EVENTS_PATH)?;
    let mut callbacks = Vec::new();

    // ON OPEN
    let onopen: Callback = Closure::wrap(Box::new(move |_: Event| {
        with_page(|p| p.backoff.on_open());
        trace(messages::EVENTS_OPENED);
    }) as Box<dyn FnMut(_)>);
    source.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    callbacks.push(onopen);

    // ON ERROR: only a closed source needs us; otherwise the browser retries itself
    let errored = source.clone();
    let onerror: Callback = Closure::wrap(Box::new(move |_: Event| {
        let state = errored.ready_state();
        if state == EventSource::CLOSED {
            show_message(&messages::events_closed(state), true, true);
            schedule_reconnect(with_data);
        }
    }) as Box<dyn FnMut(_)>);
    source.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    callbacks.push(onerror);

    // NAMED EVENTS
    for kind in EventKind::ALL {
        if kind == EventKind::Data && !with_data {
            continue;
        }
        let name = kind.to_string();
        let listener: Callback = Closure::wrap(Box::new(move |e: Event| {
            // Connection failures also fire "error", without a payload
            let Some(payload) = e.dyn_ref::<MessageEvent>().and_then(|m| m.data().as_string()) else {
                return;
            };
            dispatch(&ServerEvent::new(kind.clone(), payload), with_data);
        }) as Box<dyn FnMut(_)>);
        source.add_event_listener_with_callback(&name, listener.as_ref().unchecked_ref())?;
        callbacks.push(listener);
    }

    Ok(Connection {
        source,
        _callbacks: callbacks,
    })
}

fn dispatch(event: &ServerEvent, with_data: bool) {
    match event.page_action(with_data) {
        PageAction::ReloadSettings => {
            web_sys::console::log_1(&format!("Settings: {}", event.payload).into());
            spawn_load_settings(in_setup());
        }
        PageAction::ShowInfo(text) => show_message(&text, true, false),
        PageAction::ShowError(text) => show_message(&text, true, true),
        PageAction::MergeData(json) => load_data(&json),
        PageAction::Ignore => {}
    }
}

/// Schedule one delayed `start_events`, unless one is already pending
fn schedule_reconnect(with_data: bool) {
    let Some(delay) = with_page(|p| p.backoff.on_closed()) else {
        return;
    };

    let Some(win) = window() else {
        return;
    };
    let retry = Closure::once_into_js(move || start_events(with_data));
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    if let Err(e) = win.set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), millis) {
        web_sys::console::error_1(&e);
    }
}
