//! Texts shown in the page's `#messages` panel

use crate::value::{SettingValue, SettingsMap};

/// Setting that turns on trace messages in the panel
pub const TRACE_KEY: &str = "traceJava";

/// Panel classes, toggled by double click
pub const PANEL_SMALL: &str = "smallScroll";
pub const PANEL_LARGE: &str = "largeScroll";

pub const fn panel_class(extended: bool) -> &'static str {
    if extended {
        PANEL_LARGE
    } else {
        PANEL_SMALL
    }
}

/// Trace flag carried by a settings document, if any
///
/// Loose equality with `true`: a number equal to 1, or text that reads as 1
/// (`"1"`, `" 1.0 "`), also counts.
#[allow(clippy::float_cmp)]
pub fn trace_flag(settings: &SettingsMap) -> Option<bool> {
    settings.get(TRACE_KEY).map(|value| match value {
        SettingValue::Bool(b) => *b,
        SettingValue::Number(n) => *n == 1.0,
        SettingValue::Text(s) => s.trim().parse::<f64>().is_ok_and(|n| n == 1.0),
    })
}

pub fn missing_key(key: &str) -> String {
    format!("### Can't find {key} in document ###")
}

pub fn skipped_key(key: &str) -> String {
    format!("### Ignoring {key}: not a boolean, number or string ###")
}

pub fn http_failure(url: &str, status: u16, body: &str) -> String {
    format!("{url} returned {status}/{body}")
}

pub const EVENTS_OPENED: &str = "# Events opened #";

pub fn events_closed(ready_state: u16) -> String {
    format!("### Events closed ({ready_state}) ###")
}

pub fn stream_error(text: &str) -> String {
    format!("*** {text} ***")
}

pub fn set_changed(id: &str, name: &str, value: &str) -> String {
    format!("# Set changed {id}:{name}:{value} #")
}

pub fn send_trigger(url: &str) -> String {
    format!("# Send message to {url} #")
}
