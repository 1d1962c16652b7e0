//! `/changed/{key}/{value}` notifications sent when the user edits a field

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Route prefix for edit notifications
pub const CHANGED_PREFIX: &str = "/changed";

/// Id prefixes of controls that report their `checked` state
pub const CHECKED_PREFIXES: [&str; 3] = ["trace", "enable", "led"];

/// Characters left alone by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The edited control, as read from the DOM
#[derive(Debug, Clone, Copy)]
pub struct ChangedControl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub value: &'a str,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub key: String,
    pub value: String,
}

impl ChangedControl<'_> {
    /// Pick the key/value pair to report
    ///
    /// An explicit (non-empty) value always wins, keyed by id. Switch-like
    /// controls report `checked`. Otherwise the name is preferred over the id.
    pub fn to_request(&self, explicit: Option<&str>) -> ChangeRequest {
        let (key, value) = match explicit.filter(|v| !v.is_empty()) {
            Some(value) => (self.id, value.to_string()),
            None if CHECKED_PREFIXES.iter().any(|p| self.id.starts_with(p)) => {
                (self.id, self.checked.to_string())
            }
            None if !self.name.is_empty() => (self.name, self.value.to_string()),
            None => (self.id, self.value.to_string()),
        };

        ChangeRequest {
            key: key.to_string(),
            value,
        }
    }
}

impl ChangeRequest {
    /// Path relative to the page origin, segments percent-encoded
    pub fn path(&self) -> String {
        format!(
            "{CHANGED_PREFIX}/{}/{}",
            utf8_percent_encode(&self.key, COMPONENT),
            utf8_percent_encode(&self.value, COMPONENT)
        )
    }
}
