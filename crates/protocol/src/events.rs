//! Named events pushed on the `/events` stream

use crate::messages;
use crate::value::SettingsMap;

/// Server-sent event path
pub const EVENTS_PATH: &str = "/events";

/// Settings document path
pub const SETTINGS_PATH: &str = "/settings.json";

/// Known event names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Settings, // settings
    Info,     // info
    Error,    // error
    Data,     // data
    Unknown(String),
}

impl EventKind {
    /// Every event the page subscribes to
    pub const ALL: [Self; 4] = [Self::Settings, Self::Info, Self::Error, Self::Data];
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "settings" => Self::Settings,
            "info" => Self::Info,
            "error" => Self::Error,
            "data" => Self::Data,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Settings => "settings",
            Self::Info => "info",
            Self::Error => "error",
            Self::Data => "data",
            Self::Unknown(s) => s,
        };
        write!(f, "{s}")
    }
}

/// One pushed event: a name and a string payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub kind: EventKind,
    pub payload: String,
}

/// What the page does on receipt of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    ReloadSettings,
    /// Panel only, not the console
    ShowInfo(String),
    ShowError(String),
    /// Payload is a JSON settings fragment
    MergeData(String),
    Ignore,
}

impl ServerEvent {
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Ask pages to reload `/settings.json`. The payload only needs to be non-empty.
    pub fn settings() -> Self {
        Self::new(EventKind::Settings, "reload")
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(EventKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EventKind::Error, text)
    }

    pub fn data(fragment: &SettingsMap) -> serde_json::Result<Self> {
        Ok(Self::new(EventKind::Data, serde_json::to_string(fragment)?))
    }

    /// Dispatch. `data` events are dropped unless the page subscribed to them.
    pub fn page_action(&self, with_data: bool) -> PageAction {
        if self.payload.is_empty() {
            return PageAction::Ignore;
        }

        match self.kind {
            EventKind::Settings => PageAction::ReloadSettings,
            EventKind::Info => PageAction::ShowInfo(self.payload.clone()),
            EventKind::Error => PageAction::ShowError(messages::stream_error(&self.payload)),
            EventKind::Data if with_data => PageAction::MergeData(self.payload.clone()),
            EventKind::Data | EventKind::Unknown(_) => PageAction::Ignore,
        }
    }
}
