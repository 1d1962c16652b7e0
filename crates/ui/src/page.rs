//! Page-wide state, owned by the main thread

use std::cell::RefCell;

use settings_sync_protocol::ReconnectBackoff;

#[derive(Debug, Default)]
pub struct PageState {
    /// Setup page: report missing keys, no live `data` events
    pub in_setup: bool,
    /// Show trace messages in the panel (`traceJava` setting)
    pub trace: bool,
    pub messages_extended: bool,
    pub backoff: ReconnectBackoff,
}

thread_local! {
    static PAGE: RefCell<PageState> = RefCell::new(PageState::default());
}

/// Run `f` with the page state borrowed. Keep it short: no DOM calls inside.
pub fn with_page<R>(f: impl FnOnce(&mut PageState) -> R) -> R {
    PAGE.with(|page| f(&mut page.borrow_mut()))
}

pub fn in_setup() -> bool {
    with_page(|p| p.in_setup)
}

pub fn trace_enabled() -> bool {
    with_page(|p| p.trace)
}
