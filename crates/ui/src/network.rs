use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{window, Request, Response};

use settings_sync_protocol::{messages, parse_settings_lossy, SETTINGS_PATH};

use crate::dom::{apply_settings, report_skipped, show_message};
use crate::page::with_page;

/// Absolute URL on the page origin
pub fn origin_url(path: &str) -> Result<String, JsValue> {
    let win = window().ok_or("No window")?;
    Ok(format!("{}{path}", win.location().origin()?))
}

/// GET `url`; the response is returned whatever its status
async fn get(url: &str, no_cache: bool) -> Result<Response, JsValue> {
    let win = window().ok_or("No window")?;
    let req = Request::new_with_str(url)?;
    if no_cache {
        let headers = req.headers();
        headers.set("Cache-Control", "no-cache, no-store, max-age=0")?;
        headers.set("Expires", "Tue, 01 Jan 1980 1:00:00 GMT")?;
        headers.set("Pragma", "no-cache")?;
    }
    let resp_val = JsFuture::from(win.fetch_with_request(&req)).await?;
    resp_val.dyn_into()
}

async fn text(resp: &Response) -> Result<String, JsValue> {
    let body = JsFuture::from(resp.text()?).await?;
    Ok(body.as_string().unwrap_or_default())
}

/// Show `<url> returned <status>/<body>` for anything but 200. Returns true on 200.
async fn check_status(resp: &Response) -> bool {
    if resp.status() == 200 {
        return true;
    }
    let body = text(resp).await.unwrap_or_default();
    show_message(&messages::http_failure(&resp.url(), resp.status(), &body), true, true);
    false
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Fetch /settings.json and reflect it into the page
pub async fn load_settings(report_missing: bool) -> Result<(), JsValue> {
    let resp = get(SETTINGS_PATH, true).await?;
    if !check_status(&resp).await {
        return Ok(());
    }

    let (settings, skipped) =
        parse_settings_lossy(&text(&resp).await?).map_err(|e| JsValue::from_str(&e.to_string()))?;
    report_skipped(&skipped);
    apply_settings(&settings, report_missing);

    if let Some(trace) = messages::trace_flag(&settings) {
        with_page(|p| p.trace = trace);
    }
    Ok(())
}

/// Fire-and-forget settings load
pub fn spawn_load_settings(report_missing: bool) {
    spawn_local(async move {
        if let Err(e) = load_settings(report_missing).await {
            show_message(&format!("Loading {SETTINGS_PATH} failed: {}", describe(&e)), true, true);
        }
    });
}

/// Fire-and-forget GET; only failures are reported
pub fn send_get(url: String) {
    spawn_local(async move {
        match get(&url, false).await {
            Ok(resp) => {
                check_status(&resp).await;
            }
            Err(e) => show_message(&format!("{url} failed: {}", describe(&e)), true, true),
        }
    });
}
