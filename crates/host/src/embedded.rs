//! Page assets compiled into the host binary
//!
//! `crates/ui/www` holds the status and setup pages plus the wasm controller
//! built into `www/pkg`. Debug builds read them from disk.

use std::borrow::Cow;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

const INDEX: &str = "index.html";

#[derive(RustEmbed)]
#[folder = "../ui/www/"]
#[include = "*.html"]
#[include = "*.htm"]
#[include = "*.css"]
#[include = "pkg/*.js"]
#[include = "pkg/*.wasm"]
struct PageAssets;

/// A page asset ready to be served
#[derive(Debug)]
pub struct Asset {
    pub data: Cow<'static, [u8]>,
    pub mime: &'static str,
}

/// Look up a request path. `/` and directory paths map to their index page.
pub fn lookup(path: &str) -> Option<Asset> {
    let path = asset_path(path);
    PageAssets::get(&path).map(|file| Asset {
        data: file.data,
        mime: mime_for(&path),
    })
}

fn asset_path(path: &str) -> Cow<'_, str> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        Cow::Borrowed(INDEX)
    } else if path.ends_with('/') {
        Cow::Owned(format!("{path}{INDEX}"))
    } else {
        Cow::Borrowed(path)
    }
}

fn mime_for(path: &str) -> &'static str {
    // Module scripts are refused unless served as JavaScript
    if path.ends_with(".js") {
        return "application/javascript";
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        // Pages must pick up a rebuilt controller on the next load
        let headers = [
            (header::CONTENT_TYPE, self.mime),
            (header::CACHE_CONTROL, "no-cache"),
        ];
        (headers, self.data).into_response()
    }
}
