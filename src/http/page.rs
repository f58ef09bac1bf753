//! Instrumented pages.
//!
//! Pages embed the client-side script that mints the device token later
//! posted to protected routes. Templates are rendered once at startup.

use crate::config::{BackendConfig, PageConfig};
use crate::routing::matcher::request_path;

const APP_ID_PLACEHOLDER: &str = "{{app_id}}";
const PUBLISHABLE_KEY_PLACEHOLDER: &str = "{{publishable_key}}";

/// Pre-rendered pages keyed by exact path.
#[derive(Debug, Clone, Default)]
pub struct PageTable {
    pages: Vec<(String, String)>,
}

impl PageTable {
    pub fn from_config(pages: &[PageConfig], backend: &BackendConfig) -> Self {
        let pages = pages
            .iter()
            .map(|page| (page.path.clone(), render(&page.template, backend)))
            .collect();
        Self { pages }
    }

    /// The rendered page for a GET of `uri`, if one is configured.
    pub fn lookup(&self, method: &str, uri: &str) -> Option<&str> {
        if method != "GET" {
            return None;
        }
        let path = request_path(uri);
        self.pages
            .iter()
            .find(|(page_path, _)| page_path == path)
            .map(|(_, html)| html.as_str())
    }
}

fn render(template: &str, backend: &BackendConfig) -> String {
    template
        .replace(APP_ID_PLACEHOLDER, backend.app_id.as_deref().unwrap_or_default())
        .replace(
            PUBLISHABLE_KEY_PLACEHOLDER,
            backend.publishable_key.as_deref().unwrap_or_default(),
        )
}
