use serde::Serialize;

use crate::pipeline::PageState;

/// Emit a page state as a single JSON line to stdout.
pub fn report_page<R: Serialize>(state: &PageState<R>) {
    if let Ok(json) = serde_json::to_string(state) {
        println!("{json}");
    }
}

/// Emit a page state as pretty-printed JSON to stdout.
pub fn report_page_pretty<R: Serialize>(state: &PageState<R>) {
    if let Ok(json) = serde_json::to_string_pretty(state) {
        println!("{json}");
    }
}
