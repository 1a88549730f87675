//! Zero-based server pages vs one-based UI pages.

use serde::Serialize;
use shared::protocol::PagedEnvelope;

pub fn to_ui(server_page: u32) -> u32 {
    server_page.saturating_add(1)
}

/// UI page 0 is not a valid page; it maps to the first server page.
pub fn to_server(ui_page: u32) -> u32 {
    ui_page.saturating_sub(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    /// One-based, never above `max(total_pages, 1)`.
    pub current_page_number: u32,
}

impl<T> PagedResult<T> {
    pub fn from_envelope(envelope: PagedEnvelope<T>) -> Self {
        let total_pages = envelope.total_pages;
        let current_page_number = to_ui(envelope.pageable.page_number).min(total_pages.max(1));
        Self {
            items: envelope.content,
            total_pages,
            current_page_number,
        }
    }
}
