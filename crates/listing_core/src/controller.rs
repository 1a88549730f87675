//! Listing controller: query changes in, fetch tickets out, settled responses
//! published only while they are still current.

use std::num::NonZeroU32;

use serde::Serialize;
use shared::{
    error::{normalize, NormalizedError, TransportFailure},
    protocol::{FilterDimension, PagedEnvelope},
};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    busy::{BusySignal, BusyWatcher},
    pagination::{to_server, to_ui, PagedResult},
    query::{QueryState, RequestDescriptor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    Idle,
    Fetching,
    Success,
    Failed,
}

/// Handle for one dispatched fetch. The response must be handed back to
/// [`ListFetchController::settle`] together with this ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    descriptor: RequestDescriptor,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Published(FetchPhase),
    Discarded,
}

/// Observable listing data. Busy state lives in [`BusySignal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub error: Option<NormalizedError>,
}

impl<T> Listing<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            total_pages: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub error: Option<NormalizedError>,
    pub busy: bool,
    pub phase: FetchPhase,
}

pub struct ListFetchController<T> {
    query: QueryState,
    phase: FetchPhase,
    current: Option<FetchTicket>,
    issued: u64,
    busy: BusySignal,
    listing: watch::Sender<Listing<T>>,
}

impl<T> ListFetchController<T> {
    pub fn new(query: QueryState) -> Self {
        let (listing, _rx) = watch::channel(Listing::empty());
        Self {
            query,
            phase: FetchPhase::Idle,
            current: None,
            issued: 0,
            busy: BusySignal::new(),
            listing,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_watcher(&self) -> BusyWatcher {
        self.busy.subscribe()
    }

    pub fn subscribe(&self) -> watch::Receiver<Listing<T>> {
        self.listing.subscribe()
    }

    /// The ticket whose response will be published, if any was issued.
    pub fn current_ticket(&self) -> Option<&FetchTicket> {
        self.current.as_ref()
    }

    /// Initial fetch at mount. No-op if a fetch for the current query was
    /// already dispatched.
    pub fn start(&mut self) -> Option<FetchTicket> {
        self.refresh()
    }

    /// `ui_page` is one-based.
    pub fn set_page(&mut self, ui_page: u32) -> Option<FetchTicket> {
        self.query.set_page_index(to_server(ui_page));
        self.refresh()
    }

    pub fn set_page_size(&mut self, page_size: NonZeroU32) -> Option<FetchTicket> {
        self.query.set_page_size(page_size);
        self.refresh()
    }

    pub fn set_sort(&mut self, sort_key: Option<String>) -> Option<FetchTicket> {
        self.query.set_sort(sort_key);
        self.refresh()
    }

    pub fn set_search(&mut self, search_term: Option<String>) -> Option<FetchTicket> {
        self.query.set_search(search_term);
        self.refresh()
    }

    pub fn set_filter(
        &mut self,
        name: impl Into<String>,
        value: Option<String>,
    ) -> Option<FetchTicket> {
        self.query.set_filter(name, value);
        self.refresh()
    }

    pub fn apply_filter(&mut self, filter: &impl FilterDimension) -> Option<FetchTicket> {
        self.query.apply_filter(filter);
        self.refresh()
    }

    pub fn clear_filter(&mut self, name: &str) -> Option<FetchTicket> {
        self.query.clear_filter(name);
        self.refresh()
    }

    /// Re-issues the current query even though it did not change.
    pub fn reload(&mut self) -> FetchTicket {
        let descriptor = self.query.descriptor();
        self.dispatch(descriptor)
    }

    /// Applies a settled response. Responses for anything but the most
    /// recently issued ticket are dropped without touching published state
    /// or the busy flag.
    pub fn settle(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<PagedEnvelope<T>, TransportFailure>,
    ) -> SettleOutcome {
        if self.current.as_ref() != Some(ticket) {
            debug!(
                ticket = ticket.id,
                query = %ticket.descriptor,
                "discarding stale listing response"
            );
            return SettleOutcome::Discarded;
        }

        let phase = match outcome {
            Ok(envelope) => {
                let result = PagedResult::from_envelope(envelope);
                debug!(
                    ticket = ticket.id,
                    items = result.items.len(),
                    total_pages = result.total_pages,
                    "listing fetch succeeded"
                );
                self.listing.send_replace(Listing {
                    items: result.items,
                    page_number: result.current_page_number,
                    total_pages: result.total_pages,
                    error: None,
                });
                FetchPhase::Success
            }
            Err(failure) => {
                let error = normalize(&failure);
                debug!(
                    ticket = ticket.id,
                    kind = ?error.kind(),
                    status = ?error.http_status(),
                    "listing fetch failed"
                );
                // Page count survives a failure; the requested page is kept
                // only while it still fits inside it.
                let total_pages = self.listing.borrow().total_pages;
                let page_number = to_ui(ticket.descriptor.page()).min(total_pages.max(1));
                self.listing.send_replace(Listing {
                    items: Vec::new(),
                    page_number,
                    total_pages,
                    error: Some(error),
                });
                FetchPhase::Failed
            }
        };

        self.phase = phase;
        self.busy.clear();
        SettleOutcome::Published(phase)
    }

    fn refresh(&mut self) -> Option<FetchTicket> {
        let descriptor = self.query.descriptor();
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.descriptor == descriptor)
        {
            return None;
        }
        Some(self.dispatch(descriptor))
    }

    fn dispatch(&mut self, descriptor: RequestDescriptor) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket {
            id: self.issued,
            descriptor,
        };
        debug!(ticket = ticket.id, query = %ticket.descriptor, "dispatching listing fetch");
        self.busy.raise();
        self.phase = FetchPhase::Fetching;
        self.current = Some(ticket.clone());
        ticket
    }
}

impl<T: Clone> ListFetchController<T> {
    pub fn listing(&self) -> Listing<T> {
        self.listing.borrow().clone()
    }

    pub fn view(&self) -> ListingView<T> {
        let listing = self.listing.borrow();
        ListingView {
            items: listing.items.clone(),
            page_number: listing.page_number,
            total_pages: listing.total_pages,
            error: listing.error.clone(),
            busy: self.busy.is_busy(),
            phase: self.phase,
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
