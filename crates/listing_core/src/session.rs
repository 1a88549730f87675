//! Drives one [`ListFetchController`] against a [`PageSource`], keeping every
//! in-flight fetch until it settles.

use std::{num::NonZeroU32, sync::Arc};

use futures::{future::BoxFuture, stream::FuturesUnordered, StreamExt};
use shared::{error::TransportFailure, protocol::PagedEnvelope};
use tracing::debug;

use crate::{
    controller::{FetchTicket, ListFetchController, ListingView, SettleOutcome},
    query::QueryState,
    PageSource,
};

type InFlight<T> = BoxFuture<'static, (FetchTicket, Result<PagedEnvelope<T>, TransportFailure>)>;

/// A single user interaction against the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    /// One-based page.
    Page(u32),
    PageSize(NonZeroU32),
    Sort(Option<String>),
    Search(Option<String>),
    Filter { name: String, value: Option<String> },
}

/// Fetches are queued as lazy futures: nothing goes out on the wire until
/// [`ListingSession::next_settled`] or [`ListingSession::settle_all`] polls
/// them, so a host must keep one of those running after [`ListingSession::apply`].
pub struct ListingSession<T, S> {
    controller: ListFetchController<T>,
    source: Arc<S>,
    in_flight: FuturesUnordered<InFlight<T>>,
}

impl<T, S> ListingSession<T, S>
where
    T: Send + 'static,
    S: PageSource<T> + 'static,
{
    pub fn new(source: Arc<S>, query: QueryState) -> Self {
        Self {
            controller: ListFetchController::new(query),
            source,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// Creates the session and issues the initial fetch.
    pub fn mount(source: Arc<S>, query: QueryState) -> Self {
        let mut session = Self::new(source, query);
        let ticket = session.controller.start();
        session.issue(ticket);
        session
    }

    pub fn controller(&self) -> &ListFetchController<T> {
        &self.controller
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns whether the change issued a new fetch.
    pub fn apply(&mut self, change: QueryChange) -> bool {
        let ticket = match change {
            QueryChange::Page(ui_page) => self.controller.set_page(ui_page),
            QueryChange::PageSize(size) => self.controller.set_page_size(size),
            QueryChange::Sort(sort) => self.controller.set_sort(sort),
            QueryChange::Search(term) => self.controller.set_search(term),
            QueryChange::Filter { name, value } => self.controller.set_filter(name, value),
        };
        self.issue(ticket)
    }

    pub fn reload(&mut self) {
        let ticket = self.controller.reload();
        self.issue(Some(ticket));
    }

    /// Waits for the next fetch to settle, in completion order. `None` once
    /// nothing is in flight.
    pub async fn next_settled(&mut self) -> Option<SettleOutcome> {
        let (ticket, outcome) = self.in_flight.next().await?;
        Some(self.controller.settle(&ticket, outcome))
    }

    pub async fn settle_all(&mut self) {
        while let Some(outcome) = self.next_settled().await {
            debug!(?outcome, remaining = self.in_flight.len(), "listing fetch settled");
        }
    }

    fn issue(&mut self, ticket: Option<FetchTicket>) -> bool {
        let Some(ticket) = ticket else {
            return false;
        };
        let source = Arc::clone(&self.source);
        self.in_flight.push(Box::pin(async move {
            let outcome = source.fetch_page(ticket.descriptor()).await;
            (ticket, outcome)
        }));
        true
    }
}

impl<T: Clone, S> ListingSession<T, S> {
    pub fn view(&self) -> ListingView<T> {
        self.controller.view()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
