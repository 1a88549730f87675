use async_trait::async_trait;
use shared::{error::TransportFailure, protocol::PagedEnvelope};

pub mod busy;
pub mod config;
pub mod controller;
pub mod pagination;
pub mod query;
pub mod session;
pub mod transport;

pub use busy::{BusySignal, BusyWatcher};
pub use config::{load_settings, ClientSettings};
pub use controller::{
    FetchPhase, FetchTicket, ListFetchController, Listing, ListingView, SettleOutcome,
};
pub use pagination::{to_server, to_ui, PagedResult};
pub use query::{derive, QueryState, RequestDescriptor};
pub use session::{ListingSession, QueryChange};
pub use transport::{CatalogHttpClient, HttpPageSource};

/// Fetches one page of one entity type. Failures are reported raw; the
/// controller normalizes them.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<PagedEnvelope<T>, TransportFailure>;
}
