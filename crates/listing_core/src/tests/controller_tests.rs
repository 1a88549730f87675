use super::*;

use shared::error::ErrorKind;

fn query(size: u32) -> QueryState {
    QueryState::new(NonZeroU32::new(size).expect("page size"))
}

fn envelope(items: &[&'static str], total_pages: u32, page: u32) -> PagedEnvelope<&'static str> {
    PagedEnvelope::new(items.to_vec(), total_pages, page)
}

fn mounted(size: u32) -> (ListFetchController<&'static str>, FetchTicket) {
    let mut controller = ListFetchController::new(query(size));
    let ticket = controller.start().expect("initial fetch");
    (controller, ticket)
}

#[test]
fn starts_idle_and_dispatches_once() {
    let mut controller: ListFetchController<&'static str> = ListFetchController::new(query(9));
    assert_eq!(controller.phase(), FetchPhase::Idle);
    assert!(!controller.is_busy());

    let ticket = controller.start().expect("initial fetch");
    assert_eq!(ticket.descriptor().page(), 0);
    assert_eq!(ticket.descriptor().size(), 9);
    assert_eq!(controller.phase(), FetchPhase::Fetching);
    assert!(controller.is_busy());

    assert!(controller.start().is_none());
}

#[test]
fn empty_page_is_a_success() {
    let (mut controller, ticket) = mounted(9);

    let outcome = controller.settle(&ticket, Ok(envelope(&[], 0, 0)));

    assert_eq!(outcome, SettleOutcome::Published(FetchPhase::Success));
    let view = controller.view();
    assert!(view.items.is_empty());
    assert_eq!(view.total_pages, 0);
    assert_eq!(view.page_number, 1);
    assert_eq!(view.error, None);
    assert!(!view.busy);
    assert_eq!(view.phase, FetchPhase::Success);
}

#[test]
fn timeout_clears_items_and_busy() {
    let (mut controller, ticket) = mounted(9);
    controller.settle(&ticket, Ok(envelope(&["a", "b"], 3, 0)));

    let ticket = controller.set_page(2).expect("page fetch");
    let outcome = controller.settle(&ticket, Err(TransportFailure::timeout()));

    assert_eq!(outcome, SettleOutcome::Published(FetchPhase::Failed));
    let view = controller.view();
    assert!(view.items.is_empty());
    let error = view.error.expect("normalized error");
    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert_eq!(error.message(), "Request timeout - server is not responding");
    assert!(!view.busy);
    assert_eq!(view.page_number, 2);
    assert_eq!(view.total_pages, 3);
}

#[test]
fn failure_keeps_page_within_known_page_count() {
    let (mut controller, ticket) = mounted(9);
    controller.settle(&ticket, Ok(envelope(&["a"], 5, 0)));

    let ticket = controller.set_page(4).expect("page fetch");
    controller.settle(&ticket, Err(TransportFailure::status(500, "Internal Server Error")));

    let view = controller.view();
    assert_eq!(view.phase, FetchPhase::Failed);
    assert!(view.items.is_empty());
    assert_eq!(view.total_pages, 5);
    assert_eq!(view.page_number, 4);
    assert!(view.page_number <= view.total_pages.max(1));
}

#[test]
fn failure_before_any_page_is_known_shows_first_page() {
    let mut state = query(9);
    state.set_page_index(3);
    let mut controller: ListFetchController<&'static str> = ListFetchController::new(state);
    assert_eq!(controller.listing().page_number, 1);

    let ticket = controller.start().expect("initial fetch");
    controller.settle(&ticket, Err(TransportFailure::unreachable()));

    let view = controller.view();
    assert_eq!(view.total_pages, 0);
    assert_eq!(view.page_number, 1);
}

#[test]
fn not_found_is_normalized() {
    let (mut controller, ticket) = mounted(9);

    controller.settle(&ticket, Err(TransportFailure::status(404, "Not Found")));

    let error = controller.listing().error.expect("error");
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.message(), "Resource not found");
    assert_eq!(error.http_status(), Some(404));
}

#[test]
fn stale_page_response_is_discarded_after_filter_change() {
    let (mut controller, first) = mounted(9);
    controller.settle(&first, Ok(envelope(&["p0"], 5, 0)));

    let page_two = controller.set_page(3).expect("page fetch");
    assert_eq!(page_two.descriptor().page(), 2);

    let filtered = controller
        .set_filter("inVacations", Some("true".into()))
        .expect("filter fetch");
    assert_eq!(filtered.descriptor().page(), 0);
    assert_eq!(controller.query().page_index(), 0);

    assert_eq!(
        controller.settle(&filtered, Ok(envelope(&["f0"], 1, 0))),
        SettleOutcome::Published(FetchPhase::Success)
    );
    assert_eq!(
        controller.settle(&page_two, Ok(envelope(&["p2"], 5, 2))),
        SettleOutcome::Discarded
    );

    let view = controller.view();
    assert_eq!(view.items, vec!["f0"]);
    assert_eq!(view.page_number, 1);
    assert_eq!(view.total_pages, 1);
    assert!(!view.busy);
}

#[test]
fn stale_response_does_not_clear_busy() {
    let (mut controller, first) = mounted(9);
    let second = controller.set_search(Some("shoe".into())).expect("search fetch");

    assert_eq!(
        controller.settle(&first, Ok(envelope(&["old"], 1, 0))),
        SettleOutcome::Discarded
    );
    assert!(controller.is_busy());
    assert_eq!(controller.phase(), FetchPhase::Fetching);
    assert!(controller.listing().items.is_empty());

    controller.settle(&second, Ok(envelope(&["shoe"], 1, 0)));
    assert!(!controller.is_busy());
    assert_eq!(controller.listing().items, vec!["shoe"]);
}

#[test]
fn stale_failure_is_discarded_too() {
    let (mut controller, first) = mounted(9);
    let second = controller.set_sort(Some("name".into())).expect("sort fetch");
    controller.settle(&second, Ok(envelope(&["a"], 1, 0)));

    assert_eq!(
        controller.settle(&first, Err(TransportFailure::status(500, ""))),
        SettleOutcome::Discarded
    );
    assert_eq!(controller.phase(), FetchPhase::Success);
    assert_eq!(controller.listing().error, None);
}

#[test]
fn same_filter_twice_issues_one_fetch() {
    let (mut controller, _first) = mounted(6);

    assert!(controller
        .set_filter("shopId", Some("4".into()))
        .is_some());
    assert!(controller
        .set_filter("shopId", Some("4".into()))
        .is_none());
    assert!(controller.set_page(1).is_none());
}

#[test]
fn returning_to_earlier_query_issues_new_ticket() {
    let (mut controller, first) = mounted(9);
    let second = controller.set_sort(Some("name".into())).expect("sort fetch");
    let third = controller.set_sort(None).expect("back to default order");

    assert_eq!(first.descriptor(), third.descriptor());
    assert_ne!(first.id(), third.id());

    assert_eq!(
        controller.settle(&first, Ok(envelope(&["early"], 1, 0))),
        SettleOutcome::Discarded
    );
    assert_eq!(
        controller.settle(&second, Ok(envelope(&["sorted"], 1, 0))),
        SettleOutcome::Discarded
    );
    controller.settle(&third, Ok(envelope(&["latest"], 1, 0)));
    assert_eq!(controller.listing().items, vec!["latest"]);
}

#[test]
fn reload_retries_after_failure() {
    let (mut controller, first) = mounted(9);
    controller.settle(&first, Err(TransportFailure::unreachable()));
    assert_eq!(controller.phase(), FetchPhase::Failed);

    let retry = controller.reload();
    assert_eq!(retry.descriptor(), first.descriptor());
    assert!(controller.is_busy());

    controller.settle(&retry, Ok(envelope(&["back"], 1, 0)));
    let view = controller.view();
    assert_eq!(view.phase, FetchPhase::Success);
    assert_eq!(view.error, None);
    assert_eq!(view.items, vec!["back"]);
}

#[tokio::test]
async fn subscribers_observe_published_listing() {
    let (mut controller, ticket) = mounted(9);
    let mut listing_rx = controller.subscribe();
    let mut busy = controller.busy_watcher();
    assert!(busy.is_busy());

    controller.settle(&ticket, Ok(envelope(&["x", "y"], 2, 0)));

    listing_rx.changed().await.expect("listing update");
    assert_eq!(listing_rx.borrow().items, vec!["x", "y"]);
    assert_eq!(listing_rx.borrow().total_pages, 2);
    assert!(busy.wait_idle().await);
}
