use super::*;

use shared::error::{normalize, TransportFailure};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["catalog_cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid args")
}

fn nine() -> NonZeroU32 {
    NonZeroU32::new(9).expect("page size")
}

#[test]
fn shop_args_render_typed_filters() {
    let cli = parse(&[
        "shops",
        "--page",
        "3",
        "--sort",
        "createdAt",
        "--desc",
        "--in-vacations",
        "false",
        "--created-after",
        "2024-01-31",
    ]);

    let query = build_query(&cli.command, nine());
    assert_eq!(query.page_index(), 2);
    assert_eq!(
        query.descriptor().to_string(),
        "page=2&size=9&sortBy=createdAt,desc&createdAfter=2024-01-31&inVacations=false"
    );
}

#[test]
fn products_without_category_send_no_category_filter() {
    let cli = parse(&["products", "--shop-id", "5", "--size", "6"]);
    assert_eq!(cli.command.resource(), Resource::Products);

    let descriptor = build_query(&cli.command, nine()).descriptor();
    assert_eq!(descriptor.to_string(), "page=0&size=6&shopId=5");
}

#[test]
fn zero_size_falls_back_to_configured_size() {
    let cli = parse(&["categories", "--size", "0", "--search", "  "]);
    let descriptor = build_query(&cli.command, nine()).descriptor();
    assert_eq!(descriptor.to_string(), "page=0&size=9");
}

#[test]
fn desc_requires_sort() {
    assert!(Cli::try_parse_from(["catalog_cli", "shops", "--desc"]).is_err());
}

#[test]
fn renders_rows_and_page_footer() {
    let view = ListingView {
        items: vec![Category {
            id: CategoryId(2),
            name: "Books".into(),
        }],
        page_number: 1,
        total_pages: 0,
        error: None,
        busy: false,
        phase: FetchPhase::Success,
    };
    assert_eq!(render_view(&view), vec!["#2 Books", "page 1/1"]);
}

#[test]
fn renders_error_instead_of_rows() {
    let view: ListingView<Shop> = ListingView {
        items: Vec::new(),
        page_number: 1,
        total_pages: 0,
        error: Some(normalize(&TransportFailure::status(404, "Not Found"))),
        busy: false,
        phase: FetchPhase::Failed,
    };
    assert_eq!(render_view(&view), vec!["error: Resource not found"]);
}
