use std::{num::NonZeroU32, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use listing_core::{
    load_settings, to_server, CatalogHttpClient, FetchPhase, ListingSession, ListingView,
    PageSource, QueryState,
};
use serde::Serialize;
use shared::{
    domain::{Category, CategoryId, Product, Shop, ShopId},
    protocol::{ProductFilter, Resource, ShopFilter, SortSpec},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DISPLAY_LOCALE: &str = "fr";

#[derive(Parser, Debug)]
#[command(name = "catalog_cli", about = "Browse shops, products and categories")]
struct Cli {
    /// Overrides the API base URL from settings.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the listing view as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct ListingArgs {
    /// One-based page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    size: Option<u32>,
    /// Sort field, e.g. `name`, `createdAt`, `nbProducts`.
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, requires = "sort")]
    desc: bool,
    #[arg(long)]
    search: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Shops {
        #[command(flatten)]
        listing: ListingArgs,
        #[arg(long)]
        in_vacations: Option<bool>,
        #[arg(long)]
        created_after: Option<NaiveDate>,
        #[arg(long)]
        created_before: Option<NaiveDate>,
    },
    Products {
        #[command(flatten)]
        listing: ListingArgs,
        #[arg(long)]
        shop_id: Option<i64>,
        /// Omit to list every category.
        #[arg(long)]
        category_id: Option<i64>,
    },
    Categories {
        #[command(flatten)]
        listing: ListingArgs,
    },
}

impl Command {
    fn resource(&self) -> Resource {
        match self {
            Command::Shops { .. } => Resource::Shops,
            Command::Products { .. } => Resource::Products,
            Command::Categories { .. } => Resource::Categories,
        }
    }

    fn listing(&self) -> &ListingArgs {
        match self {
            Command::Shops { listing, .. }
            | Command::Products { listing, .. }
            | Command::Categories { listing } => listing,
        }
    }
}

fn build_query(command: &Command, default_page_size: NonZeroU32) -> QueryState {
    let listing = command.listing();
    let page_size = listing
        .size
        .and_then(NonZeroU32::new)
        .unwrap_or(default_page_size);
    let mut query = QueryState::new(page_size);

    if let Some(field) = &listing.sort {
        let sort = if listing.desc {
            SortSpec::descending(field)
        } else {
            SortSpec::ascending(field)
        };
        query.set_sort(Some(sort.to_param()));
    }
    query.set_search(listing.search.clone());

    match command {
        Command::Shops {
            in_vacations,
            created_after,
            created_before,
            ..
        } => {
            if let Some(flag) = in_vacations {
                query.apply_filter(&ShopFilter::InVacations(*flag));
            }
            if let Some(date) = created_after {
                query.apply_filter(&ShopFilter::CreatedAfter(*date));
            }
            if let Some(date) = created_before {
                query.apply_filter(&ShopFilter::CreatedBefore(*date));
            }
        }
        Command::Products {
            shop_id,
            category_id,
            ..
        } => {
            if let Some(id) = shop_id {
                query.apply_filter(&ProductFilter::Shop(ShopId(*id)));
            }
            if let Some(id) = category_id {
                query.apply_filter(&ProductFilter::Category(CategoryId(*id)));
            }
        }
        Command::Categories { .. } => {}
    }

    // Last, so the filters above do not re-anchor it.
    query.set_page_index(to_server(listing.page));
    query
}

trait CatalogRow {
    fn row(&self) -> String;
}

impl CatalogRow for Shop {
    fn row(&self) -> String {
        let vacation = if self.in_vacations {
            " (on vacation)"
        } else {
            ""
        };
        match self.nb_products {
            Some(count) => format!("#{} {}{vacation} - {count} products", self.id, self.name),
            None => format!("#{} {}{vacation}", self.id, self.name),
        }
    }
}

impl CatalogRow for Product {
    fn row(&self) -> String {
        let name = self.display_name(DISPLAY_LOCALE).unwrap_or("<unnamed>");
        format!("#{} {name} - {} cents", self.id, self.price)
    }
}

impl CatalogRow for Category {
    fn row(&self) -> String {
        format!("#{} {}", self.id, self.name)
    }
}

fn render_view<T: CatalogRow>(view: &ListingView<T>) -> Vec<String> {
    if let Some(error) = &view.error {
        return vec![format!("error: {error}")];
    }
    let mut lines: Vec<String> = view.items.iter().map(CatalogRow::row).collect();
    if lines.is_empty() {
        lines.push("No matching entries".to_string());
    }
    lines.push(format!(
        "page {}/{}",
        view.page_number,
        view.total_pages.max(1)
    ));
    lines
}

async fn run_listing<T, S>(source: S, query: QueryState, json: bool) -> Result<ExitCode>
where
    T: CatalogRow + Clone + Serialize + Send + 'static,
    S: PageSource<T> + 'static,
{
    let mut session = ListingSession::mount(Arc::new(source), query);
    session.settle_all().await;
    let view = session.view();

    if json {
        let encoded = serde_json::to_string_pretty(&view).context("failed to encode listing")?;
        println!("{encoded}");
    } else {
        for line in render_view(&view) {
            println!("{line}");
        }
    }

    Ok(if view.phase == FetchPhase::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = api_url.clone();
    }
    let client = CatalogHttpClient::new(&settings)?;

    let resource = cli.command.resource();
    let query = build_query(&cli.command, settings.page_size(resource));
    info!(
        resource = resource.path(),
        api = %client.base_url(),
        query = %query.descriptor(),
        "listing catalog"
    );

    match resource {
        Resource::Shops => run_listing::<Shop, _>(client.shops(), query, cli.json).await,
        Resource::Products => {
            run_listing::<Product, _>(client.products(), query, cli.json).await
        }
        Resource::Categories => {
            run_listing::<Category, _>(client.categories(), query, cli.json).await
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
