//! `bookshelf`: the bookshelf state layer driven from the command line.
//!
//! Each command builds the store, dispatches one action (or a short
//! sequence), waits for the action that settles it, prints the slice's view,
//! and shuts the store down.
//!
//! ```bash
//! BOOKSHELF_TOKEN=... bookshelf search dune --limit 5
//! bookshelf add 9780441013593 want-to-read
//! bookshelf theme dark
//! ```

use anyhow::{Context, Result};
use bookshelf_api::{BookId, Gateway, SessionBridge, StaticToken};
use bookshelf_app::slices::{BestsellersAction, DarkModeAction, DetailsAction, ShelvesAction};
use bookshelf_app::{
    AppAction, AppConfig, AppEnvironment, AppStore, FilePreferences, Status, TerminalAppearance,
    app_store, run_search, views,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::{Cli, Command, LogFormatArg};

/// Extra time allowed beyond the request timeout for effects to settle
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut config = AppConfig::load().context("Invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }

    let store = build_store(&config)?;
    let wait = config.request_timeout + SETTLE_MARGIN;

    let outcome = run(&store, cli.command, &config, wait).await;

    if let Err(error) = store.shutdown(Duration::from_secs(5)).await {
        tracing::warn!(%error, "Store did not shut down cleanly");
    }
    outcome
}

fn init_tracing(format: LogFormatArg) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookshelf=info,bookshelf_api=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormatArg::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
        LogFormatArg::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_store(config: &AppConfig) -> Result<AppStore> {
    // The CLI's stand-in for the auth provider: a static token, when configured
    let session = SessionBridge::new();
    if let Some(token) = &config.token {
        session.initialize(Arc::new(StaticToken::new(token.clone())));
    } else {
        tracing::debug!("No BOOKSHELF_TOKEN set; requests will fail until a session exists");
    }

    let gateway = Gateway::with_timeout(config.api_url.as_str(), Arc::new(session), config.request_timeout)
        .context("Failed to build the HTTP gateway")?;

    let env = AppEnvironment::new(
        Arc::new(gateway),
        Arc::new(FilePreferences::new(&config.preferences_path)),
        Arc::new(TerminalAppearance::new()),
    )
    .with_search_limit(config.search_limit)
    .with_debounce(config.debounce);

    tracing::info!(api_url = %config.api_url, "Store ready");
    Ok(app_store(env))
}

async fn run(store: &AppStore, command: Command, config: &AppConfig, wait: Duration) -> Result<()> {
    match command {
        Command::Search { query, limit, shelves } => {
            let limit = limit.unwrap_or(config.search_limit);
            run_search(store, shelves, query, limit, wait).await?;

            let view = store
                .state(|s| views::search_results(if shelves { &s.shelf_search } else { &s.search }))
                .await;
            println!("{view}");
        },
        Command::Book { id } => {
            fetch_book(store, &id, wait).await?;
            println!("{}", store.state(|s| views::book_details(&s.details)).await);
        },
        Command::Shelves => {
            store
                .send_and_wait_for(
                    AppAction::Shelves(ShelvesAction::Fetch),
                    |a| matches!(a, AppAction::Shelves(ShelvesAction::Loaded { .. } | ShelvesAction::Failed { .. })),
                    wait,
                )
                .await?;
            print!("{}", store.state(|s| views::shelves(&s.shelves)).await);
        },
        Command::Bestsellers => {
            store
                .send_and_wait_for(
                    AppAction::Bestsellers(BestsellersAction::Fetch),
                    |a| {
                        matches!(
                            a,
                            AppAction::Bestsellers(BestsellersAction::Loaded { .. } | BestsellersAction::Failed { .. })
                        )
                    },
                    wait,
                )
                .await?;
            print!("{}", store.state(|s| views::bestsellers(&s.bestsellers)).await);
        },
        Command::Add { id, shelf } => {
            if fetch_book(store, &id, wait).await? {
                let already = store
                    .state(|s| s.details.current().and_then(|book| book.shelf) == Some(shelf))
                    .await;
                if already {
                    tracing::info!(%shelf, "Book is already on that shelf");
                } else {
                    store
                        .send_and_wait_for(
                            AppAction::Details(DetailsAction::MoveToShelf { shelf }),
                            settles_shelf_change,
                            wait,
                        )
                        .await?;
                }
            }
            println!("{}", store.state(|s| views::book_details(&s.details)).await);
        },
        Command::Remove { id } => {
            if fetch_book(store, &id, wait).await? {
                let shelved = store
                    .state(|s| s.details.current().is_some_and(|book| book.shelf.is_some()))
                    .await;
                if shelved {
                    store
                        .send_and_wait_for(
                            AppAction::Details(DetailsAction::RemoveFromShelf),
                            settles_shelf_change,
                            wait,
                        )
                        .await?;
                } else {
                    tracing::info!("Book is not on a shelf");
                }
            }
            println!("{}", store.state(|s| views::book_details(&s.details)).await);
        },
        Command::Theme { mode } => {
            store
                .send_and_wait_for(
                    AppAction::DarkMode(DarkModeAction::Restore),
                    |a| matches!(a, AppAction::DarkMode(DarkModeAction::Restored { .. })),
                    wait,
                )
                .await?;
            if let Some(mode) = mode {
                store
                    .send_and_wait_for(
                        AppAction::DarkMode(DarkModeAction::SetMode(mode)),
                        |a| {
                            matches!(
                                a,
                                AppAction::DarkMode(DarkModeAction::Applied { .. } | DarkModeAction::PersistFailed { .. })
                            )
                        },
                        wait,
                    )
                    .await?;
            }
            println!("{}", store.state(|s| views::theme(&s.dark_mode)).await);
        },
    }
    Ok(())
}

/// Load the book into the detail slice; `false` if it could not be loaded
async fn fetch_book(store: &AppStore, id: &BookId, wait: Duration) -> Result<bool> {
    store
        .send_and_wait_for(
            AppAction::Details(DetailsAction::Fetch { id: id.to_string() }),
            |a| matches!(a, AppAction::Details(DetailsAction::Loaded { .. } | DetailsAction::Failed { .. })),
            wait,
        )
        .await?;
    Ok(store.state(|s| s.details.book.status != Status::Failed).await)
}

fn settles_shelf_change(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::Details(
            DetailsAction::ShelfUpdated { .. } | DetailsAction::Removed { .. } | DetailsAction::Failed { .. }
        )
    )
}
