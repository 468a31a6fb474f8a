//! # Bookshelf App
//!
//! The client-side state of the bookshelf: five slices composed into one
//! store, driven by the gateway from `bookshelf-api`.
//!
//! | Slice | State | Failure keeps data |
//! |---|---|---|
//! | Catalog search | [`SearchState`] | no |
//! | Shelf search | [`SearchState`] | no |
//! | Shelf list | [`ShelvesState`] | yes |
//! | Book detail | [`DetailsState`] | yes |
//! | Bestsellers | [`BestsellersState`] | yes |
//! | Dark mode | [`DarkModeState`] | n/a |
//!
//! ## Example
//!
//! ```no_run
//! use bookshelf_app::{AppAction, AppEnvironment, FilePreferences, TerminalAppearance, app_store};
//! use bookshelf_app::slices::DetailsAction;
//! use bookshelf_api::{Gateway, SessionBridge};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionBridge::new();
//!     let gateway = Gateway::new("http://127.0.0.1:5000", Arc::new(session.clone()))?;
//!     let env = AppEnvironment::new(
//!         Arc::new(gateway),
//!         Arc::new(FilePreferences::new("preferences.json")),
//!         Arc::new(TerminalAppearance::new()),
//!     );
//!     let store = app_store(env);
//!
//!     store
//!         .send_and_wait_for(
//!             AppAction::Details(DetailsAction::Fetch { id: "9780441013593".into() }),
//!             |a| matches!(a, AppAction::Details(DetailsAction::Loaded { .. } | DetailsAction::Failed { .. })),
//!             Duration::from_secs(30),
//!         )
//!         .await?;
//!
//!     println!("{}", store.state(|s| bookshelf_app::views::book_details(&s.details)).await);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod environment;
pub mod mocks;
pub mod resource;
pub mod slices;
pub mod state;
pub mod theme;
pub mod views;

pub use config::{AppConfig, ConfigError};
pub use environment::{AppEnvironment, DEFAULT_DEBOUNCE, DEFAULT_SEARCH_LIMIT};
pub use resource::{AsyncResource, FALLBACK_ERROR, RequestId, Status};
pub use slices::{
    BestsellersState, DarkModeState, DetailsState, SearchState, ShelfSelectors, ShelvesState,
};
pub use state::{AppAction, AppReducer, AppState, AppStore, ShelfSyncReducer, app_reducer, app_store, run_search};
pub use theme::{
    Appearance, FilePreferences, MODE_KEY, PreferenceError, PreferenceStore, TerminalAppearance,
    Theme, ThemePreference,
};
