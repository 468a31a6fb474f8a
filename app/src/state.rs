//! Root state, root action, and the reducer that routes between slices.

use crate::environment::AppEnvironment;
use crate::slices::search;
use crate::slices::{
    BestsellersAction, BestsellersReducer, BestsellersState, DarkModeAction, DarkModeReducer,
    DarkModeState, DetailsAction, DetailsReducer, DetailsState, SearchAction, SearchReducer,
    SearchState, ShelvesAction, ShelvesReducer, ShelvesState,
};
use bookshelf_api::Book;
use bookshelf_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use bookshelf_core::{Effect, Reducer, SmallVec};
use bookshelf_runtime::{Store, StoreError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the application holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Catalog search
    pub search: SearchState,
    /// Search within the user's shelves
    pub shelf_search: SearchState,
    /// The user's shelves
    pub shelves: ShelvesState,
    /// The displayed book
    pub details: DetailsState,
    /// Bestseller lists
    pub bestsellers: BestsellersState,
    /// Theme preference
    pub dark_mode: DarkModeState,
}

/// Every action the store accepts, tagged by slice
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Catalog search
    Search(SearchAction),
    /// Shelf search
    ShelfSearch(SearchAction),
    /// Shelf list
    Shelves(ShelvesAction),
    /// Book detail
    Details(DetailsAction),
    /// Bestsellers
    Bestsellers(BestsellersAction),
    /// Theme preference
    DarkMode(DarkModeAction),
}

/// The root reducer type
pub type AppReducer = CombinedReducer<AppState, AppAction, AppEnvironment>;

/// The application store
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Mirrors shelf changes made from the detail page into the loaded shelf list
///
/// Runs after [`DetailsReducer`], so it only acts on moves the detail slice
/// accepted (stale resolutions leave the displayed book untouched).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfSyncReducer;

impl ShelfSyncReducer {
    fn accepted<'a>(state: &'a AppState, book: &Book) -> Option<&'a Book> {
        state
            .details
            .current()
            .filter(|current| current.has_id(book.id()) && current.shelf == book.shelf)
    }
}

impl Reducer for ShelfSyncReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let book = match &action {
            AppAction::Details(
                DetailsAction::ShelfUpdated { book, .. } | DetailsAction::Removed { book, .. },
            ) => book,
            _ => return SmallVec::new(),
        };

        if !state.shelves.shelves.has_loaded() {
            return SmallVec::new();
        }
        if let Some(current) = Self::accepted(state, book).cloned() {
            tracing::debug!(id = current.id(), shelf = ?current.shelf, "Syncing shelf list");
            state.shelves.shelves.data.upsert(current);
        }
        SmallVec::new()
    }
}

/// Build the root reducer
#[must_use]
pub fn app_reducer() -> AppReducer {
    combine_reducers(vec![
        Box::new(scope_reducer(
            SearchReducer::catalog(),
            |s: &mut AppState| &mut s.search,
            |a: AppAction| match a {
                AppAction::Search(a) => Some(a),
                _ => None,
            },
            AppAction::Search,
        )),
        Box::new(scope_reducer(
            SearchReducer::shelves(),
            |s: &mut AppState| &mut s.shelf_search,
            |a: AppAction| match a {
                AppAction::ShelfSearch(a) => Some(a),
                _ => None,
            },
            AppAction::ShelfSearch,
        )),
        Box::new(scope_reducer(
            ShelvesReducer,
            |s: &mut AppState| &mut s.shelves,
            |a: AppAction| match a {
                AppAction::Shelves(a) => Some(a),
                _ => None,
            },
            AppAction::Shelves,
        )),
        Box::new(scope_reducer(
            DetailsReducer,
            |s: &mut AppState| &mut s.details,
            |a: AppAction| match a {
                AppAction::Details(a) => Some(a),
                _ => None,
            },
            AppAction::Details,
        )),
        Box::new(scope_reducer(
            BestsellersReducer,
            |s: &mut AppState| &mut s.bestsellers,
            |a: AppAction| match a {
                AppAction::Bestsellers(a) => Some(a),
                _ => None,
            },
            AppAction::Bestsellers,
        )),
        Box::new(scope_reducer(
            DarkModeReducer,
            |s: &mut AppState| &mut s.dark_mode,
            |a: AppAction| match a {
                AppAction::DarkMode(a) => Some(a),
                _ => None,
            },
            AppAction::DarkMode,
        )),
        Box::new(ShelfSyncReducer),
    ])
}

/// Create a store with empty state
#[must_use]
pub fn app_store(environment: AppEnvironment) -> AppStore {
    Store::new(AppState::default(), app_reducer(), environment)
}

/// Search the catalog (or the shelves) and wait until the results settle
///
/// A blank query clears the results without a request and returns at once.
///
/// # Errors
///
/// Returns a [`StoreError`] if the store is shutting down or nothing settles
/// within `wait`.
pub async fn run_search(
    store: &AppStore,
    shelves: bool,
    query: String,
    limit: usize,
    wait: Duration,
) -> Result<(), StoreError> {
    let waits = search::issues_request(&query);
    let request = SearchAction::Search { query, limit };
    let action = if shelves {
        AppAction::ShelfSearch(request)
    } else {
        AppAction::Search(request)
    };

    if !waits {
        let _ = store.send(action).await?;
        return Ok(());
    }

    let settled: fn(&AppAction) -> bool = if shelves { shelf_search_settled } else { catalog_search_settled };
    store.send_and_wait_for(action, settled, wait).await?;
    Ok(())
}

fn catalog_search_settled(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::Search(SearchAction::Loaded { .. } | SearchAction::Failed { .. })
    )
}

fn shelf_search_settled(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::ShelfSearch(SearchAction::Loaded { .. } | SearchAction::Failed { .. })
    )
}
