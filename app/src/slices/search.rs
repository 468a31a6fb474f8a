//! Search slice: a debounced query and the results of the latest search.
//!
//! One reducer type serves both the catalog search and the shelf search;
//! they differ only in endpoint and debounce id.

use crate::environment::AppEnvironment;
use crate::resource::{AsyncResource, RequestId};
use bookshelf_api::{Book, SearchScope};
use bookshelf_core::{Effect, EffectId, Reducer, SmallVec, async_effect, debounce, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Debounce timer of the catalog search
pub const CATALOG_DEBOUNCE: EffectId = EffectId::new("search.catalog.debounce");

/// Debounce timer of the shelf search
pub const SHELF_DEBOUNCE: EffectId = EffectId::new("search.shelves.debounce");

/// Whether searching for `query` reaches the backend
///
/// Blank queries only clear the results.
#[must_use]
pub fn issues_request(query: &str) -> bool {
    !query.trim().is_empty()
}

/// Search slice state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Current input text
    pub query: String,
    /// Results of the latest search
    pub results: AsyncResource<Vec<Book>>,
}

/// Search slice actions
#[derive(Debug, Clone)]
pub enum SearchAction {
    /// Input text changed; searched once typing pauses
    QueryChanged {
        /// New input text
        query: String,
    },
    /// Search the current input now
    Submit,
    /// The search view went away; drop any pending debounce
    Dismiss,
    /// Run a search
    Search {
        /// Query text
        query: String,
        /// Maximum results
        limit: usize,
    },
    /// A search succeeded
    Loaded {
        /// Request being settled
        request: RequestId,
        /// Normalized results
        books: Vec<Book>,
    },
    /// A search failed
    Failed {
        /// Request being settled
        request: RequestId,
        /// Failure message
        error: String,
    },
}

/// Search reducer for one endpoint
#[derive(Debug, Clone, Copy)]
pub struct SearchReducer {
    scope: SearchScope,
    debounce_id: EffectId,
}

impl SearchReducer {
    /// Catalog search (`/search/books`)
    #[must_use]
    pub const fn catalog() -> Self {
        Self {
            scope: SearchScope::Catalog,
            debounce_id: CATALOG_DEBOUNCE,
        }
    }

    /// Shelf search (`/search/shelves`)
    #[must_use]
    pub const fn shelves() -> Self {
        Self {
            scope: SearchScope::Shelves,
            debounce_id: SHELF_DEBOUNCE,
        }
    }

    /// Debounce id used by this reducer
    #[must_use]
    pub const fn debounce_id(&self) -> EffectId {
        self.debounce_id
    }

    fn search(
        &self,
        state: &mut SearchState,
        query: String,
        limit: usize,
        env: &AppEnvironment,
    ) -> Effect<SearchAction> {
        if !issues_request(&query) {
            state.results.reset();
            return Effect::None;
        }

        let request = state.results.begin();
        let gateway = Arc::clone(&env.gateway);
        let scope = self.scope;

        tracing::debug!(?scope, %query, limit, %request, "Searching");

        async_effect! {
            match gateway.search(scope, query.trim(), limit).await {
                Ok(mut books) => {
                    books.truncate(limit);
                    Some(SearchAction::Loaded { request, books })
                },
                Err(error) => Some(SearchAction::Failed {
                    request,
                    error: error.to_string(),
                }),
            }
        }
    }
}

impl Reducer for SearchReducer {
    type State = SearchState;
    type Action = SearchAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SearchAction::QueryChanged { query } => {
                state.query.clone_from(&query);
                if query.trim().is_empty() {
                    state.results.reset();
                    return smallvec![Effect::Cancel(self.debounce_id)];
                }
                smallvec![debounce! {
                    id: self.debounce_id,
                    duration: env.debounce,
                    action: SearchAction::Search { query, limit: env.search_limit }
                }]
            },
            SearchAction::Submit => {
                let query = state.query.clone();
                let search = self.search(state, query, env.search_limit, env);
                smallvec![Effect::Cancel(self.debounce_id), search]
            },
            SearchAction::Dismiss => smallvec![Effect::Cancel(self.debounce_id)],
            SearchAction::Search { query, limit } => {
                smallvec![self.search(state, query, limit, env)]
            },
            SearchAction::Loaded { request, books } => {
                if !state.results.fulfill(request, books, env.clock.now()) {
                    tracing::debug!(%request, "Dropped stale search results");
                }
                smallvec![Effect::None]
            },
            SearchAction::Failed { request, error } => {
                if !state.results.reject_and_clear(request, &error) {
                    tracing::debug!(%request, "Dropped stale search failure");
                }
                smallvec![Effect::None]
            },
        }
    }
}
