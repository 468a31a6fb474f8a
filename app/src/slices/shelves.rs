//! Shelf-list slice: the user's three shelves.

use crate::environment::AppEnvironment;
use crate::resource::{AsyncResource, RequestId};
use bookshelf_api::{ShelfTag, Shelves};
use bookshelf_core::selector::Selector;
use bookshelf_core::{Effect, Reducer, SmallVec, async_effect, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shelf-list slice state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelvesState {
    /// The shelves as last fetched (and kept current by shelf updates)
    pub shelves: AsyncResource<Shelves>,
}

/// Shelf-list actions
#[derive(Debug, Clone)]
pub enum ShelvesAction {
    /// Fetch all three shelves
    Fetch,
    /// Shelves fetched
    Loaded {
        /// Request being settled
        request: RequestId,
        /// The partitioned shelves
        shelves: Shelves,
    },
    /// Fetch failed; the last-known shelves stay visible
    Failed {
        /// Request being settled
        request: RequestId,
        /// Failure message
        error: String,
    },
}

/// Shelf-list reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelvesReducer;

impl Reducer for ShelvesReducer {
    type State = ShelvesState;
    type Action = ShelvesAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ShelvesAction::Fetch => {
                let request = state.shelves.begin();
                let gateway = Arc::clone(&env.gateway);

                smallvec![async_effect! {
                    match gateway.fetch_shelves().await {
                        Ok(shelves) => Some(ShelvesAction::Loaded { request, shelves }),
                        Err(error) => Some(ShelvesAction::Failed {
                            request,
                            error: error.to_string(),
                        }),
                    }
                }]
            },
            ShelvesAction::Loaded { request, shelves } => {
                let total = shelves.total();
                if state.shelves.fulfill(request, shelves, env.clock.now()) {
                    tracing::debug!(total, "Shelves loaded");
                }
                smallvec![Effect::None]
            },
            ShelvesAction::Failed { request, error } => {
                if state.shelves.reject(request, &error) {
                    tracing::warn!(%error, "Failed to load shelves");
                }
                smallvec![Effect::None]
            },
        }
    }
}

/// Books on one shelf
#[must_use]
pub fn shelf(state: &ShelvesState, tag: ShelfTag) -> &[bookshelf_api::Book] {
    state.shelves.data.get(tag)
}

/// Shelf currently holding the book `id`, per the loaded shelves
#[must_use]
pub fn shelf_of(state: &ShelvesState, id: &str) -> Option<ShelfTag> {
    state.shelves.data.shelf_of(id)
}

/// Memoized shelf-list selectors
pub struct ShelfSelectors {
    counts: Selector<ShelvesState, [usize; 3], [usize; 3]>,
    is_empty: Selector<ShelvesState, [usize; 3], bool>,
}

fn shelf_counts(state: &ShelvesState) -> [usize; 3] {
    ShelfTag::ALL.map(|tag| state.shelves.data.len(tag))
}

impl ShelfSelectors {
    /// Fresh selectors with empty caches
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Selector::new(shelf_counts, |counts| counts),
            is_empty: Selector::new(shelf_counts, |counts| counts.iter().all(|n| *n == 0)),
        }
    }

    /// Book counts per shelf, in [`ShelfTag::ALL`] order
    pub fn counts(&self, state: &ShelvesState) -> [usize; 3] {
        self.counts.select(state)
    }

    /// Whether every shelf is empty
    pub fn is_empty(&self, state: &ShelvesState) -> bool {
        self.is_empty.select(state)
    }

    /// How many times the emptiness check was recomputed
    pub fn is_empty_recomputations(&self) -> usize {
        self.is_empty.recomputations()
    }
}

impl Default for ShelfSelectors {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShelfSelectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelfSelectors").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_environment;
    use crate::resource::Status;
    use bookshelf_api::Book;
    use bookshelf_core::environment::Clock;
    use bookshelf_testing::{ReducerTest, assertions, test_clock};

    fn loaded() -> ShelvesState {
        let mut state = ShelvesState::default();
        let request = state.shelves.begin();
        let shelves = bookshelf_api::partition(vec![
            Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read)),
            Book::new("Emma", "9780141439587").with_shelf(Some(ShelfTag::WantToRead)),
        ]);
        state.shelves.fulfill(request, shelves, test_clock().now());
        state
    }

    #[test]
    fn fetch_starts_loading() {
        ReducerTest::new(ShelvesReducer)
            .with_env(test_environment())
            .given_state(ShelvesState::default())
            .when_action(ShelvesAction::Fetch)
            .then_state(|state| assert_eq!(state.shelves.status, Status::Loading))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn failure_keeps_last_known_shelves() {
        let mut state = loaded();
        let request = state.shelves.begin();

        ReducerTest::new(ShelvesReducer)
            .with_env(test_environment())
            .given_state(state)
            .when_action(ShelvesAction::Failed {
                request,
                error: String::new(),
            })
            .then_state(|state| {
                assert_eq!(state.shelves.status, Status::Failed);
                assert_eq!(state.shelves.error.as_deref(), Some("An error occurred"));
                assert_eq!(state.shelves.data.total(), 2);
            })
            .run();
    }

    #[test]
    fn selectors() {
        let state = loaded();
        let selectors = ShelfSelectors::new();

        assert_eq!(selectors.counts(&state), [0, 1, 1]);
        assert_eq!(shelf(&state, ShelfTag::Read)[0].title, "Dune");
        assert_eq!(shelf_of(&state, "9780141439587"), Some(ShelfTag::WantToRead));

        assert!(!selectors.is_empty(&state));
        assert!(!selectors.is_empty(&state));
        assert_eq!(selectors.is_empty_recomputations(), 1);

        assert!(selectors.is_empty(&ShelvesState::default()));
        assert_eq!(selectors.is_empty_recomputations(), 2);
    }
}
