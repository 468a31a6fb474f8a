//! Bestsellers slice: the fiction and non-fiction lists.

use crate::environment::AppEnvironment;
use crate::resource::{AsyncResource, RequestId, Status};
use bookshelf_api::{Book, Category};
use bookshelf_core::{Effect, Reducer, SmallVec, async_effect, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Both bestseller lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bestsellers {
    /// Fiction list
    pub fiction: Vec<Book>,
    /// Non-fiction list
    pub non_fiction: Vec<Book>,
}

impl Bestsellers {
    /// List for `category`
    #[must_use]
    pub fn get(&self, category: Category) -> &[Book] {
        match category {
            Category::Fiction => &self.fiction,
            Category::NonFiction => &self.non_fiction,
        }
    }
}

/// Bestsellers slice state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestsellersState {
    /// Both lists, fetched together
    pub lists: AsyncResource<Bestsellers>,
}

/// Bestsellers actions
#[derive(Debug, Clone)]
pub enum BestsellersAction {
    /// Fetch both lists
    Fetch,
    /// Both lists fetched
    Loaded {
        /// Request being settled
        request: RequestId,
        /// The lists
        lists: Bestsellers,
    },
    /// Either list failed; the last-known lists stay
    Failed {
        /// Request being settled
        request: RequestId,
        /// Failure message
        error: String,
    },
}

/// Bestsellers reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct BestsellersReducer;

impl Reducer for BestsellersReducer {
    type State = BestsellersState;
    type Action = BestsellersAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BestsellersAction::Fetch => {
                let request = state.lists.begin();
                let gateway = Arc::clone(&env.gateway);

                smallvec![async_effect! {
                    let lists = futures::try_join!(
                        gateway.fetch_bestsellers(Category::Fiction),
                        gateway.fetch_bestsellers(Category::NonFiction),
                    );
                    match lists {
                        Ok((fiction, non_fiction)) => Some(BestsellersAction::Loaded {
                            request,
                            lists: Bestsellers { fiction, non_fiction },
                        }),
                        Err(error) => Some(BestsellersAction::Failed {
                            request,
                            error: error.to_string(),
                        }),
                    }
                }]
            },
            BestsellersAction::Loaded { request, lists } => {
                state.lists.fulfill(request, lists, env.clock.now());
                smallvec![Effect::None]
            },
            BestsellersAction::Failed { request, error } => {
                if state.lists.reject(request, &error) {
                    tracing::warn!(%error, "Failed to load bestsellers");
                }
                smallvec![Effect::None]
            },
        }
    }
}

/// Fiction list
#[must_use]
pub fn fiction(state: &BestsellersState) -> &[Book] {
    state.lists.data.get(Category::Fiction)
}

/// Non-fiction list
#[must_use]
pub fn non_fiction(state: &BestsellersState) -> &[Book] {
    state.lists.data.get(Category::NonFiction)
}

/// Lifecycle status of the lists
#[must_use]
pub const fn status(state: &BestsellersState) -> Status {
    state.lists.status
}
