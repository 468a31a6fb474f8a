//! Book-detail slice: one book, and the moves between shelves made from its page.

use crate::environment::AppEnvironment;
use crate::resource::{AsyncResource, RequestId};
use bookshelf_api::{Book, ShelfTag, ShelfTransition};
use bookshelf_core::{Effect, Reducer, SmallVec, async_effect, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Book-detail slice state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailsState {
    /// The displayed book; `None` until one has loaded
    pub book: AsyncResource<Option<Book>>,
}

impl DetailsState {
    /// The displayed book, if any
    #[must_use]
    pub const fn current(&self) -> Option<&Book> {
        self.book.data.as_ref()
    }
}

/// Book-detail actions
#[derive(Debug, Clone)]
pub enum DetailsAction {
    /// Fetch a book by ISBN-13 or ISBN-10
    Fetch {
        /// Book identifier
        id: String,
    },
    /// Book fetched
    Loaded {
        /// Request being settled
        request: RequestId,
        /// The book
        book: Book,
    },
    /// Put the displayed book on `shelf`
    MoveToShelf {
        /// Target shelf
        shelf: ShelfTag,
    },
    /// The server accepted a shelf move
    ShelfUpdated {
        /// Request being settled
        request: RequestId,
        /// The book as it now stands
        book: Book,
        /// What was sent to get it there
        transition: ShelfTransition,
    },
    /// Take the displayed book off its shelf
    RemoveFromShelf,
    /// The server accepted a removal
    Removed {
        /// Request being settled
        request: RequestId,
        /// The book with its shelf tag cleared
        book: Book,
    },
    /// A fetch, move, or removal failed; the displayed book is left as it was
    Failed {
        /// Request being settled
        request: RequestId,
        /// Failure message
        error: String,
    },
}

/// Book-detail reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailsReducer;

impl DetailsReducer {
    fn failed(request: RequestId, error: &bookshelf_api::GatewayError) -> Option<DetailsAction> {
        Some(DetailsAction::Failed {
            request,
            error: error.to_string(),
        })
    }
}

/// Change only the shelf tag of the displayed book, if it is `book`
fn retag(current: &mut Option<Book>, book: &Book) {
    if let Some(current) = current.as_mut().filter(|current| current.has_id(book.id())) {
        current.shelf = book.shelf;
    }
}

impl Reducer for DetailsReducer {
    type State = DetailsState;
    type Action = DetailsAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DetailsAction::Fetch { id } => {
                if state.current().is_some_and(|book| !book.has_id(&id)) {
                    state.book.data = None;
                }
                let request = state.book.begin();
                let gateway = Arc::clone(&env.gateway);

                smallvec![async_effect! {
                    match gateway.fetch_book(&id).await {
                        Ok(book) => Some(DetailsAction::Loaded { request, book }),
                        Err(error) => Self::failed(request, &error),
                    }
                }]
            },
            DetailsAction::Loaded { request, book } => {
                state.book.fulfill(request, Some(book), env.clock.now());
                smallvec![Effect::None]
            },
            DetailsAction::MoveToShelf { shelf } => {
                let Some(book) = state.current().cloned() else {
                    tracing::debug!(%shelf, "No book to move");
                    return smallvec![Effect::None];
                };
                if let ShelfTransition::Unchanged(_) = ShelfTransition::plan(&book, shelf) {
                    tracing::debug!(id = book.id(), %shelf, "Book already on shelf");
                    return smallvec![Effect::None];
                }

                let request = state.book.begin();
                let gateway = Arc::clone(&env.gateway);

                smallvec![async_effect! {
                    let result = gateway.apply_transition(&book, shelf).await;
                    match result {
                        Ok(transition) => Some(DetailsAction::ShelfUpdated {
                            request,
                            book: book.with_shelf(Some(transition.target())),
                            transition,
                        }),
                        Err(error) => Self::failed(request, &error),
                    }
                }]
            },
            DetailsAction::ShelfUpdated {
                request,
                book,
                transition,
            } => {
                if state.book.update(request, env.clock.now(), |current| retag(current, &book)) {
                    tracing::info!(id = book.id(), ?transition, "Moved book");
                }
                smallvec![Effect::None]
            },
            DetailsAction::RemoveFromShelf => {
                let Some(book) = state.current().filter(|book| book.shelf.is_some()).cloned() else {
                    tracing::debug!("No shelved book to remove");
                    return smallvec![Effect::None];
                };

                let request = state.book.begin();
                let gateway = Arc::clone(&env.gateway);

                smallvec![async_effect! {
                    let result = gateway.remove_from_shelf(&book).await;
                    match result {
                        Ok(()) => Some(DetailsAction::Removed {
                            request,
                            book: book.with_shelf(None),
                        }),
                        Err(error) => Self::failed(request, &error),
                    }
                }]
            },
            DetailsAction::Removed { request, book } => {
                if state.book.update(request, env.clock.now(), |current| retag(current, &book)) {
                    tracing::info!(id = book.id(), "Removed book from its shelf");
                }
                smallvec![Effect::None]
            },
            DetailsAction::Failed { request, error } => {
                if !state.book.reject(request, &error) {
                    tracing::debug!(%request, "Dropped stale book failure");
                }
                smallvec![Effect::None]
            },
        }
    }
}
