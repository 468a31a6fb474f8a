//! In-memory stand-ins for the backend, the preference store and the appearance.
//!
//! Used by this crate's tests and by anything embedding the store without a
//! real backend.

use crate::environment::AppEnvironment;
use crate::theme::{Appearance, PreferenceError, PreferenceStore, Theme, ThemePreference};
use bookshelf_api::{
    Book, BookGateway, Category, GatewayError, SearchScope, ShelfTag, ShelfTransition, Shelves,
    partition,
};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Gateway operations, for injecting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch_shelves`
    FetchShelves,
    /// `fetch_book`
    FetchBook,
    /// `search`
    Search,
    /// `fetch_bestsellers`
    Bestsellers,
    /// Create request of a shelf transition
    Create,
    /// Patch request of a shelf transition
    Patch,
    /// `remove_from_shelf`
    Delete,
}

/// A request the mock gateway received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Shelves fetched
    FetchShelves,
    /// Book fetched by id
    FetchBook(String),
    /// Search issued
    Search {
        /// Endpoint
        scope: SearchScope,
        /// Query text
        query: String,
        /// Result limit
        limit: usize,
    },
    /// Bestseller list fetched
    Bestsellers(Category),
    /// `POST /book`
    Create {
        /// Book id
        id: String,
        /// Target shelf
        shelf: ShelfTag,
    },
    /// `PATCH /book/{id}`
    Patch {
        /// Book id
        id: String,
        /// Target shelf
        shelf: ShelfTag,
    },
    /// `DELETE /book/{id}`
    Delete(String),
}

#[derive(Default)]
struct Backend {
    shelved: Vec<Book>,
    catalog: Vec<Book>,
    bestsellers: HashMap<Category, Vec<Book>>,
    failures: HashMap<Operation, GatewayError>,
    delays: HashMap<String, Duration>,
    calls: Vec<Call>,
}

impl Backend {
    fn check(&self, operation: Operation) -> Result<(), GatewayError> {
        self.failures.get(&operation).cloned().map_or(Ok(()), Err)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.shelved.iter().position(|book| book.has_id(id))
    }

    fn create(&mut self, book: &Book, shelf: ShelfTag) -> Result<(), GatewayError> {
        self.calls.push(Call::Create {
            id: book.id().to_string(),
            shelf,
        });
        self.check(Operation::Create)?;
        if self.position(book.id()).is_some() {
            return Err(GatewayError::Conflict("Book already on a shelf".into()));
        }
        self.shelved.push(book.clone().with_shelf(Some(shelf)));
        Ok(())
    }

    fn patch(&mut self, book: &Book, shelf: ShelfTag) -> Result<(), GatewayError> {
        self.calls.push(Call::Patch {
            id: book.id().to_string(),
            shelf,
        });
        self.check(Operation::Patch)?;
        let Some(index) = self.position(book.id()) else {
            return Err(GatewayError::Conflict("Book not on a shelf".into()));
        };
        self.shelved[index].shelf = Some(shelf);
        Ok(())
    }
}

/// In-memory backend
///
/// Shelved books live in one flat table, like the backend's; the shelves are
/// built from it with [`partition`]. Every request is recorded in
/// [`MockGateway::calls`].
#[derive(Default)]
pub struct MockGateway {
    backend: Mutex<Backend>,
}

impl MockGateway {
    /// An empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `book` in the shelved table (its tag is its shelf)
    #[must_use]
    pub fn with_shelved(self, book: Book) -> Self {
        lock(&self.backend).shelved.push(book);
        self
    }

    /// Put `book` in the searchable catalog
    #[must_use]
    pub fn with_catalog(self, book: Book) -> Self {
        lock(&self.backend).catalog.push(book);
        self
    }

    /// Set a bestseller list
    #[must_use]
    pub fn with_bestsellers(self, category: Category, books: Vec<Book>) -> Self {
        lock(&self.backend).bestsellers.insert(category, books);
        self
    }

    /// Make `operation` fail with `error` until cleared
    pub fn fail(&self, operation: Operation, error: GatewayError) {
        lock(&self.backend).failures.insert(operation, error);
    }

    /// Stop failing `operation`
    pub fn recover(&self, operation: Operation) {
        lock(&self.backend).failures.remove(&operation);
    }

    /// Delay searches for exactly `query`
    pub fn delay_search(&self, query: impl Into<String>, delay: Duration) {
        lock(&self.backend).delays.insert(query.into(), delay);
    }

    /// Requests received so far
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.backend).calls.clone()
    }

    /// Requests received so far that changed a shelf
    #[must_use]
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Create { .. } | Call::Patch { .. } | Call::Delete(_)))
            .collect()
    }

    /// The backend's current shelves
    #[must_use]
    pub fn shelves(&self) -> Shelves {
        partition(lock(&self.backend).shelved.clone())
    }
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = lock(&self.backend);
        f.debug_struct("MockGateway")
            .field("shelved", &backend.shelved.len())
            .field("catalog", &backend.catalog.len())
            .field("calls", &backend.calls.len())
            .finish_non_exhaustive()
    }
}

impl BookGateway for MockGateway {
    fn fetch_shelves(&self) -> BoxFuture<'_, Result<Shelves, GatewayError>> {
        Box::pin(async move {
            let mut backend = lock(&self.backend);
            backend.calls.push(Call::FetchShelves);
            backend.check(Operation::FetchShelves)?;
            Ok(partition(backend.shelved.clone()))
        })
    }

    fn fetch_book<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Book, GatewayError>> {
        Box::pin(async move {
            let mut backend = lock(&self.backend);
            backend.calls.push(Call::FetchBook(id.to_string()));
            backend.check(Operation::FetchBook)?;
            backend
                .shelved
                .iter()
                .chain(&backend.catalog)
                .find(|book| book.has_id(id))
                .cloned()
                .ok_or_else(|| GatewayError::NotFound("Book not found".into()))
        })
    }

    fn search<'a>(
        &'a self,
        scope: SearchScope,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Book>, GatewayError>> {
        Box::pin(async move {
            let delay = {
                let mut backend = lock(&self.backend);
                backend.calls.push(Call::Search {
                    scope,
                    query: query.to_string(),
                    limit,
                });
                backend.delays.get(query).copied()
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let backend = lock(&self.backend);
            backend.check(Operation::Search)?;
            let source = match scope {
                SearchScope::Catalog => &backend.catalog,
                SearchScope::Shelves => &backend.shelved,
            };
            let needle = query.to_lowercase();
            Ok(source
                .iter()
                .filter(|book| book.title.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect())
        })
    }

    fn fetch_bestsellers(&self, category: Category) -> BoxFuture<'_, Result<Vec<Book>, GatewayError>> {
        Box::pin(async move {
            let mut backend = lock(&self.backend);
            backend.calls.push(Call::Bestsellers(category));
            backend.check(Operation::Bestsellers)?;
            Ok(backend.bestsellers.get(&category).cloned().unwrap_or_default())
        })
    }

    fn apply_transition<'a>(
        &'a self,
        book: &'a Book,
        target: ShelfTag,
    ) -> BoxFuture<'a, Result<ShelfTransition, GatewayError>> {
        Box::pin(async move {
            let mut backend = lock(&self.backend);
            match ShelfTransition::plan(book, target) {
                ShelfTransition::Unchanged(tag) => Ok(ShelfTransition::Unchanged(tag)),
                ShelfTransition::Create(tag) => match backend.create(book, tag) {
                    Err(error) if error.is_conflict() => {
                        backend.patch(book, tag)?;
                        Ok(ShelfTransition::Patch(tag))
                    },
                    result => result.map(|()| ShelfTransition::Create(tag)),
                },
                ShelfTransition::Patch(tag) => match backend.patch(book, tag) {
                    Err(error) if error.is_conflict() || error.is_not_found() => {
                        backend.create(book, tag)?;
                        Ok(ShelfTransition::Create(tag))
                    },
                    result => result.map(|()| ShelfTransition::Patch(tag)),
                },
            }
        })
    }

    fn remove_from_shelf<'a>(&'a self, book: &'a Book) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            let mut backend = lock(&self.backend);
            backend.calls.push(Call::Delete(book.id().to_string()));
            backend.check(Operation::Delete)?;
            let index = backend
                .position(book.id())
                .ok_or_else(|| GatewayError::NotFound("Book not on a shelf".into()))?;
            backend.shelved.remove(index);
            Ok(())
        })
    }
}

/// Preferences held in memory
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    stored: Mutex<Option<ThemePreference>>,
    fail_saves: AtomicBool,
}

impl InMemoryPreferences {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage already holding `mode`
    #[must_use]
    pub fn with_stored(mode: ThemePreference) -> Self {
        Self {
            stored: Mutex::new(Some(mode)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// What is stored now
    #[must_use]
    pub fn stored(&self) -> Option<ThemePreference> {
        *lock(&self.stored)
    }

    /// Make saves fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError> {
        Ok(self.stored())
    }

    fn save(&self, mode: ThemePreference) -> Result<(), PreferenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PreferenceError::Io(std::io::Error::other("storage unavailable")));
        }
        *lock(&self.stored) = Some(mode);
        Ok(())
    }
}

/// Appearance with a settable system preference
#[derive(Debug, Default)]
pub struct FixedAppearance {
    prefers_dark: AtomicBool,
    applied: Mutex<Option<Theme>>,
}

impl FixedAppearance {
    /// A system that prefers dark iff `prefers_dark`
    #[must_use]
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            applied: Mutex::new(None),
        }
    }

    /// Change the system preference
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        self.prefers_dark.store(prefers_dark, Ordering::SeqCst);
    }
}

impl Appearance for FixedAppearance {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::SeqCst)
    }

    fn apply_theme(&self, theme: Theme) {
        *lock(&self.applied) = Some(theme);
    }

    fn current_theme(&self) -> Option<Theme> {
        *lock(&self.applied)
    }
}

/// The three mocks, kept together so tests can inspect them after building an environment
#[derive(Debug, Clone)]
pub struct Mocks {
    /// Backend
    pub gateway: Arc<MockGateway>,
    /// Preference storage
    pub preferences: Arc<InMemoryPreferences>,
    /// Appearance (system prefers light)
    pub appearance: Arc<FixedAppearance>,
}

impl Mocks {
    /// Fresh mocks around `gateway`
    #[must_use]
    pub fn new(gateway: MockGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            preferences: Arc::new(InMemoryPreferences::new()),
            appearance: Arc::new(FixedAppearance::new(false)),
        }
    }

    /// An environment wired to these mocks
    #[must_use]
    pub fn environment(&self) -> AppEnvironment {
        AppEnvironment::new(
            Arc::clone(&self.gateway) as Arc<dyn BookGateway>,
            Arc::clone(&self.preferences) as Arc<dyn PreferenceStore>,
            Arc::clone(&self.appearance) as Arc<dyn Appearance>,
        )
    }
}

impl Default for Mocks {
    fn default() -> Self {
        Self::new(MockGateway::new())
    }
}

/// An environment backed by empty mocks
#[must_use]
pub fn test_environment() -> AppEnvironment {
    Mocks::default().environment()
}
