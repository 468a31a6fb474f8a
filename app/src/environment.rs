//! Dependencies injected into every slice reducer.

use crate::theme::{Appearance, PreferenceStore};
use bookshelf_api::BookGateway;
use bookshelf_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Results requested per search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Quiet period before a typed query is searched
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// Environment shared by all slices
#[derive(Clone)]
pub struct AppEnvironment {
    /// Backend gateway
    pub gateway: Arc<dyn BookGateway>,
    /// Theme preference storage
    pub preferences: Arc<dyn PreferenceStore>,
    /// Where themes are applied
    pub appearance: Arc<dyn Appearance>,
    /// Clock for `updated_at` stamps
    pub clock: Arc<dyn Clock>,
    /// Results requested per search
    pub search_limit: usize,
    /// Search debounce period
    pub debounce: Duration,
}

impl AppEnvironment {
    /// Create an environment with the default clock, limit, and debounce
    #[must_use]
    pub fn new(
        gateway: Arc<dyn BookGateway>,
        preferences: Arc<dyn PreferenceStore>,
        appearance: Arc<dyn Appearance>,
    ) -> Self {
        Self {
            gateway,
            preferences,
            appearance,
            clock: Arc::new(SystemClock),
            search_limit: DEFAULT_SEARCH_LIMIT,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Use a different clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the search limit
    #[must_use]
    pub const fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the debounce period
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment")
            .field("search_limit", &self.search_limit)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}
