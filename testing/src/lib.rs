//! # Bookshelf Testing
//!
//! Testing utilities for the bookshelf state layer.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for slice reducers
//! - [`assertions`]: Helpers for inspecting returned effects
//! - [`FixedClock`]: Deterministic time for environments
//!
//! ## Example
//!
//! ```ignore
//! use bookshelf_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(DetailsReducer)
//!     .with_env(test_environment())
//!     .given_state(DetailsState::default())
//!     .when_action(DetailsAction::Fetch { id: "9780441013593".into() })
//!     .then_state(|state| assert!(state.book.is_loading()))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use bookshelf_core::environment::Clock;
use chrono::{DateTime, Utc};


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_testing::mocks::FixedClock;
    /// use bookshelf_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
