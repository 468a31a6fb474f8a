//! The idle / loading / failed lifecycle every slice tracks its server data with.

use bookshelf_core::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used when a failure carries no message of its own
pub const FALLBACK_ERROR: &str = "An error occurred";

/// Lifecycle status of an [`AsyncResource`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Nothing in flight; data is the last successful result
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The latest request failed
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Failed => "failed",
        })
    }
}

/// Sequence number of a request issued for one resource
///
/// Carried by the fulfilled/rejected action so the reducer can drop
/// resolutions of requests that have since been superseded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Server data plus its request lifecycle
///
/// `error` is only set while `status` is [`Status::Failed`]. Only the most
/// recently issued request may settle the resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncResource<T> {
    /// Last successful result
    pub data: T,
    /// Lifecycle status
    pub status: Status,
    /// Failure message of the latest request
    pub error: Option<String>,
    /// When `data` was last replaced or updated by a request
    pub updated_at: Option<DateTime<Utc>>,
    latest: RequestId,
}

impl<T: Default> Default for AsyncResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> AsyncResource<T> {
    /// An idle resource holding `data`
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            data,
            status: Status::Idle,
            error: None,
            updated_at: None,
            latest: RequestId(0),
        }
    }

    /// Issue a new request: status becomes loading and earlier requests go stale
    pub fn begin(&mut self) -> RequestId {
        self.latest = self.latest.next();
        self.status = Status::Loading;
        self.error = None;
        self.latest
    }

    /// Whether `request` is the latest one issued
    #[must_use]
    pub fn is_current(&self, request: RequestId) -> bool {
        request == self.latest
    }

    /// Replace the data with a successful result
    ///
    /// Returns `false` (and changes nothing) for a stale request.
    pub fn fulfill(&mut self, request: RequestId, data: T, at: DateTime<Utc>) -> bool {
        self.update(request, at, |current| *current = data)
    }

    /// Apply a targeted change with a successful result
    ///
    /// Returns `false` (and changes nothing) for a stale request.
    pub fn update<F>(&mut self, request: RequestId, at: DateTime<Utc>, change: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if !self.is_current(request) {
            return false;
        }
        change(&mut self.data);
        self.status = Status::Idle;
        self.error = None;
        self.updated_at = Some(at);
        true
    }

    /// Record a failure, keeping the last-known data
    ///
    /// An empty message is replaced by [`FALLBACK_ERROR`]. Returns `false`
    /// (and changes nothing) for a stale request.
    pub fn reject(&mut self, request: RequestId, error: &str) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.status = Status::Failed;
        self.error = Some(if error.is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            error.to_string()
        });
        true
    }

    /// Whether data has been loaded at least once
    #[must_use]
    pub const fn has_loaded(&self) -> bool {
        self.updated_at.is_some()
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    /// Whether the latest request failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }
}

impl<T: Default> AsyncResource<T> {
    /// Record a failure and clear the data
    pub fn reject_and_clear(&mut self, request: RequestId, error: &str) -> bool {
        let rejected = self.reject(request, error);
        if rejected {
            self.data = T::default();
        }
        rejected
    }

    /// Back to idle and empty; any request in flight goes stale
    pub fn reset(&mut self) {
        self.latest = self.latest.next();
        self.data = T::default();
        self.status = Status::Idle;
        self.error = None;
    }
}
