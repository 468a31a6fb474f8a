//! Bearer-token retrieval for outbound calls.
//!
//! The gateway never talks to the auth provider directly. It asks a
//! [`TokenSource`] for a token on every request; [`SessionBridge`] is the
//! source handed to the gateway at construction, and the auth layer plugs the
//! provider's real source into it once a session exists.

use crate::error::GatewayError;
use futures::future::BoxFuture;
use std::sync::{Arc, RwLock};

/// Something that can produce the current session's bearer token
pub trait TokenSource: Send + Sync {
    /// Fetch the token for the next request
    ///
    /// Called once per request; implementations may refresh silently.
    fn access_token(&self) -> BoxFuture<'_, Result<String, GatewayError>>;
}

/// A fixed token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token string
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, Result<String, GatewayError>> {
        let token = self.0.clone();
        Box::pin(async move { Ok(token) })
    }
}

type Slot = Arc<RwLock<Option<Arc<dyn TokenSource>>>>;

/// Single-slot holder for the session's token source
///
/// Clones share the slot, so the auth layer and the gateway can each hold one.
/// Before [`initialize`](Self::initialize) every token request fails with
/// [`GatewayError::AuthNotInitialized`]. Tokens are never cached here.
#[derive(Clone, Default)]
pub struct SessionBridge {
    slot: Slot,
}

impl SessionBridge {
    /// An empty bridge
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `source` as the session's token source
    ///
    /// Returns `false` when `source` is the one already installed, in which
    /// case nothing changes.
    pub fn initialize(&self, source: Arc<dyn TokenSource>) -> bool {
        let mut slot = match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, &source)) {
            return false;
        }

        tracing::debug!("Session token source installed");
        *slot = Some(source);
        true
    }

    /// Drop the token source (logout)
    pub fn clear(&self) {
        let mut slot = match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.take().is_some() {
            tracing::debug!("Session token source cleared");
        }
    }

    /// Whether a token source is installed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<dyn TokenSource>> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl TokenSource for SessionBridge {
    fn access_token(&self) -> BoxFuture<'_, Result<String, GatewayError>> {
        let source = self.current();
        Box::pin(async move {
            match source {
                Some(source) => source.access_token().await,
                None => Err(GatewayError::AuthNotInitialized),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out a fresh token on every call
    struct RotatingToken(AtomicUsize);

    impl TokenSource for RotatingToken {
        fn access_token(&self) -> BoxFuture<'_, Result<String, GatewayError>> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(format!("token-{n}")) })
        }
    }

    #[tokio::test]
    async fn fails_before_initialization() {
        let bridge = SessionBridge::new();
        assert_eq!(bridge.access_token().await, Err(GatewayError::AuthNotInitialized));
    }

    #[tokio::test]
    async fn never_caches_tokens() {
        let bridge = SessionBridge::new();
        bridge.initialize(Arc::new(RotatingToken(AtomicUsize::new(0))));

        assert_eq!(bridge.access_token().await.unwrap(), "token-0");
        assert_eq!(bridge.access_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn reinitialization_is_idempotent_for_same_source() {
        let bridge = SessionBridge::new();
        let gateway_view = bridge.clone();
        let source: Arc<dyn TokenSource> = Arc::new(StaticToken::new("a"));

        assert!(bridge.initialize(Arc::clone(&source)));
        assert!(!bridge.initialize(Arc::clone(&source)));
        assert!(bridge.initialize(Arc::new(StaticToken::new("b"))));
        assert_eq!(gateway_view.access_token().await.unwrap(), "b");

        bridge.clear();
        assert_eq!(gateway_view.access_token().await, Err(GatewayError::AuthNotInitialized));
    }
}
