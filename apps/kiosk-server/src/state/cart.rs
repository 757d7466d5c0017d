//! # Session Carts
//!
//! In-memory [`CartRepository`] keyed by the session's cart id.
//!
//! ## Why a Mutex?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two requests from the same visitor can land on different tokio         │
//! │  workers at the same time:                                              │
//! │                                                                         │
//! │  Request A: POST /api/cart/lines      Request B: PATCH /api/cart/...    │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Mutex<HashMap<SessionId, StoredCart>>                          │   │
//! │  │                                                                 │   │
//! │  │  A: lock → load → insert line → save → unlock                   │   │
//! │  │  B:        (waits)                      lock → load → ...       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  `update` holds the lock for the whole read-modify-write, so neither   │
//! │  request loses the other's change. The lock is never held across an   │
//! │  `.await`.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use kiosk_core::{Cart, CartRepository, SessionId};
use tracing::debug;

struct StoredCart {
    cart: Cart,
    touched: Instant,
}

/// Carts for every live session. Cheap to clone.
#[derive(Clone)]
pub struct SessionCarts {
    inner: Arc<Mutex<HashMap<SessionId, StoredCart>>>,
    ttl: Duration,
}

impl SessionCarts {
    /// Carts untouched for `ttl` are dropped, matching session expiry.
    pub fn new(ttl: Duration) -> Self {
        SessionCarts {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of carts currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops carts whose session has been idle longer than the ttl.
    pub fn prune_expired(&self) -> usize {
        let mut carts = self.lock();
        let before = carts.len();
        let ttl = self.ttl;
        carts.retain(|_, stored| stored.touched.elapsed() < ttl);
        let removed = before - carts.len();
        if removed > 0 {
            debug!(removed, "Pruned expired carts");
        }
        removed
    }

    // A panic while the lock is held cannot leave a half-written cart:
    // carts are replaced whole. Recover the guard instead of propagating.
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, StoredCart>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn live_cart(&self, carts: &HashMap<SessionId, StoredCart>, session: &SessionId) -> Option<Cart> {
        carts
            .get(session)
            .filter(|stored| stored.touched.elapsed() < self.ttl)
            .map(|stored| stored.cart.clone())
    }
}

impl std::fmt::Debug for SessionCarts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCarts")
            .field("carts", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CartRepository for SessionCarts {
    fn load(&self, session: &SessionId) -> Cart {
        let carts = self.lock();
        self.live_cart(&carts, session).unwrap_or_default()
    }

    fn save(&self, session: &SessionId, cart: Cart) {
        self.lock().insert(
            session.clone(),
            StoredCart {
                cart,
                touched: Instant::now(),
            },
        );
    }

    fn update<F, R>(&self, session: &SessionId, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.lock();
        let mut cart = self.live_cart(&carts, session).unwrap_or_default();
        let result = f(&mut cart);
        carts.insert(
            session.clone(),
            StoredCart {
                cart,
                touched: Instant::now(),
            },
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::LineItemRequest;

    #[test]
    fn test_unknown_session_is_empty() {
        let carts = SessionCarts::new(Duration::from_secs(60));
        assert!(carts.load(&SessionId::new("nobody")).is_empty());
        assert!(carts.is_empty());
    }

    #[test]
    fn test_update_persists() {
        let carts = SessionCarts::new(Duration::from_secs(60));
        let session = SessionId::new("a");

        let line_id = carts.update(&session, |cart| cart.insert(LineItemRequest::new(1, 1, 2)));

        let cart = carts.load(&session);
        assert_eq!(cart.lines().len(), 1);
        assert!(cart.line(&line_id).is_some());
        assert!(carts.load(&SessionId::new("b")).is_empty());
    }

    #[test]
    fn test_expired_carts_are_dropped() {
        let carts = SessionCarts::new(Duration::ZERO);
        let session = SessionId::new("a");
        carts.update(&session, |cart| cart.insert(LineItemRequest::new(1, 1, 1)));

        assert!(carts.load(&session).is_empty());
        assert_eq!(carts.prune_expired(), 1);
        assert!(carts.is_empty());
    }
}
