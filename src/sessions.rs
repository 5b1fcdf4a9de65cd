use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::services::cart::Cart;

/// Per-session state: the shopping cart plus the last-activity timestamp.
#[derive(Debug)]
struct Session {
    cart: Cart,
    last_activity: Instant,
}

impl Session {
    fn fresh() -> Self {
        Self {
            cart: Cart::default(),
            last_activity: Instant::now(),
        }
    }
}

/// In-memory session store keyed by an opaque session id.
///
/// Sessions idle for longer than the configured timeout are reset to an empty
/// cart on next access, mirroring an idle-timeout logout. Carts are never
/// persisted beyond the session lifetime.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Returns a snapshot of the session's cart, creating the session when
    /// absent and resetting it when idle-expired. Touches last activity.
    pub fn cart(&self, session_id: &str) -> Cart {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::fresh);
        self.touch(entry.value_mut());
        entry.cart.clone()
    }

    /// Mutates the session's cart through the given closure.
    pub fn update<R>(&self, session_id: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::fresh);
        self.touch(entry.value_mut());
        f(&mut entry.value_mut().cart)
    }

    /// Drops the session entirely.
    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    fn touch(&self, session: &mut Session) {
        let now = Instant::now();
        if now.duration_since(session.last_activity) > self.idle_timeout {
            *session = Session::fresh();
        } else {
            session.last_activity = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn cart_survives_between_accesses() {
        let store = SessionStore::new(Duration::from_secs(900));
        let product_id = Uuid::new_v4();

        store.update("s1", |cart| cart.add(product_id));
        store.update("s1", |cart| cart.add(product_id));

        let cart = store.cart("s1");
        assert_eq!(cart.quantity(product_id), 2);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(900));
        let product_id = Uuid::new_v4();

        store.update("s1", |cart| cart.add(product_id));

        assert!(store.cart("s2").is_empty());
        assert_eq!(store.cart("s1").quantity(product_id), 1);
    }

    #[test]
    fn idle_session_resets_to_empty_cart() {
        let store = SessionStore::new(Duration::ZERO);
        let product_id = Uuid::new_v4();

        store.update("s1", |cart| cart.add(product_id));
        std::thread::sleep(Duration::from_millis(5));

        assert!(store.cart("s1").is_empty());
    }

    #[test]
    fn remove_drops_session_state() {
        let store = SessionStore::new(Duration::from_secs(900));
        let product_id = Uuid::new_v4();

        store.update("s1", |cart| cart.add(product_id));
        store.remove("s1");

        assert!(store.cart("s1").is_empty());
    }
}
