//! View lifetimes for asynchronous completions.
//!
//! A [`ViewLifetime`] lives exactly as long as the editor view that owns it.
//! Work that finishes out-of-band (image decode, file read) carries a
//! [`LifetimeToken`] and must check it before touching the scene.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Liveness flag owned by one editor view. Disposed on drop.
#[derive(Debug)]
pub struct ViewLifetime {
    id: u64,
    alive: Arc<AtomicBool>,
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Unique id of this view.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Hand out a token for an async operation.
    pub fn token(&self) -> LifetimeToken {
        LifetimeToken {
            view: self.id,
            alive: Arc::clone(&self.alive),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Mark the view as gone. Outstanding tokens observe this immediately.
    pub fn dispose(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Cheap, sendable handle reporting whether its view is still alive.
#[derive(Debug, Clone)]
pub struct LifetimeToken {
    view: u64,
    alive: Arc<AtomicBool>,
}

impl LifetimeToken {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Whether the token was issued by `lifetime` and that view is still alive.
    pub fn is_valid_for(&self, lifetime: &ViewLifetime) -> bool {
        self.view == lifetime.id && self.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_follows_dispose() {
        let lifetime = ViewLifetime::new();
        let token = lifetime.token();
        assert!(token.is_alive());
        assert!(token.is_valid_for(&lifetime));

        lifetime.dispose();
        assert!(!token.is_alive());
        assert!(!token.is_valid_for(&lifetime));
    }

    #[test]
    fn test_drop_disposes() {
        let token = {
            let lifetime = ViewLifetime::new();
            lifetime.token()
        };
        assert!(!token.is_alive());
    }

    #[test]
    fn test_token_from_other_view_rejected() {
        let first = ViewLifetime::new();
        let second = ViewLifetime::new();
        assert_ne!(first.id(), second.id());
        assert!(!first.token().is_valid_for(&second));
    }

    #[test]
    fn test_token_is_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<LifetimeToken>();
    }
}
