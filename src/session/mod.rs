//! Per-user bearer token storage.

use async_trait::async_trait;
use dashmap::DashMap;

/// Where the access token obtained at login is kept between requests.
///
/// Keys are user emails; implementations normalise them so lookups are
/// case-insensitive.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, email: &str) -> Option<String>;

    /// Store `token` for `email`, replacing any previous login.
    async fn put(&self, email: &str, token: String);

    /// Drop the session, returning whether one existed.
    async fn expire(&self, email: &str) -> bool;

    async fn count(&self) -> usize;
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Process-local sessions. Nothing is persisted and entries never time out.
#[derive(Default)]
pub struct InMemorySessionStore {
    tokens: DashMap<String, String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, email: &str) -> Option<String> {
        self.tokens
            .get(&normalize_email(email))
            .map(|entry| entry.value().clone())
    }

    async fn put(&self, email: &str, token: String) {
        self.tokens.insert(normalize_email(email), token);
    }

    async fn expire(&self, email: &str) -> bool {
        self.tokens.remove(&normalize_email(email)).is_some()
    }

    async fn count(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn lookups_ignore_case_and_padding() {
        let store = InMemorySessionStore::new();
        block_on(store.put("Foo@Bar.com", "tok-1".to_string()));

        assert_eq!(block_on(store.get("foo@bar.com")).as_deref(), Some("tok-1"));
        assert_eq!(block_on(store.get("  FOO@BAR.COM ")).as_deref(), Some("tok-1"));
        assert_eq!(block_on(store.get("other@bar.com")), None);
    }

    #[test]
    fn relogin_overwrites_token() {
        let store = InMemorySessionStore::new();
        block_on(store.put("user@x.com", "old".to_string()));
        block_on(store.put("USER@x.com", "new".to_string()));

        assert_eq!(block_on(store.get("user@x.com")).as_deref(), Some("new"));
        assert_eq!(block_on(store.count()), 1);
    }

    #[test]
    fn expire_removes_entry() {
        let store = InMemorySessionStore::new();
        block_on(store.put("user@x.com", "tok".to_string()));

        assert!(block_on(store.expire("User@X.com")));
        assert!(!block_on(store.expire("user@x.com")));
        assert_eq!(block_on(store.get("user@x.com")), None);
    }
}
