//! Session storage contract and the built-in in-memory implementation.
//!
//! The client never persists tokens anywhere else: one fixed slot in an abstract
//! key-value session store holds the current customer token, and each inbound
//! request exclusively owns its store reference.

// self
use crate::{_prelude::*, auth::CustomerToken};

/// Fixed session slot holding the current customer token.
pub const CUSTOMER_TOKEN_KEY: &str = "sso.customer_token";

/// Abstract key-value session store owned by the current request.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if present.
	fn get(&self, key: &str) -> Option<String>;

	/// Stores `value` under `key`, replacing any existing value.
	fn put(&self, key: &str, value: String);

	/// Removes any value stored under `key`.
	fn remove(&self, key: &str);

	/// Returns the customer token currently held by this session.
	fn customer_token(&self) -> Option<CustomerToken> {
		self.get(CUSTOMER_TOKEN_KEY).filter(|token| !token.is_empty()).map(CustomerToken::new)
	}

	/// Stores the customer token, replacing any previous one.
	fn set_customer_token(&self, token: &CustomerToken) {
		self.put(CUSTOMER_TOKEN_KEY, token.expose().to_owned());
	}

	/// Evicts the customer token from this session.
	fn evict_customer_token(&self) {
		self.remove(CUSTOMER_TOKEN_KEY);
	}
}

/// Thread-safe session store that keeps values in-process for tests and demos.
#[derive(Debug, Default)]
pub struct MemorySession(RwLock<HashMap<String, String>>);
impl SessionStore for MemorySession {
	fn get(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}

	fn put(&self, key: &str, value: String) {
		self.0.write().insert(key.to_owned(), value);
	}

	fn remove(&self, key: &str) {
		self.0.write().remove(key);
	}
}
