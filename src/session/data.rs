//! Type-erased session data bag

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Ad hoc key/value storage for session-scoped values of any type.
///
/// Reads are type-checked at runtime: asking for a key with the wrong type
/// behaves exactly like asking for a missing key.
#[derive(Default)]
pub struct SessionData {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Borrow a value if present and of type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove a value. Returns true if the key existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("keys", &self.keys())
            .finish()
    }
}
