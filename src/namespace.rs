//! Namespace Module
//!
//! A thin view over a cache that prefixes every key, letting independent
//! subsystems share one engine (and its limits) without key collisions.
//! Composition is purely textual: `prefix` + `:` + `key`.

use crate::cache::{Cache, EntryMap};

const SEPARATOR: char = ':';

// == Namespace View ==
/// A prefixed view over a mutable cache borrow.
///
/// All operations compose the namespace prefix into the key before delegating,
/// so entries written through one namespace are invisible to another. Limits,
/// statistics, and events remain global to the underlying cache.
#[derive(Debug)]
pub struct Namespace<'c, V, M: EntryMap<V>> {
    cache: &'c mut Cache<V, M>,
    prefix: String,
}

impl<'c, V, M: EntryMap<V>> Namespace<'c, V, M> {
    /// Creates a namespaced view with the given prefix.
    pub fn new(cache: &'c mut Cache<V, M>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    /// The prefix this view applies.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn qualify(&self, key: &str) -> String {
        let mut qualified = String::with_capacity(self.prefix.len() + 1 + key.len());
        qualified.push_str(&self.prefix);
        qualified.push(SEPARATOR);
        qualified.push_str(key);
        qualified
    }

    fn strip<'k>(&self, qualified: &'k str) -> Option<&'k str> {
        qualified
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
    }

    // == Operations ==
    /// See [`Cache::set`].
    pub fn set(&mut self, key: &str, value: V) {
        let qualified = self.qualify(key);
        self.cache.set(qualified, value);
    }

    /// See [`Cache::set_with_ttl`].
    pub fn set_with_ttl(&mut self, key: &str, value: V, ttl_ms: u64) {
        let qualified = self.qualify(key);
        self.cache.set_with_ttl(qualified, value, ttl_ms);
    }

    /// See [`Cache::get`].
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let qualified = self.qualify(key);
        self.cache.get(&qualified)
    }

    /// See [`Cache::peek`].
    pub fn peek(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let qualified = self.qualify(key);
        self.cache.peek(&qualified)
    }

    /// See [`Cache::has`].
    pub fn has(&mut self, key: &str) -> bool {
        let qualified = self.qualify(key);
        self.cache.has(&qualified)
    }

    /// See [`Cache::touch`].
    pub fn touch(&mut self, key: &str) -> bool {
        let qualified = self.qualify(key);
        self.cache.touch(&qualified)
    }

    /// See [`Cache::ttl_remaining`].
    pub fn ttl_remaining(&mut self, key: &str) -> Option<Option<u64>> {
        let qualified = self.qualify(key);
        self.cache.ttl_remaining(&qualified)
    }

    /// See [`Cache::remove`].
    pub fn remove(&mut self, key: &str) -> bool {
        let qualified = self.qualify(key);
        self.cache.remove(&qualified)
    }

    /// Removes every entry belonging to this namespace.
    ///
    /// Returns the number of entries removed. Other namespaces and unprefixed
    /// keys are untouched.
    pub fn clear(&mut self) -> usize {
        let prefix = self.prefix.clone();
        self.cache.remove_where(|key| {
            key.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with(SEPARATOR))
        })
    }

    /// Keys resident in this namespace, least-recently-used first, with the
    /// prefix stripped.
    pub fn keys(&mut self) -> Vec<String> {
        let keys = self.cache.keys();
        keys.iter()
            .filter_map(|k| self.strip(k))
            .map(str::to_string)
            .collect()
    }

    /// Number of live entries in this namespace.
    pub fn len(&mut self) -> usize {
        self.keys().len()
    }

    /// Whether this namespace holds no live entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }
}
