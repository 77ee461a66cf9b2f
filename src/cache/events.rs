//! Lifecycle Event Module
//!
//! Synchronous notification of cache mutations to registered listeners.
//!
//! Dispatch happens inline at the mutation point, in operation order. When no
//! listener is registered for a kind, the emitting site skips event
//! construction entirely, so an unobserved cache pays one map lookup at most.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

// == Event Kind ==
/// The mutation categories listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A key was inserted or updated
    Set,
    /// A key was explicitly removed
    Delete,
    /// A key was evicted under capacity pressure
    Evict,
    /// A key was removed because its TTL elapsed
    Expire,
    /// The whole cache was cleared
    Clear,
}

// == Eviction Reason ==
/// Which capacity limit forced an eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionReason {
    /// The entry-count limit was reached
    Size,
    /// The memory limit was reached
    Memory,
}

// == Cache Event ==
/// A single lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    /// The mutation category
    pub kind: EventKind,
    /// The affected key; None for `Clear`
    pub key: Option<String>,
    /// The limit that forced an eviction; Some only for `Evict`
    pub reason: Option<EvictionReason>,
}

impl CacheEvent {
    pub(crate) fn keyed(kind: EventKind, key: &str) -> Self {
        Self {
            kind,
            key: Some(key.to_string()),
            reason: None,
        }
    }

    pub(crate) fn evicted(key: &str, reason: EvictionReason) -> Self {
        Self {
            kind: EventKind::Evict,
            key: Some(key.to_string()),
            reason: Some(reason),
        }
    }

    pub(crate) fn cleared() -> Self {
        Self {
            kind: EventKind::Clear,
            key: None,
            reason: None,
        }
    }
}

// == Listener Registry ==
/// Handle returned by [`ListenerRegistry::on`], used to unsubscribe.
pub type ListenerId = u64;

type Callback = Box<dyn FnMut(&CacheEvent) + Send + Sync>;

/// Per-kind listener registry with synchronous dispatch.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<EventKind, Vec<(ListenerId, Callback)>>,
    next_id: ListenerId,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Subscribe ==
    /// Registers a listener for an event kind.
    ///
    /// Takes effect for subsequent operations; an id is returned for removal.
    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&CacheEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    // == Unsubscribe ==
    /// Removes a listener; returns whether one was registered under this id.
    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        match self.listeners.get_mut(&kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|(lid, _)| *lid != id);
                list.len() != before
            }
            None => false,
        }
    }

    // == Dispatch ==
    /// Whether any listener is registered for the kind.
    ///
    /// Emitting sites check this before building an event.
    pub fn wants(&self, kind: EventKind) -> bool {
        self.listeners.get(&kind).is_some_and(|l| !l.is_empty())
    }

    /// Delivers an event to every listener of its kind, in registration order.
    pub fn emit(&mut self, event: &CacheEvent) {
        if let Some(list) = self.listeners.get_mut(&event.kind) {
            for (_, callback) in list.iter_mut() {
                callback(event);
            }
        }
    }

    /// Drops all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &counts)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_on_emit_off() {
        let mut registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let id = registry.on(EventKind::Set, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(registry.wants(EventKind::Set));

        registry.emit(&CacheEvent::keyed(EventKind::Set, "a"));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(registry.off(EventKind::Set, id));
        assert!(!registry.wants(EventKind::Set));

        registry.emit(&CacheEvent::keyed(EventKind::Set, "b"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_unknown_id() {
        let mut registry = ListenerRegistry::new();
        let id = registry.on(EventKind::Delete, |_| {});
        assert!(!registry.off(EventKind::Delete, id + 1));
        assert!(!registry.off(EventKind::Set, id));
        assert!(registry.off(EventKind::Delete, id));
    }

    #[test]
    fn test_emit_only_matching_kind() {
        let mut registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        registry.on(EventKind::Evict, move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        registry.emit(&CacheEvent::keyed(EventKind::Set, "a"));
        registry.emit(&CacheEvent::evicted("b", EvictionReason::Size));
        registry.emit(&CacheEvent::cleared());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key.as_deref(), Some("b"));
        assert_eq!(seen[0].reason, Some(EvictionReason::Size));
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let mut registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&log);
            registry.on(EventKind::Expire, move |_| {
                sink.lock().unwrap().push(tag);
            });
        }

        registry.emit(&CacheEvent::keyed(EventKind::Expire, "k"));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_eviction_reason_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EvictionReason::Memory).unwrap(),
            "\"memory\""
        );
        assert_eq!(serde_json::to_string(&EventKind::Expire).unwrap(), "\"expire\"");
    }
}
