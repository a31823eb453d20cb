//! Listener table.
//!
//! Listeners are keyed by event name. `max_listeners` is advisory: going
//! over it logs a warning but the listener is still added.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::event::EventMeta;

/// A listener callback.
pub type Listener<E> = Arc<dyn Fn(&E, &EventMeta) + Send + Sync>;

/// Handle returned when a listener is added, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric value of the handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Entry<E> {
    id: ListenerId,
    once: bool,
    callback: Listener<E>,
}

pub(crate) struct ListenerTable<E> {
    entries: RwLock<HashMap<String, Vec<Entry<E>>>>,
    next_id: AtomicU64,
    max_listeners: usize,
}

impl<E> ListenerTable<E> {
    pub(crate) fn new(max_listeners: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_listeners,
        }
    }

    pub(crate) fn max_listeners(&self) -> usize {
        self.max_listeners
    }

    pub(crate) fn add(&self, event: &str, once: bool, callback: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write();
        let list = entries.entry(event.to_string()).or_default();
        list.push(Entry { id, once, callback });

        if list.len() > self.max_listeners {
            warn!(
                event,
                listener_count = list.len(),
                max_listeners = self.max_listeners,
                "possible listener leak: listener count above max_listeners"
            );
        } else {
            debug!(event, %id, once, "listener added");
        }
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let found = entries.iter_mut().find_map(|(name, list)| {
            let index = list.iter().position(|entry| entry.id == id)?;
            list.remove(index);
            Some((name.clone(), list.is_empty()))
        });

        match found {
            Some((event, now_empty)) => {
                if now_empty {
                    entries.remove(&event);
                }
                debug!(event = %event, %id, "listener removed");
                true
            }
            None => false,
        }
    }

    /// Removes listeners for `event`, or every listener when `None`.
    pub(crate) fn remove_all(&self, event: Option<&str>) -> usize {
        let mut entries = self.entries.write();
        match event {
            Some(name) => entries.remove(name).map_or(0, |list| list.len()),
            None => std::mem::take(&mut *entries).values().map(Vec::len).sum(),
        }
    }

    pub(crate) fn count(&self, event: &str) -> usize {
        self.entries.read().get(event).map_or(0, Vec::len)
    }

    pub(crate) fn counts(&self) -> BTreeMap<String, usize> {
        self.entries
            .read()
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, list)| (name.clone(), list.len()))
            .collect()
    }

    /// Snapshot of the callbacks for `event`, dropping `once` entries from
    /// the table in the same critical section.
    pub(crate) fn take_for_dispatch(&self, event: &str) -> Vec<Listener<E>> {
        let mut entries = self.entries.write();
        let Some(list) = entries.get_mut(event) else {
            return Vec::new();
        };

        let callbacks = list.iter().map(|entry| Arc::clone(&entry.callback)).collect();
        list.retain(|entry| !entry.once);
        if list.is_empty() {
            entries.remove(event);
        }
        callbacks
    }
}
