use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{EventName, Listener, ListenerId};

/// One (listener, callback) binding stored under an event name.
pub(crate) struct Subscription<D> {
    pub listener: ListenerId,
    pub callback: Arc<dyn Listener<D>>,
}

impl<D> Clone for Subscription<D> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            callback: self.callback.clone(),
        }
    }
}

/// Immutable view of an event's listeners, in subscription order.
///
/// Taken under the registry lock and iterated without it. Later mutations
/// copy the underlying vector instead of touching it, so a snapshot never
/// changes once handed out.
pub(crate) struct Snapshot<D>(Option<Arc<Vec<Subscription<D>>>>);

impl<D> Snapshot<D> {
    pub fn iter(&self) -> impl Iterator<Item = &Subscription<D>> {
        self.0.iter().flat_map(|subs| subs.iter())
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |subs| subs.len())
    }
}

struct Indexes<D> {
    by_event: HashMap<EventName, Arc<Vec<Subscription<D>>>>,
    by_listener: HashMap<ListenerId, HashSet<EventName>>,
}

/// Concurrent listener registry with a forward and a reverse index.
///
/// `by_event` answers "who gets this event" for publishers, `by_listener`
/// answers "what is this listener subscribed to" for bulk removal. Both
/// indexes sit behind one mutex and are updated in the same critical
/// section, so no thread can observe one without the other. Empty entries
/// are pruned on removal.
///
/// No user code ever runs under the lock, which is why a poisoned mutex is
/// simply recovered.
pub(crate) struct ListenerRegistry<D> {
    indexes: Mutex<Indexes<D>>,
}

impl<D> ListenerRegistry<D> {
    pub fn new() -> Self {
        Self {
            indexes: Mutex::new(Indexes {
                by_event: HashMap::new(),
                by_listener: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Indexes<D>> {
        self.indexes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the callback for `(listener, event)`.
    ///
    /// A replacement keeps the original position in the delivery order.
    /// Returns `true` if an earlier callback was replaced.
    pub fn subscribe(
        &self,
        listener: ListenerId,
        event: EventName,
        callback: Arc<dyn Listener<D>>,
    ) -> bool {
        let mut indexes = self.lock();
        let Indexes {
            by_event,
            by_listener,
        } = &mut *indexes;

        let subs = Arc::make_mut(by_event.entry(event.clone()).or_default());
        let replaced = match subs.iter_mut().find(|s| s.listener == listener) {
            Some(existing) => {
                existing.callback = callback;
                true
            }
            None => {
                subs.push(Subscription {
                    listener: listener.clone(),
                    callback,
                });
                false
            }
        };
        by_listener.entry(listener).or_default().insert(event);
        replaced
    }

    /// Remove the subscription for `(listener, event)`. Returns `false` if
    /// there was none.
    pub fn unsubscribe(&self, listener: &ListenerId, event: &EventName) -> bool {
        let mut indexes = self.lock();
        let Indexes {
            by_event,
            by_listener,
        } = &mut *indexes;

        let Some(events) = by_listener.get_mut(listener) else {
            return false;
        };
        if !events.remove(event) {
            return false;
        }
        if events.is_empty() {
            by_listener.remove(listener);
        }
        detach(by_event, listener, event);
        true
    }

    /// Remove every subscription owned by `listener`. Returns how many were
    /// removed.
    pub fn unsubscribe_all(&self, listener: &ListenerId) -> usize {
        let mut indexes = self.lock();
        let Indexes {
            by_event,
            by_listener,
        } = &mut *indexes;

        let Some(events) = by_listener.remove(listener) else {
            return 0;
        };
        for event in &events {
            detach(by_event, listener, event);
        }
        events.len()
    }

    /// Listeners of `event` in subscription order. Unknown events give an
    /// empty snapshot.
    pub fn snapshot(&self, event: &EventName) -> Snapshot<D> {
        Snapshot(self.lock().by_event.get(event).cloned())
    }

    pub fn listener_count(&self, event: &EventName) -> usize {
        self.lock().by_event.get(event).map_or(0, |subs| subs.len())
    }

    /// Events `listener` is subscribed to, sorted by name.
    pub fn events_of(&self, listener: &ListenerId) -> Vec<EventName> {
        let mut events: Vec<_> = self
            .lock()
            .by_listener
            .get(listener)
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default();
        events.sort();
        events
    }

    /// Events with at least one listener, sorted by name.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<_> = self.lock().by_event.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_subscribed(&self, listener: &ListenerId, event: &EventName) -> bool {
        self.lock()
            .by_listener
            .get(listener)
            .is_some_and(|events| events.contains(event))
    }

    /// Panics if the forward and reverse indexes disagree.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        let indexes = self.lock();
        for (event, subs) in &indexes.by_event {
            assert!(!subs.is_empty(), "empty entry left for event '{event}'");
            for sub in subs.iter() {
                assert!(
                    indexes
                        .by_listener
                        .get(&sub.listener)
                        .is_some_and(|events| events.contains(event)),
                    "'{}' listed under '{event}' but not in reverse index",
                    sub.listener
                );
            }
        }
        for (listener, events) in &indexes.by_listener {
            assert!(!events.is_empty(), "empty entry left for listener '{listener}'");
            for event in events {
                let count = indexes
                    .by_event
                    .get(event)
                    .map_or(0, |subs| subs.iter().filter(|s| &s.listener == listener).count());
                assert_eq!(count, 1, "'{listener}' appears {count} times under '{event}'");
            }
        }
    }
}

fn detach<D>(
    by_event: &mut HashMap<EventName, Arc<Vec<Subscription<D>>>>,
    listener: &ListenerId,
    event: &EventName,
) {
    let Some(subs) = by_event.get_mut(event) else {
        return;
    };
    if subs.len() == 1 {
        by_event.remove(event);
    } else {
        Arc::make_mut(subs).retain(|s| &s.listener != listener);
    }
}
