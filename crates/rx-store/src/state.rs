//! Observable state holder
//!
//! `StateHolder` keeps the single current state value of a store plus the
//! list of subscribers. It behaves like a behaviour subject:
//! - `subscribe` immediately delivers the current value
//! - `next` replaces the value and notifies every subscriber synchronously,
//!   in registration order
//!
//! Async consumers can use `watch()` to get a `tokio::sync::watch::Receiver`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;

type SubscriberFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscribers<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, SubscriberFn<T>)>>,
}

impl<T> Subscribers<T> {
    fn snapshot(&self) -> Vec<SubscriberFn<T>> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().map(|(_, f)| Arc::clone(f)).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(_, f)| Arc::clone(f))
                .collect(),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Single current value plus its subscriber list
pub struct StateHolder<T> {
    tx: watch::Sender<T>,
    subscribers: Arc<Subscribers<T>>,
}

impl<T: Clone + Send + Sync + 'static> StateHolder<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            subscribers: Arc::new(Subscribers {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the current value and notify subscribers
    pub fn next(&self, value: T) {
        self.tx.send_replace(value.clone());
        // Subscribers run outside the registry lock so they may (un)subscribe
        for subscriber in self.subscribers.snapshot() {
            subscriber(&value);
        }
    }

    /// Register a subscriber; it is called right away with the current value
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        let f: SubscriberFn<T> = Arc::new(f);
        self.subscribers
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::clone(&f)));

        f(&self.get());

        let weak: Weak<Subscribers<T>> = Arc::downgrade(&self.subscribers);
        Subscription {
            remove: Some(Box::new(move || {
                weak.upgrade().map(|subs| subs.remove(id)).unwrap_or(false)
            })),
        }
    }

    /// Async view on the state, yields every replaced value
    pub fn watch(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

/// Handle returned by `StateHolder::subscribe`
///
/// Dropping the handle keeps the subscriber registered; call
/// `unsubscribe` to remove it.
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() -> bool + Send + Sync>>,
}

impl Subscription {
    /// Remove the subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self) -> bool {
        match self.remove.take() {
            Some(remove) => remove(),
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.remove.is_none()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_get_returns_initial() {
        let holder = StateHolder::new(5);
        assert_eq!(holder.get(), 5);
    }

    #[test]
    fn test_subscribe_receives_current_and_next() {
        let holder = StateHolder::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = holder.subscribe(move |v| sink.lock().unwrap().push(*v));

        holder.next(2);
        holder.next(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subscribers_called_in_registration_order() {
        let holder = StateHolder::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = holder.subscribe(move |v| first.lock().unwrap().push(("a", *v)));
        let second = Arc::clone(&order);
        let _b = holder.subscribe(move |v| second.lock().unwrap().push(("b", *v)));

        order.lock().unwrap().clear();
        holder.next(7);

        assert_eq!(*order.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let holder = StateHolder::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut sub = holder.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(sub.unsubscribe());
        assert!(sub.is_closed());
        assert!(!sub.unsubscribe());

        holder.next(1);
        // Only the initial delivery
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(holder.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_subscribe_during_notification() {
        let holder = Arc::new(StateHolder::new(0));
        let inner = Arc::clone(&holder);
        let _sub = holder.subscribe(move |v| {
            if *v == 1 {
                let _nested = inner.subscribe(|_| {});
            }
        });

        holder.next(1);
        assert_eq!(holder.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_watch_sees_replaced_value() {
        let holder = StateHolder::new("a".to_string());
        let mut rx = holder.watch();

        holder.next("b".to_string());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "b");
    }
}
