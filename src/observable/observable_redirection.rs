// src/observable/observable_redirection.rs
//! Observable redirection
//!
//! Multiplexes one physical interception into any number of subscriptions:
//!
//! ```text
//! intercepted call ─▶ engine ─▶ registry[key] ─▶ observer 1
//!                                             ├─▶ observer 2
//!                                             └─▶ observer N
//! ```
//!
//! The first subscriber starts the underlying redirection and the last
//! unsubscribe stops it, whoever started it. Fan-out is synchronous and in
//! subscription order; an observer error aborts the remaining deliveries
//! and surfaces at the intercepted call site.

use crate::observable::context::RedirectionContext;
use crate::observable::registry::{RedirectionRegistry, RegistryKey};
use crate::redirection::lifecycle::{Lifecycle, RedirectionState};
use crate::redirection::method::MethodRedirection;
use crate::utils::errors::Result;
use metrics::{counter, gauge};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Receiver of intercepted invocations
pub trait RedirectionObserver: Send + Sync {
    fn on_next(&self, context: &RedirectionContext) -> Result<()>;
}

impl<F> RedirectionObserver for F
where
    F: Fn(&RedirectionContext) -> Result<()> + Send + Sync,
{
    fn on_next(&self, context: &RedirectionContext) -> Result<()> {
        self(context)
    }
}

struct Subscriber {
    id: u64,
    observer: Box<dyn RedirectionObserver>,
    active: AtomicBool,
}

/// Token returned by [`ObservableRedirection::subscribe`]
///
/// Consumed by [`ObservableRedirection::unsubscribe`], so a subscription
/// can only be cancelled once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription token makes the observer impossible to remove"]
pub struct Subscription {
    key: RegistryKey,
    id: u64,
}

impl Subscription {
    /// Key of the observable redirection this subscription belongs to
    pub fn key(&self) -> RegistryKey {
        self.key
    }
}

/// Registry-side state of an observable redirection
pub struct ObservableEntry {
    key: RegistryKey,
    redirection: MethodRedirection,
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
    next_subscription: AtomicU64,
}

impl ObservableEntry {
    pub fn key(&self) -> RegistryKey {
        self.key
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirection.is_redirecting()
    }

    /// Deliver `context` to every current subscriber, in subscription order
    pub fn publish(&self, context: &RedirectionContext) -> Result<()> {
        // Observers may (un)subscribe from inside the callback
        let snapshot: Vec<Arc<Subscriber>> = self.subscribers.lock().clone();

        counter!("redirect_dispatch_total").increment(1);
        trace!(
            "Publishing {} to {} subscribers under {}",
            context.original().qualified_name(),
            snapshot.len(),
            self.key
        );

        for subscriber in snapshot {
            if subscriber.active.load(Ordering::Acquire) {
                subscriber.observer.on_next(context)?;
            }
        }
        Ok(())
    }

    fn record_subscribers(&self, count: usize) {
        gauge!("redirect_subscribers", "key" => self.key.get().to_string()).set(count as f64);
    }
}

/// Method redirection exposed as a stream of invocations
pub struct ObservableRedirection {
    entry: Arc<ObservableEntry>,
    registry: Arc<RedirectionRegistry>,
}

impl ObservableRedirection {
    pub(crate) fn new(
        registry: Arc<RedirectionRegistry>,
        key: RegistryKey,
        redirection: MethodRedirection,
    ) -> Result<Self> {
        let entry = Arc::new(ObservableEntry {
            key,
            redirection,
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        });
        registry.insert(key, Arc::clone(&entry))?;

        Ok(Self { entry, registry })
    }

    pub fn key(&self) -> RegistryKey {
        self.entry.key
    }

    /// The underlying original → dispatch redirection
    pub fn redirection(&self) -> &MethodRedirection {
        &self.entry.redirection
    }

    pub fn subscriber_count(&self) -> usize {
        self.entry.subscriber_count()
    }

    /// Add an observer, starting the redirection if needed
    pub fn subscribe<O>(&self, observer: O) -> Result<Subscription>
    where
        O: RedirectionObserver + 'static,
    {
        let mut subscribers = self.entry.subscribers.lock();

        // No-op when already started; fails once disposed
        self.entry.redirection.start()?;

        let id = self.entry.next_subscription.fetch_add(1, Ordering::Relaxed);
        subscribers.push(Arc::new(Subscriber {
            id,
            observer: Box::new(observer),
            active: AtomicBool::new(true),
        }));
        self.entry.record_subscribers(subscribers.len());

        debug!(
            "Subscriber {} added to {} ({} total)",
            id,
            self.key(),
            subscribers.len()
        );
        Ok(Subscription { key: self.key(), id })
    }

    /// Remove the observer behind `subscription`
    ///
    /// Returns `false` if it belongs to another observable or was already
    /// removed by disposal. Removing the last observer stops the redirection.
    pub fn unsubscribe(&self, subscription: Subscription) -> Result<bool> {
        if subscription.key != self.key() {
            return Ok(false);
        }

        let mut subscribers = self.entry.subscribers.lock();
        let Some(position) = subscribers.iter().position(|s| s.id == subscription.id) else {
            return Ok(false);
        };

        let removed = subscribers.remove(position);
        removed.active.store(false, Ordering::Release);
        self.entry.record_subscribers(subscribers.len());
        debug!("Subscriber {} removed from {}", removed.id, self.key());

        if subscribers.is_empty() {
            self.entry.redirection.stop()?;
        }
        Ok(true)
    }
}

impl Lifecycle for ObservableRedirection {
    fn start(&self) -> Result<()> {
        self.entry.redirection.start()
    }

    fn stop(&self) -> Result<()> {
        self.entry.redirection.stop()
    }

    /// Dispose the underlying redirection and leave the registry
    ///
    /// Remaining subscribers are dropped without notification. The
    /// observable leaves the registry even if the engine fails to release
    /// its splice; that error is still returned.
    fn dispose(&self) -> Result<()> {
        let released = self.entry.redirection.dispose();

        let dropped = {
            let mut subscribers = self.entry.subscribers.lock();
            for subscriber in subscribers.iter() {
                subscriber.active.store(false, Ordering::Release);
            }
            let count = subscribers.len();
            subscribers.clear();
            count
        };

        if self.registry.remove(self.key()) {
            self.entry.record_subscribers(0);
            info!(
                "Disposed observable redirection {} ({} subscribers dropped)",
                self.key(),
                dropped
            );
        }
        released
    }

    fn state(&self) -> RedirectionState {
        self.entry.redirection.state()
    }
}

impl Drop for ObservableRedirection {
    fn drop(&mut self) {
        if let Err(e) = Lifecycle::dispose(self) {
            warn!("Failed to dispose observable redirection {}: {}", self.key(), e);
        }
    }
}

impl fmt::Debug for ObservableRedirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableRedirection")
            .field("key", &self.key())
            .field("subscribers", &self.subscriber_count())
            .field("redirection", &self.entry.redirection)
            .finish()
    }
}
