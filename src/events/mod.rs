//! # Event Bus
//!
//! A process-wide registry of subscribers, dispatched synchronously and in
//! subscription order. The closed set of recognized event kinds is modeled
//! as a Rust enum rather than a string — an "unknown event kind" is
//! therefore a compile error rather than a runtime failure.
//!
//! Ordering guarantee: for a **change**, [`EventKind::UpdateDependencies`]
//! fires before the repository is updated; for a **remove**,
//! [`EventKind::CheckDependencies`] fires before the repository is updated;
//! **add** fires no dependency event. See
//! [`crate::services::reference_service`] for where these are wired.

pub mod integrity;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::Entity;
use crate::error::Result;

/// The closed set of event kinds the bus recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An entity was added to a reference bucket.
    AddReference,
    /// An entity was changed (fires after dependents were rewritten).
    ChangeReference,
    /// An entity was removed (fires after the dependency check passed).
    RemoveReference,
    /// Sweep: rewrite every back-reference to `old` into `new`.
    UpdateDependencies,
    /// Sweep: fail if any entity still references `target`.
    CheckDependencies,
    /// The cutoff (block period) changed.
    ChangeBlockPeriod,
    /// Log-kind event: debug.
    Debug,
    /// Log-kind event: info.
    Info,
    /// Log-kind event: warning.
    Warning,
    /// Log-kind event: error.
    Error,
}

impl EventKind {
    /// Log-kind events swallow subscriber errors during dispatch; every
    /// other kind propagates the first error it encounters.
    pub fn is_log_kind(self) -> bool {
        matches!(
            self,
            Self::Debug | Self::Info | Self::Warning | Self::Error
        )
    }
}

/// The payload carried by a fired event.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// Payload for `add_reference` / `change_reference` / `remove_reference`:
    /// the entity that was added, changed, or removed.
    Entity(Entity),
    /// Payload for `update_dependencies`: replace `old` with `new`
    /// everywhere it is referenced.
    UpdateDependencies {
        /// The entity being replaced.
        old: Entity,
        /// Its replacement.
        new: Entity,
    },
    /// Payload for `check_dependencies`: fail if anything still references
    /// `target`.
    CheckDependencies {
        /// The entity slated for deletion.
        target: Entity,
    },
    /// Payload for `change_block_period`: the new cutoff, as an RFC 3339
    /// string (kept untyped here so the event module doesn't need to
    /// depend on `chrono` beyond what subscribers themselves require).
    BlockPeriod(String),
    /// Payload for log-kind events: a human-readable message.
    Log(String),
}

/// Anything that can receive events from the bus.
///
/// `handle` ignores event kinds it doesn't care about (returning `Ok(())`),
/// raises a [`crate::error::CatalogError::Veto`] or
/// [`crate::error::CatalogError::Operation`] to abort dispatch, for
/// non-log-kind events.
pub trait Subscriber {
    /// Handle one fired event.
    fn handle(&self, event: EventKind, payload: &EventPayload) -> Result<()>;
}

/// Synchronous, ordered fan-out registry.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Arc<dyn Subscriber + Send + Sync>>>,
}

impl EventBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Idempotent: re-subscribing the same `Arc`
    /// (by pointer identity) is a no-op.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber + Send + Sync>) {
        let mut subs = self.subscribers.write();
        if !subs.iter().any(|s| Arc::ptr_eq(s, &subscriber)) {
            subs.push(subscriber);
        }
    }

    /// Unregister a subscriber by pointer identity.
    pub fn unsubscribe(&self, subscriber: &Arc<dyn Subscriber + Send + Sync>) {
        let mut subs = self.subscribers.write();
        subs.retain(|s| !Arc::ptr_eq(s, subscriber));
    }

    /// Dispatch an event to every subscriber, in subscription order.
    ///
    /// For log-kind events, a subscriber error is logged and swallowed so
    /// the rest of the chain still runs. For every other event kind, the
    /// first error aborts dispatch and is returned to the caller.
    pub fn fire(&self, event: EventKind, payload: &EventPayload) -> Result<()> {
        let subs = self.subscribers.read().clone();
        for sub in subs.iter() {
            if let Err(err) = sub.handle(event, payload) {
                if event.is_log_kind() {
                    tracing::warn!(?event, %err, "subscriber failed handling log-kind event; swallowed");
                    continue;
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSubscriber {
        count: AtomicUsize,
    }

    impl Subscriber for CountingSubscriber {
        fn handle(&self, _event: EventKind, _payload: &EventPayload) -> Result<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct VetoingSubscriber;

    impl Subscriber for VetoingSubscriber {
        fn handle(&self, _event: EventKind, _payload: &EventPayload) -> Result<()> {
            Err(crate::error::CatalogError::veto("x", "refuses"))
        }
    }

    #[test]
    fn subscribe_is_idempotent() {
        let bus = EventBus::new();
        let sub = Arc::new(CountingSubscriber {
            count: AtomicUsize::new(0),
        });
        let dyn_sub: Arc<dyn Subscriber + Send + Sync> = sub.clone();
        bus.subscribe(dyn_sub.clone());
        bus.subscribe(dyn_sub.clone());
        assert_eq!(bus.subscribers.read().len(), 1);
    }

    #[test]
    fn veto_aborts_dispatch_for_non_log_event() {
        let bus = EventBus::new();
        let veto: Arc<dyn Subscriber + Send + Sync> = Arc::new(VetoingSubscriber);
        let counting = Arc::new(CountingSubscriber {
            count: AtomicUsize::new(0),
        });
        let counting_dyn: Arc<dyn Subscriber + Send + Sync> = counting.clone();
        bus.subscribe(veto);
        bus.subscribe(counting_dyn);
        let result = bus.fire(
            EventKind::CheckDependencies,
            &EventPayload::Log("x".into()),
        );
        assert!(result.is_err());
        assert_eq!(counting.count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn errors_are_swallowed_for_log_kind_events() {
        let bus = EventBus::new();
        let veto: Arc<dyn Subscriber + Send + Sync> = Arc::new(VetoingSubscriber);
        let counting = Arc::new(CountingSubscriber {
            count: AtomicUsize::new(0),
        });
        let counting_dyn: Arc<dyn Subscriber + Send + Sync> = counting.clone();
        bus.subscribe(veto);
        bus.subscribe(counting_dyn);
        let result = bus.fire(EventKind::Info, &EventPayload::Log("x".into()));
        assert!(result.is_ok());
        assert_eq!(counting.count.load(Ordering::SeqCst), 1);
    }
}
