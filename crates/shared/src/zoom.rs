//! Zoom-change notifications with scoped subscriptions.
//!
//! The map surface owns a [`ZoomNotifier`] and calls [`ZoomNotifier::notify`]
//! whenever its zoom settles on a new value. Listeners hold a
//! [`ZoomSubscription`]; dropping it unregisters the callback.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{ensure_finite_zoom, MapResult};

type Listener = Rc<RefCell<dyn FnMut(f64)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Single-threaded zoom event source.
#[derive(Default)]
pub struct ZoomNotifier {
    registry: Rc<RefCell<Registry>>,
}

impl ZoomNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every subsequent zoom change.
    #[must_use = "dropping the subscription unregisters the callback immediately"]
    pub fn subscribe(&self, callback: impl FnMut(f64) + 'static) -> ZoomSubscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(callback));
        registry.listeners.push((id, listener));
        ZoomSubscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `zoom` to every live listener. Returns how many were called.
    ///
    /// The listener list is snapshotted first, so callbacks may subscribe or
    /// release subscriptions (including their own) while being notified.
    pub fn notify(&self, zoom: f64) -> MapResult<usize> {
        let zoom = ensure_finite_zoom(zoom)?;
        let snapshot: Vec<(u64, Listener)> = self.registry.borrow().listeners.clone();
        let mut delivered = 0;
        for (id, listener) in snapshot {
            // Released by an earlier callback in this same pass
            if !self.is_registered(id) {
                continue;
            }
            // A callback re-entering notify() from itself is skipped
            let Ok(mut callback) = listener.try_borrow_mut() else {
                tracing::warn!(listener = id, "Skipping re-entrant zoom listener");
                continue;
            };
            (&mut *callback)(zoom);
            delivered += 1;
        }
        tracing::trace!(zoom, delivered, "Zoom change delivered");
        Ok(delivered)
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    fn is_registered(&self, id: u64) -> bool {
        self.registry
            .borrow()
            .listeners
            .iter()
            .any(|(lid, _)| *lid == id)
    }
}

/// Handle for one registered zoom listener. Unregisters on drop.
pub struct ZoomSubscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl ZoomSubscription {
    /// Unregister now rather than at end of scope.
    pub fn release(self) {}
}

impl Drop for ZoomSubscription {
    fn drop(&mut self) {
        // Notifier already gone: nothing left to unregister from
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let removed = {
            let mut registry = registry.borrow_mut();
            let idx = registry.listeners.iter().position(|(id, _)| *id == self.id);
            idx.map(|idx| registry.listeners.remove(idx))
        };
        // Dropped outside the borrow: the closure may own other subscriptions
        drop(removed);
    }
}

impl std::fmt::Debug for ZoomSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomSubscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |z: f64| sink.borrow_mut().push(z))
    }

    #[test]
    fn test_subscriber_receives_zoom() {
        let notifier = ZoomNotifier::new();
        let (seen, cb) = recorder();
        let _sub = notifier.subscribe(cb);
        assert_eq!(notifier.notify(17.0).unwrap(), 1);
        notifier.notify(18.0).unwrap();
        assert_eq!(*seen.borrow(), vec![17.0, 18.0]);
    }

    #[test]
    fn test_multiple_subscribers_all_called() {
        let notifier = ZoomNotifier::new();
        let (a, cb_a) = recorder();
        let (b, cb_b) = recorder();
        let _sa = notifier.subscribe(cb_a);
        let _sb = notifier.subscribe(cb_b);
        assert_eq!(notifier.notify(16.5).unwrap(), 2);
        assert_eq!(*a.borrow(), vec![16.5]);
        assert_eq!(*b.borrow(), vec![16.5]);
    }

    #[test]
    fn test_drop_unregisters() {
        let notifier = ZoomNotifier::new();
        let (seen, cb) = recorder();
        let sub = notifier.subscribe(cb);
        notifier.notify(16.0).unwrap();
        drop(sub);
        assert_eq!(notifier.listener_count(), 0);
        assert_eq!(notifier.notify(17.0).unwrap(), 0);
        assert_eq!(*seen.borrow(), vec![16.0]);
    }

    #[test]
    fn test_release_unregisters() {
        let notifier = ZoomNotifier::new();
        let (seen, cb) = recorder();
        notifier.subscribe(cb).release();
        notifier.notify(17.0).unwrap();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_release_only_removes_own_listener() {
        let notifier = ZoomNotifier::new();
        let (a, cb_a) = recorder();
        let (b, cb_b) = recorder();
        let sa = notifier.subscribe(cb_a);
        let _sb = notifier.subscribe(cb_b);
        sa.release();
        notifier.notify(19.0).unwrap();
        assert!(a.borrow().is_empty());
        assert_eq!(*b.borrow(), vec![19.0]);
    }

    #[test]
    fn test_subscription_outlives_notifier() {
        let notifier = ZoomNotifier::new();
        let (_seen, cb) = recorder();
        let sub = notifier.subscribe(cb);
        drop(notifier);
        // Must not panic
        drop(sub);
    }

    #[test]
    fn test_release_from_inside_callback() {
        let notifier = ZoomNotifier::new();
        let slot: Rc<RefCell<Option<ZoomSubscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(RefCell::new(0));

        let slot_in = Rc::clone(&slot);
        let calls_in = Rc::clone(&calls);
        let sub = notifier.subscribe(move |_| {
            *calls_in.borrow_mut() += 1;
            // One-shot listener
            slot_in.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        notifier.notify(17.0).unwrap();
        notifier.notify(18.0).unwrap();
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_earlier_callback_releases_later_listener() {
        let notifier = ZoomNotifier::new();
        let (seen, cb) = recorder();
        let victim: Rc<RefCell<Option<ZoomSubscription>>> = Rc::new(RefCell::new(None));

        let victim_in = Rc::clone(&victim);
        let _killer = notifier.subscribe(move |_| {
            victim_in.borrow_mut().take();
        });
        *victim.borrow_mut() = Some(notifier.subscribe(cb));

        assert_eq!(notifier.notify(17.0).unwrap(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_subscribe_from_inside_callback() {
        let notifier = Rc::new(ZoomNotifier::new());
        let late: Rc<RefCell<Vec<ZoomSubscription>>> = Rc::new(RefCell::new(Vec::new()));

        let notifier_in = Rc::clone(&notifier);
        let late_in = Rc::clone(&late);
        let _sub = notifier.subscribe(move |_| {
            let s = notifier_in.subscribe(|_| {});
            late_in.borrow_mut().push(s);
        });

        notifier.notify(17.0).unwrap();
        assert_eq!(notifier.listener_count(), 2);
        late.borrow_mut().clear();
        assert_eq!(notifier.listener_count(), 1);
    }

    #[test]
    fn test_notify_rejects_non_finite_zoom() {
        let notifier = ZoomNotifier::new();
        let (seen, cb) = recorder();
        let _sub = notifier.subscribe(cb);
        assert!(matches!(
            notifier.notify(f64::NAN),
            Err(MapError::NonFiniteZoom(_))
        ));
        assert!(seen.borrow().is_empty());
    }
}
