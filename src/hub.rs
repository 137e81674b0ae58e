//! Single-threaded notification fan-out with scoped subscriptions.
//!
//! Hosts emit scroll/resize/intent notifications through an [`EventHub`];
//! consumers hold a [`Subscription`] whose `Drop` releases the listener, so a
//! torn-down component can never leak callbacks across page views.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

enum Entry<E> {
    Active(Box<dyn FnMut(&E)>),
    /// Taken out for the duration of one dispatch.
    Borrowed,
    Dead,
}

struct Slots<E> {
    listeners: Vec<Entry<E>>,
    emit_depth: u32,
}

pub struct EventHub<E> {
    inner: Rc<RefCell<Slots<E>>>,
}

impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Slots {
                listeners: Vec::new(),
                emit_depth: 0,
            })),
        }
    }

    /// Registers a listener. Delivery stops as soon as the returned
    /// [`Subscription`] is dropped, including from inside a dispatch.
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription<E> {
        let mut slots = self.inner.borrow_mut();
        let entry = Entry::Active(Box::new(callback));
        // Dead slots are only reclaimed outside of dispatch; a mid-dispatch
        // subscribe always appends so the running loop cannot observe it.
        let slot = if slots.emit_depth == 0 {
            match slots
                .listeners
                .iter()
                .position(|e| matches!(e, Entry::Dead))
            {
                Some(free) => {
                    slots.listeners[free] = entry;
                    free
                }
                None => {
                    slots.listeners.push(entry);
                    slots.listeners.len() - 1
                }
            }
        } else {
            slots.listeners.push(entry);
            slots.listeners.len() - 1
        };
        Subscription {
            hub: Rc::downgrade(&self.inner),
            slot,
        }
    }

    /// Delivers `event` to every listener registered before this call.
    pub fn emit(&self, event: &E) {
        let len = {
            let mut slots = self.inner.borrow_mut();
            slots.emit_depth += 1;
            slots.listeners.len()
        };

        for slot in 0..len {
            let taken = {
                let mut slots = self.inner.borrow_mut();
                if matches!(slots.listeners[slot], Entry::Active(_)) {
                    match std::mem::replace(&mut slots.listeners[slot], Entry::Borrowed) {
                        Entry::Active(callback) => Some(callback),
                        _ => None,
                    }
                } else {
                    None
                }
            };

            if let Some(mut callback) = taken {
                // No borrow is held across the call, so the listener may
                // subscribe or drop subscriptions (even its own).
                callback(event);
                let mut slots = self.inner.borrow_mut();
                if matches!(slots.listeners[slot], Entry::Borrowed) {
                    slots.listeners[slot] = Entry::Active(callback);
                }
            }
        }

        self.inner.borrow_mut().emit_depth -= 1;
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|e| !matches!(e, Entry::Dead))
            .count()
    }
}

/// RAII listener handle; dropping it unsubscribes.
pub struct Subscription<E> {
    hub: Weak<RefCell<Slots<E>>>,
    slot: usize,
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut slots = inner.borrow_mut();
            if let Some(entry) = slots.listeners.get_mut(self.slot) {
                *entry = Entry::Dead;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hub_accepts_listeners() {
        let hub: EventHub<u32> = EventHub::default();
        assert_eq!(hub.listener_count(), 0);

        let seen = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&seen);
        let _sub = hub.subscribe(move |v| *sink.borrow_mut() += v);
        hub.emit(&5);
        assert_eq!(*seen.borrow(), 5);
    }

    #[test]
    fn listener_receives_events_until_dropped() {
        let hub: EventHub<u32> = EventHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = hub.subscribe(move |v| sink.borrow_mut().push(*v));

        hub.emit(&1);
        hub.emit(&2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(hub.listener_count(), 1);

        drop(sub);
        hub.emit(&3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn listener_may_drop_itself_during_dispatch() {
        let hub: EventHub<u32> = EventHub::new();
        let slot: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(RefCell::new(0u32));

        let slot_in = Rc::clone(&slot);
        let calls_in = Rc::clone(&calls);
        let sub = hub.subscribe(move |_| {
            *calls_in.borrow_mut() += 1;
            slot_in.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        hub.emit(&0);
        hub.emit(&0);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn subscribe_during_dispatch_starts_next_emit() {
        let hub: EventHub<u32> = EventHub::new();
        let late_calls = Rc::new(RefCell::new(0u32));
        let keep: Rc<RefCell<Vec<Subscription<u32>>>> = Rc::new(RefCell::new(Vec::new()));

        let hub_in = hub.clone();
        let late_in = Rc::clone(&late_calls);
        let keep_in = Rc::clone(&keep);
        let first = hub.subscribe(move |_| {
            let late = Rc::clone(&late_in);
            let sub = hub_in.subscribe(move |_| *late.borrow_mut() += 1);
            keep_in.borrow_mut().push(sub);
        });

        hub.emit(&0);
        assert_eq!(*late_calls.borrow(), 0);

        drop(first);
        hub.emit(&0);
        assert_eq!(*late_calls.borrow(), 1);
    }

    #[test]
    fn dead_slots_are_reused() {
        let hub: EventHub<u32> = EventHub::new();
        let a = hub.subscribe(|_| {});
        let first_slot = a.slot;
        drop(a);
        let b = hub.subscribe(|_| {});
        assert_eq!(b.slot, first_slot);
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let sub = {
            let hub: EventHub<u32> = EventHub::new();
            hub.subscribe(|_| {})
        };
        drop(sub);
    }
}
