//! Minimal subscribe/notify registry shared by the state manager and the
//! display coordinator.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Box<dyn FnMut(&T)>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
    // ids unsubscribed while their entry was lent out for a notify pass
    detached: Vec<u64>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
            detached: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Hands the listener back so it is dropped outside the registry borrow.
    fn remove(&mut self, id: u64) -> Option<Listener<T>> {
        if let Some(index) = self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(self.entries.remove(index).1)
        } else {
            self.detached.push(id);
            None
        }
    }
}

/// Listeners of one kind of event.
pub struct Observers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }
}

impl<T> Observers<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<T: 'static> Observers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; keep the returned handle to unsubscribe later.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Box::new(listener)));
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            id,
            detach: Some(Box::new(move |id| {
                if let Some(registry) = weak.upgrade() {
                    let removed = registry.borrow_mut().remove(id);
                    drop(removed);
                }
            })),
        }
    }

    /// Call every listener with `event`, in subscription order.
    ///
    /// Listeners may subscribe or unsubscribe while being notified; changes
    /// take effect from the next notification.
    pub fn notify(&self, event: &T) {
        let mut lent = std::mem::take(&mut self.registry.borrow_mut().entries);
        for (_, listener) in &mut lent {
            listener(event);
        }
        let detached = std::mem::take(&mut self.registry.borrow_mut().detached);
        let (kept, dropped): (Vec<_>, Vec<_>) =
            lent.into_iter().partition(|(id, _)| !detached.contains(id));
        {
            let mut registry = self.registry.borrow_mut();
            let added = std::mem::replace(&mut registry.entries, kept);
            registry.entries.extend(added);
        }
        drop(dropped);
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the listener attached.
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce(u64)>>,
}

impl Subscription {
    /// Detach the listener. Safe to call after the registry is gone.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
