use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// A subscriber callback. Handlers are compared by `Rc` identity, so the
/// same allocation can be registered once and detached again later.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// Keyed, synchronous publish/subscribe registry.
///
/// Every stateful entity in the widget owns one of these: the model keys
/// by [`EventKind`](crate::model::EventKind), the element arena keys by
/// [`ElementId`](crate::dom::ElementId). Dispatch is an immediate,
/// in-registration-order function call chain; there is no queueing and no
/// wildcard key.
pub struct Subscribers<K, E> {
    handlers: HashMap<K, Vec<Handler<E>>>,
}

impl<K, E> Default for Subscribers<K, E> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, E> Subscribers<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `key`. Registering the same allocation twice
    /// for the same key is a no-op; the view layer re-binds its click
    /// handlers on every render and relies on this.
    pub fn on(&mut self, key: K, handler: Handler<E>) {
        let slot = self.handlers.entry(key).or_default();
        if slot.iter().any(|h| Rc::ptr_eq(h, &handler)) {
            return;
        }
        slot.push(handler);
    }

    /// Remove a specific handler, or every handler for `key` when `handler`
    /// is `None`.
    pub fn off(&mut self, key: &K, handler: Option<&Handler<E>>) {
        let Some(slot) = self.handlers.get_mut(key) else {
            return;
        };
        match handler {
            Some(target) => slot.retain(|h| !Rc::ptr_eq(h, target)),
            None => slot.clear(),
        }
        if slot.is_empty() {
            self.handlers.remove(key);
        }
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Snapshot the handler list for `key`.
    ///
    /// Owners that keep their `Subscribers` behind a `RefCell` snapshot
    /// first and dispatch after releasing the borrow, so handlers can
    /// re-enter the owner.
    pub fn handlers_for(&self, key: &K) -> Vec<Handler<E>> {
        self.handlers.get(key).cloned().unwrap_or_default()
    }

    /// Invoke every handler registered for `key`, in registration order.
    /// A panicking handler aborts the remaining dispatch; nothing is
    /// caught.
    pub fn fire(&self, key: &K, payload: &E) {
        for handler in self.handlers_for(key) {
            handler(payload);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<K, E> std::fmt::Debug for Subscribers<K, E>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, handlers) in &self.handlers {
            map.entry(key, &handlers.len());
        }
        map.finish()
    }
}
