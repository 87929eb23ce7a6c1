use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Zero-argument click handler.
pub type Callback = Rc<dyn Fn()>;

/// Click handlers keyed by object name. Inserting an existing name replaces
/// its handler.
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    handlers: HashMap<String, Callback>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `callback` under `name`, returning the handler it replaced.
    pub fn insert(&mut self, name: impl Into<String>, callback: Callback) -> Option<Callback> {
        self.handlers.insert(name.into(), callback)
    }

    /// Removes the handler for `name`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Callback> {
        self.handlers.remove(name)
    }

    /// Removes every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Returns a clone of the handler so it can run without holding a borrow
    /// of the registry.
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.handlers.get(name).cloned()
    }

    /// Returns whether `name` has a handler.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}
