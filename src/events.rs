//! Lifecycle notifications (spec §4.9). Translated from the source's
//! GObject signals into a subscriber list of function values (spec §9);
//! the vetoable events' AND-aggregation is grounded on GPlugin's
//! `gplugin_boolean_accumulator`, the signal accumulator that implements
//! exactly this short-circuiting rule.

use crate::Plugin;

/// The six observable events a [`Manager`](crate::Manager) emits (spec
/// §4.9). Vetoable events carry a mutable error slot a listener may fill in
/// when it returns `false`.
pub enum Event<'a> {
    LoadingPlugin {
        plugin: &'a Plugin,
        veto_reason: &'a mut Option<String>,
    },
    LoadedPlugin {
        plugin: &'a Plugin,
    },
    LoadPluginFailed {
        plugin: &'a Plugin,
    },
    UnloadingPlugin {
        plugin: &'a Plugin,
        veto_reason: &'a mut Option<String>,
    },
    UnloadedPlugin {
        plugin: &'a Plugin,
    },
    UnloadPluginFailed {
        plugin: &'a Plugin,
    },
}

/// A listener is a boxed function value, registered in call order and
/// invoked in that same order (spec §5: "Event listeners fire in
/// registration order"). Non-vetoable events ignore the return value;
/// vetoable events AND it into the aggregate veto result.
pub type Listener = Box<dyn FnMut(&mut Event) -> bool + Send + Sync>;

/// Ordered listener registry backing a [`Manager`]'s six notifications.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners observe plugins but must not call
    /// back into the manager from inside an event (spec §5: reentrant calls
    /// are undefined).
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&mut Event) -> bool + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Fires a non-vetoable event; the return value of each listener is
    /// discarded.
    pub fn notify(&mut self, mut event: Event) {
        for listener in &mut self.listeners {
            listener(&mut event);
        }
    }

    /// Fires a vetoable event and returns the logical AND of every
    /// listener's result — any listener returning `false` vetoes the
    /// operation, and later listeners still run so every veto reason can be
    /// recorded, matching the accumulator semantics this is grounded on.
    pub fn notify_vetoable(&mut self, mut event: Event) -> bool {
        let mut allowed = true;
        for listener in &mut self.listeners {
            if !listener(&mut event) {
                allowed = false;
            }
        }
        allowed
    }
}
