//! Change notifications for the UI shell.

use crate::element::ElementId;
use super::state::Mode;
use kurbo::Point;

/// Something observable changed in the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    SelectionChanged {
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    ElementCreated {
        id: ElementId,
    },
    ElementMoved {
        id: ElementId,
        position: Point,
    },
    ElementDeleted {
        id: ElementId,
    },
    ConnectionCreated {
        from: ElementId,
        to: ElementId,
    },
    ModeChanged {
        previous: Mode,
        current: Mode,
    },
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&NavigationEvent)>;

/// Registered event callbacks, called synchronously in subscription order.
#[derive(Default)]
pub struct Listeners {
    callbacks: Vec<(ListenerId, Callback)>,
    next_id: u64,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

impl Listeners {
    pub fn subscribe(&mut self, callback: impl FnMut(&NavigationEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    pub fn emit(&mut self, event: &NavigationEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
