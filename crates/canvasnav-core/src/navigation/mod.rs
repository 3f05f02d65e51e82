//! Keyboard-driven selection, creation and camera follow.

mod events;
mod spatial;
mod state;

pub use events::{ListenerId, Listeners, NavigationEvent};
pub use spatial::{in_direction, nearest_in_direction};
pub use state::{FocusHistory, Mode, NavigationState};

use crate::animation::Instant;
use crate::command::{Command, Direction};
use crate::config::{CanvasConfig, NavigationConfig};
use crate::element::{Element, ElementId, ElementKind};
use crate::input::{KeyPress, Keymap};
use crate::store::ElementStore;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};

/// Owns the elements, the selection and the camera of one canvas.
///
/// Every command runs synchronously and never fails: commands that make no
/// sense in the current state (nothing selected, unknown id, no element in
/// the requested direction) leave the state unchanged.
#[derive(Debug)]
pub struct NavigationController {
    store: ElementStore,
    viewport: Viewport,
    selected: Option<ElementId>,
    mode: Mode,
    history: FocusHistory,
    config: NavigationConfig,
    keymap: Keymap,
    listeners: Listeners,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl NavigationController {
    /// Create a controller with an empty store.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_store(ElementStore::new(), config)
    }

    /// Create a controller over existing elements. Nothing is selected.
    pub fn with_store(store: ElementStore, config: CanvasConfig) -> Self {
        Self {
            store,
            viewport: Viewport::new(&config.viewport),
            selected: None,
            mode: Mode::default(),
            history: FocusHistory::new(config.navigation.history_limit),
            config: config.navigation,
            keymap: Keymap::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable camera access for pointer-driven pan and zoom.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn history(&self) -> &FocusHistory {
        &self.history
    }

    /// Snapshot for status displays.
    pub fn state(&self) -> NavigationState {
        NavigationState {
            selected: self.selected.clone(),
            mode: self.mode,
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Register a change callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&NavigationEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&mut self, event: NavigationEvent) {
        self.listeners.emit(&event);
    }

    /// Resolve a key press with the keymap of the current mode and run it.
    ///
    /// Returns `false` if the key is not bound.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        self.handle_key_at(press, Instant::now())
    }

    pub fn handle_key_at(&mut self, press: KeyPress, now: Instant) -> bool {
        match self.keymap.resolve(self.mode, press).cloned() {
            Some(command) => {
                self.execute_at(command, now);
                true
            }
            None => {
                log::trace!("Unbound key {:?} in {} mode", press, self.mode.name());
                false
            }
        }
    }

    /// Run a command, timestamping any camera animation with the current time.
    pub fn execute(&mut self, command: Command) {
        self.execute_at(command, Instant::now());
    }

    /// Run a command; `now` is the start time of any camera animation.
    pub fn execute_at(&mut self, command: Command, now: Instant) {
        log::debug!("Executing {}", command);
        match command {
            Command::Navigate(direction) => self.navigate_spatial(direction, now),
            Command::Next => self.navigate_sequential(true, now),
            Command::Previous => self.navigate_sequential(false, now),
            Command::Create(kind) => {
                self.create_element(kind, false, now);
            }
            Command::CreateConnected(kind) => {
                self.create_element(kind, true, now);
            }
            Command::DeleteSelected => self.delete_selected(now),
            Command::MoveSelected(direction) => self.move_selected(direction),
            Command::Select(id) => self.select(&id, now),
            Command::ClearSelection => self.set_selection(None, true, now),
            Command::FocusSelected => self.focus_selected(now),
            Command::FocusPrevious => self.focus_previous(now),
            Command::FitAll => self.fit_all(now),
            Command::ZoomIn => self.viewport.zoom_in(),
            Command::ZoomOut => self.viewport.zoom_out(),
            Command::ResetZoom => self.viewport.reset_zoom(),
            Command::SetMode(mode) => self.set_mode(mode),
        }
    }

    /// Select the nearest element in `direction`.
    ///
    /// With nothing selected the first element is selected instead.
    pub fn navigate_spatial(&mut self, direction: Direction, now: Instant) {
        if self.selected.is_none() {
            let first = self.store.first().map(|el| el.id().clone());
            if first.is_some() {
                self.set_selection(first, true, now);
            }
            return;
        }
        let Some(current) = self.selected_element() else {
            return;
        };

        let target = nearest_in_direction(
            &self.store,
            current,
            direction,
            self.config.direction_tolerance,
        )
        .map(|el| el.id().clone());

        match target {
            Some(id) => self.set_selection(Some(id), true, now),
            None => log::trace!("No element {} of {}", direction.name(), current.id()),
        }
    }

    /// Step through elements in store order, wrapping at both ends.
    pub fn navigate_sequential(&mut self, forward: bool, now: Instant) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let index = match self.selected.as_ref().and_then(|id| self.store.index_of(id)) {
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        let target = self.store.at(index).map(|el| el.id().clone());
        self.set_selection(target, true, now);
    }

    /// Add a new element and select it.
    ///
    /// It is placed `spawn_offset` to the right of the selection, or centred
    /// in the visible area when nothing is selected. With `connected` set
    /// and a selection present, the two elements are linked.
    pub fn create_element(
        &mut self,
        kind: ElementKind,
        connected: bool,
        now: Instant,
    ) -> ElementId {
        let size = self.config.default_element_size();
        let anchor = self.selected_element().map(|el| (el.id().clone(), el.position));

        let position = match &anchor {
            Some((_, position)) => Point::new(position.x + self.config.spawn_offset, position.y),
            None => {
                let center = self.viewport.viewport_bounds().center();
                Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
            }
        };

        let element = Element::new(kind, position, size.width, size.height);
        let id = element.id().clone();
        self.store.insert(element);
        log::debug!("Created {} {} at ({}, {})", kind.name(), id, position.x, position.y);
        self.emit(NavigationEvent::ElementCreated { id: id.clone() });

        if connected {
            if let Some((from, _)) = anchor {
                if self.store.connect(&from, &id) {
                    self.emit(NavigationEvent::ConnectionCreated {
                        from,
                        to: id.clone(),
                    });
                }
            }
        }

        self.set_selection(Some(id.clone()), true, now);
        id
    }

    /// Add an externally built element without selecting it.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id().clone();
        if self.store.contains(&id) {
            log::warn!("Replacing existing element {}", id);
        }
        self.store.insert(element);
        self.emit(NavigationEvent::ElementCreated { id: id.clone() });
        id
    }

    /// Link two existing elements.
    pub fn connect(&mut self, from: &ElementId, to: &ElementId) -> bool {
        if !self.store.connect(from, to) {
            return false;
        }
        self.emit(NavigationEvent::ConnectionCreated {
            from: from.clone(),
            to: to.clone(),
        });
        true
    }

    /// Delete the selected element and select the one after it.
    pub fn delete_selected(&mut self, now: Instant) {
        if let Some(id) = self.selected.clone() {
            self.delete_element(&id, now);
        }
    }

    /// Delete an element by id. Unknown ids are ignored.
    ///
    /// If it was selected, selection moves to the element that followed it
    /// in store order (wrapping), or to nothing if the store is now empty.
    pub fn delete_element(&mut self, id: &ElementId, now: Instant) {
        let Some(index) = self.store.index_of(id) else {
            return;
        };
        self.store.remove(id);
        self.history.purge(id);
        log::debug!("Deleted {}", id);

        if self.selected.as_ref() == Some(id) {
            let next = if self.store.is_empty() {
                None
            } else {
                self.store.at(index % self.store.len()).map(|el| el.id().clone())
            };
            // The old id no longer exists, so it is not recorded in history.
            let previous = self.selected.take();
            self.selected = next.clone();
            self.emit(NavigationEvent::ElementDeleted { id: id.clone() });
            self.emit(NavigationEvent::SelectionChanged {
                previous,
                current: next,
            });
            if self.selected.is_some() {
                self.follow_selection(now);
            } else {
                // Nothing left to focus on; stop flying to the deleted element.
                self.viewport.cancel_animation();
            }
        } else {
            self.emit(NavigationEvent::ElementDeleted { id: id.clone() });
        }
    }

    /// Nudge the selected element by `move_step`.
    pub fn move_selected(&mut self, direction: Direction) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let delta: Vec2 = direction.unit() * self.config.move_step;
        if self.store.translate(&id, delta) {
            self.emit_moved(id);
        }
    }

    /// Move an element so its top-left corner sits at `position`.
    pub fn move_element(&mut self, id: &ElementId, position: Point) -> bool {
        if !self.store.move_to(id, position) {
            return false;
        }
        self.emit_moved(id.clone());
        true
    }

    fn emit_moved(&mut self, id: ElementId) {
        if let Some(position) = self.store.get(&id).map(|el| el.position) {
            self.emit(NavigationEvent::ElementMoved { id, position });
        }
    }

    /// Select an element by id. Unknown ids are ignored.
    pub fn select(&mut self, id: &ElementId, now: Instant) {
        if self.store.contains(id) {
            self.set_selection(Some(id.clone()), true, now);
        }
    }

    pub fn clear_selection(&mut self, now: Instant) {
        self.set_selection(None, true, now);
    }

    /// Animate the camera onto the selected element.
    pub fn focus_selected(&mut self, now: Instant) {
        if let Some(bounds) = self.selected_element().map(Element::bounds) {
            self.viewport.focus_on_bounds(
                bounds,
                self.config.focus_padding,
                self.config.focus_duration(),
                now,
            );
        }
    }

    /// Go back to the most recent still-existing previously selected element.
    pub fn focus_previous(&mut self, now: Instant) {
        while let Some(id) = self.history.pop() {
            if self.store.contains(&id) && self.selected.as_ref() != Some(&id) {
                self.set_selection(Some(id), false, now);
                return;
            }
        }
    }

    /// Animate the camera to show every element.
    pub fn fit_all(&mut self, now: Instant) {
        if let Some(bounds) = self.store.bounds() {
            self.viewport.focus_on_bounds(
                bounds,
                self.config.focus_padding,
                self.config.focus_duration(),
                now,
            );
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        let previous = std::mem::replace(&mut self.mode, mode);
        log::debug!("Mode {} -> {}", previous.name(), mode.name());
        self.emit(NavigationEvent::ModeChanged {
            previous,
            current: mode,
        });
    }

    fn set_selection(&mut self, id: Option<ElementId>, record: bool, now: Instant) {
        if id == self.selected {
            return;
        }
        let previous = std::mem::replace(&mut self.selected, id.clone());
        if record {
            if let Some(old) = &previous {
                self.history.push(old.clone());
            }
        }
        log::debug!("Selection {:?} -> {:?}", previous, id);
        self.emit(NavigationEvent::SelectionChanged {
            previous,
            current: id,
        });
        self.follow_selection(now);
    }

    fn follow_selection(&mut self, now: Instant) {
        if self.config.follow_selection {
            self.focus_selected(now);
        }
    }
}
