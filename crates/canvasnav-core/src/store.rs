//! Ordered element storage.

use crate::element::{Element, ElementId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized form of a store: elements in insertion order.
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    elements: Vec<Element>,
}

/// All elements on the canvas, keyed by id and kept in insertion order.
///
/// The store is the only place connection lists are edited, so the
/// "if A lists B then B lists A" invariant holds after every operation.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
}

impl ElementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element at the end of the iteration order.
    ///
    /// An element with an existing id replaces the old one in place. Listed
    /// connections to unknown ids are dropped and the rest are mirrored onto
    /// the neighbours.
    pub fn insert(&mut self, mut element: Element) -> Option<Element> {
        let id = element.id.clone();
        let slot = self.index_of(&id);
        let previous = self.remove(&id);

        let requested = std::mem::take(&mut element.connections);
        match slot {
            Some(index) => self.order.insert(index, id.clone()),
            None => self.order.push(id.clone()),
        }
        self.elements.insert(id.clone(), element);

        for other in requested {
            self.connect(&id, &other);
        }
        previous
    }

    /// Remove an element, unlinking it from every neighbour.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.elements.remove(id)?;
        self.order.retain(|other| other != id);
        for neighbour in &removed.connections {
            if let Some(el) = self.elements.get_mut(neighbour) {
                el.connections.retain(|c| c != id);
            }
        }
        Some(removed)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[ElementId] {
        &self.order
    }

    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.order.iter().position(|other| other == id)
    }

    pub fn first(&self) -> Option<&Element> {
        self.order.first().and_then(|id| self.elements.get(id))
    }

    pub fn last(&self) -> Option<&Element> {
        self.order.last().and_then(|id| self.elements.get(id))
    }

    /// Element at a position in the iteration order.
    pub fn at(&self, index: usize) -> Option<&Element> {
        self.order.get(index).and_then(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Link two elements in both directions.
    ///
    /// Returns `true` if a new link was made; self-links, unknown ids and
    /// existing links return `false`.
    pub fn connect(&mut self, a: &ElementId, b: &ElementId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        if self.elements.get(a).is_some_and(|el| el.is_connected_to(b)) {
            return false;
        }
        if let Some(el) = self.elements.get_mut(a) {
            el.connections.push(b.clone());
        }
        if let Some(el) = self.elements.get_mut(b) {
            if !el.is_connected_to(a) {
                el.connections.push(a.clone());
            }
        }
        true
    }

    /// Unique undirected connections, ordered by their first endpoint.
    pub fn connections(&self) -> Vec<(ElementId, ElementId)> {
        let mut pairs = Vec::new();
        for (index, id) in self.order.iter().enumerate() {
            let Some(el) = self.elements.get(id) else { continue };
            for other in &el.connections {
                if self.index_of(other).is_some_and(|other_index| other_index > index) {
                    pairs.push((id.clone(), other.clone()));
                }
            }
        }
        pairs
    }

    /// Move an element so its top-left corner sits at `position`.
    pub fn move_to(&mut self, id: &ElementId, position: Point) -> bool {
        match self.elements.get_mut(id) {
            Some(el) => {
                el.position = position;
                true
            }
            None => false,
        }
    }

    /// Offset an element by `delta`.
    pub fn translate(&mut self, id: &ElementId, delta: Vec2) -> bool {
        match self.elements.get_mut(id) {
            Some(el) => {
                el.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Union of all element bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.iter()
            .map(Element::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Serialize the store to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = StoreSnapshot {
            elements: self.iter().cloned().collect(),
        };
        serde_json::to_string_pretty(&snapshot)
    }

    /// Deserialize a store from JSON, repairing one-sided or dangling links.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;

        let mut store = Self::new();
        let mut links = Vec::new();
        for mut element in snapshot.elements {
            for other in element.connections.drain(..) {
                links.push((element.id.clone(), other));
            }
            store.insert(element);
        }
        for (a, b) in links {
            if !store.contains(&b) {
                log::warn!("Dropping dangling connection {} -> {}", a, b);
            }
            store.connect(&a, &b);
        }
        Ok(store)
    }
}
