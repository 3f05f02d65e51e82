//! Diagram elements placed on the canvas.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::command::CommandParseError;

/// Unique identifier of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of code-structure element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Class,
    Method,
    Interface,
}

impl ElementKind {
    /// Name used in command strings and serialized documents.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Interface => "interface",
        }
    }
}

impl FromStr for ElementKind {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(Self::Class),
            "method" => Ok(Self::Method),
            "interface" => Ok(Self::Interface),
            other => Err(CommandParseError::UnknownElementKind(other.to_string())),
        }
    }
}

/// A positioned element in world coordinates.
///
/// `connections` is kept symmetric by [`ElementStore`](crate::store::ElementStore);
/// it is read-only from outside the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the element.
    pub width: f64,
    /// Height of the element.
    pub height: f64,
    /// Element type.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub(crate) connections: Vec<ElementId>,
}

impl Element {
    /// Create a new element with a fresh id.
    pub fn new(kind: ElementKind, position: Point, width: f64, height: f64) -> Self {
        Self::with_id(ElementId::new(), kind, position, width, height)
    }

    /// Create a new element with a caller-chosen id.
    pub fn with_id(
        id: impl Into<ElementId>,
        kind: ElementKind,
        position: Point,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            width,
            height,
            kind,
            connections: Vec::new(),
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Ids of elements this one is connected to.
    pub fn connections(&self) -> &[ElementId] {
        &self.connections
    }

    pub fn is_connected_to(&self, other: &ElementId) -> bool {
        self.connections.contains(other)
    }

    /// Axis-aligned bounds in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
