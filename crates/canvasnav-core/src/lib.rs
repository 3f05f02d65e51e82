//! canvasnav core library
//!
//! Camera transforms and keyboard navigation for an infinite diagram
//! canvas. Renderers read [`Viewport::viewport`], [`Viewport::viewport_bounds`]
//! and the [`ElementStore`] once per frame; hosts feed key presses or
//! [`Command`]s into the [`NavigationController`].

pub mod animation;
pub mod command;
pub mod config;
pub mod element;
pub mod input;
pub mod navigation;
pub mod store;
pub mod viewport;

pub use animation::{AnimationStatus, AnimationToken, CameraAnimation, Instant, ease_out_cubic};
pub use command::{Command, CommandParseError, Direction};
pub use config::{CanvasConfig, ConfigError, NavigationConfig, ViewportConfig};
pub use element::{Element, ElementId, ElementKind};
pub use input::{Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use navigation::{
    FocusHistory, ListenerId, Mode, NavigationController, NavigationEvent, NavigationState,
};
pub use store::ElementStore;
pub use viewport::{Viewport, ViewportState};
