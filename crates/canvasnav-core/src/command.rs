//! Decoded input commands.
//!
//! The input layer turns key presses (see [`crate::input::Keymap`]) or named
//! command strings into a [`Command`]. Everything past this point is an
//! exhaustive `match`, so an unmapped command cannot be silently ignored.

use crate::element::{ElementId, ElementKind};
use crate::navigation::Mode;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while decoding command names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
    #[error("Unknown element kind: {0}")]
    UnknownElementKind(String),
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
    #[error("Command '{0}' requires an argument")]
    MissingArgument(String),
}

/// Screen-aligned navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Unit vector pointing in this direction (y grows downwards).
    pub fn unit(&self) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

impl FromStr for Direction {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(CommandParseError::InvalidDirection(other.to_string())),
        }
    }
}

/// A command executed by the navigation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select the nearest element in a direction.
    Navigate(Direction),
    /// Select the next element in store order.
    Next,
    /// Select the previous element in store order.
    Previous,
    /// Create an element next to the selection (or in the view centre).
    Create(ElementKind),
    /// Like `Create`, and connect the new element to the selection.
    CreateConnected(ElementKind),
    DeleteSelected,
    /// Nudge the selected element by the configured step.
    MoveSelected(Direction),
    Select(ElementId),
    ClearSelection,
    /// Re-centre the camera on the selection.
    FocusSelected,
    /// Return to the previously selected element.
    FocusPrevious,
    /// Fit every element into the view.
    FitAll,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetMode(Mode),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(dir) => write!(f, "navigate-{}", dir.name()),
            Self::Next => f.write_str("next"),
            Self::Previous => f.write_str("previous"),
            Self::Create(kind) => write!(f, "create:{}", kind.name()),
            Self::CreateConnected(kind) => write!(f, "create-connected:{}", kind.name()),
            Self::DeleteSelected => f.write_str("delete"),
            Self::MoveSelected(dir) => write!(f, "move-{}", dir.name()),
            Self::Select(id) => write!(f, "select:{}", id),
            Self::ClearSelection => f.write_str("clear-selection"),
            Self::FocusSelected => f.write_str("focus"),
            Self::FocusPrevious => f.write_str("focus-previous"),
            Self::FitAll => f.write_str("fit-all"),
            Self::ZoomIn => f.write_str("zoom-in"),
            Self::ZoomOut => f.write_str("zoom-out"),
            Self::ResetZoom => f.write_str("reset-zoom"),
            Self::SetMode(mode) => write!(f, "mode:{}", mode.name()),
        }
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse the names produced by `Display`, e.g. `navigate-left`,
    /// `create:method` or `mode:connect`. `create` alone creates a class.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let kind =
            |arg: Option<&str>| arg.map_or(Ok(ElementKind::Class), str::parse::<ElementKind>);

        match name {
            "next" => Ok(Self::Next),
            "previous" => Ok(Self::Previous),
            "create" => Ok(Self::Create(kind(arg)?)),
            "create-connected" => Ok(Self::CreateConnected(kind(arg)?)),
            "delete" => Ok(Self::DeleteSelected),
            "select" => match arg {
                Some(id) if !id.is_empty() => Ok(Self::Select(ElementId::from(id))),
                _ => Err(CommandParseError::MissingArgument(name.to_string())),
            },
            "clear-selection" => Ok(Self::ClearSelection),
            "focus" => Ok(Self::FocusSelected),
            "focus-previous" => Ok(Self::FocusPrevious),
            "fit-all" => Ok(Self::FitAll),
            "zoom-in" => Ok(Self::ZoomIn),
            "zoom-out" => Ok(Self::ZoomOut),
            "reset-zoom" => Ok(Self::ResetZoom),
            "mode" => match arg {
                Some(mode) => Ok(Self::SetMode(mode.parse()?)),
                None => Err(CommandParseError::MissingArgument(name.to_string())),
            },
            _ => {
                if let Some(dir) = name.strip_prefix("navigate-") {
                    Ok(Self::Navigate(dir.parse()?))
                } else if let Some(dir) = name.strip_prefix("move-") {
                    Ok(Self::MoveSelected(dir.parse()?))
                } else {
                    Err(CommandParseError::UnknownCommand(s.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!("navigate-left".parse::<Command>(), Ok(Command::Navigate(Direction::Left)));
        assert_eq!("move-down".parse::<Command>(), Ok(Command::MoveSelected(Direction::Down)));
        assert_eq!("next".parse::<Command>(), Ok(Command::Next));
    }

    #[test]
    fn test_malformed_direction_is_rejected() {
        assert_eq!(
            "navigate-diagonal".parse::<Command>(),
            Err(CommandParseError::InvalidDirection("diagonal".to_string()))
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!("create".parse::<Command>(), Ok(Command::Create(ElementKind::Class)));
        assert_eq!(
            "create-connected:interface".parse::<Command>(),
            Ok(Command::CreateConnected(ElementKind::Interface))
        );
        assert_eq!("select:abc".parse::<Command>(), Ok(Command::Select("abc".into())));
        assert_eq!("mode:connect".parse::<Command>(), Ok(Command::SetMode(Mode::Connect)));
        assert!(matches!(
            "select".parse::<Command>(),
            Err(CommandParseError::MissingArgument(_))
        ));
        assert!(matches!(
            "mode:edit".parse::<Command>(),
            Err(CommandParseError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            "undo".parse::<Command>(),
            Err(CommandParseError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        let commands = [
            Command::Navigate(Direction::Up),
            Command::CreateConnected(ElementKind::Method),
            Command::SetMode(Mode::Create),
            Command::Select("x".into()),
            Command::FitAll,
        ];
        for command in commands {
            assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        }
    }
}
