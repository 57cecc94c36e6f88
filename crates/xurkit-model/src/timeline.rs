//! Timelines, keyframes and named frames.

use std::fmt;
use std::sync::Arc;

use xurkit_schema::PropertyDefinition;

use crate::{Error, Property, Result};

/// Definition chain from a top-level property down to an animated leaf.
pub type AnimationPath = Vec<Arc<PropertyDefinition>>;

/// How values are interpolated towards the next keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Interpolation {
    #[default]
    Linear = 0,
    None = 1,
    Ease = 2,
}

impl Interpolation {
    /// Decode the wire byte.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Linear),
            1 => Ok(Self::None),
            2 => Ok(Self::Ease),
            _ => Err(Error::UnknownInterpolation(value.to_string())),
        }
    }

    /// Parse a numeric or named form.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Ok(value) = text.parse::<u8>() {
            return Self::from_u8(value);
        }
        match text.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "none" => Ok(Self::None),
            "ease" => Ok(Self::Ease),
            _ => Err(Error::UnknownInterpolation(text.to_string())),
        }
    }
}

/// One keyframe of a timeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyframe {
    pub frame: u32,
    pub interpolation: Interpolation,
    pub ease_in: i8,
    pub ease_out: i8,
    pub ease_scale: i8,
    /// Animated properties, one per timeline path, in path order.
    pub properties: Vec<Property>,
}

impl Keyframe {
    /// Create a linear keyframe with no properties.
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }
}

/// Animation of one child element, addressed by the child's `Id`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    pub target: String,
    pub keyframes: Vec<Keyframe>,
}

impl Timeline {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            keyframes: Vec::new(),
        }
    }

    /// The animated property paths.
    ///
    /// Taken from the first keyframe; every other keyframe must animate the
    /// same paths in the same order.
    pub fn paths(&self) -> Result<Vec<AnimationPath>> {
        let Some(first) = self.keyframes.first() else {
            return Ok(Vec::new());
        };

        let paths = first
            .properties
            .iter()
            .map(|p| p.animation_path().map(|(path, _)| path))
            .collect::<Result<Vec<_>>>()?;

        for keyframe in &self.keyframes[1..] {
            if keyframe.properties.len() != paths.len() {
                return Err(Error::InconsistentTimeline(self.target.clone()));
            }
            for (property, expected) in keyframe.properties.iter().zip(&paths) {
                let (path, _) = property.animation_path()?;
                let same = path.len() == expected.len()
                    && path.iter().zip(expected).all(|(a, b)| a.same_declaration(b));
                if !same {
                    return Err(Error::InconsistentTimeline(self.target.clone()));
                }
            }
        }

        Ok(paths)
    }
}

/// Command attached to a named frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Play = 0,
    Stop = 1,
    GoTo = 2,
    GoToAndPlay = 3,
    GoToAndStop = 4,
}

impl Command {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Play),
            1 => Ok(Self::Stop),
            2 => Ok(Self::GoTo),
            3 => Ok(Self::GoToAndPlay),
            4 => Ok(Self::GoToAndStop),
            _ => Err(Error::UnknownCommand(value.to_string())),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(Self::Play),
            "stop" => Ok(Self::Stop),
            "goto" => Ok(Self::GoTo),
            "gotoandplay" => Ok(Self::GoToAndPlay),
            "gotoandstop" => Ok(Self::GoToAndStop),
            _ => Err(Error::UnknownCommand(text.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Stop => "stop",
            Self::GoTo => "goto",
            Self::GoToAndPlay => "gotoandplay",
            Self::GoToAndStop => "gotoandstop",
        }
    }

    /// Check if the command jumps to another named frame.
    pub fn needs_target(&self) -> bool {
        matches!(self, Self::GoTo | Self::GoToAndPlay | Self::GoToAndStop)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label on an object's timeline with an attached command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedFrame {
    pub name: String,
    pub frame: u32,
    pub command: Command,
    pub target: Option<String>,
}

impl NamedFrame {
    /// Create a named frame; GoTo-family commands require a target.
    pub fn new(name: impl Into<String>, frame: u32, command: Command, target: Option<String>) -> Result<Self> {
        let name = name.into();
        let target = target.filter(|t| !t.is_empty());
        if command.needs_target() && target.is_none() {
            return Err(Error::MissingCommandTarget(name));
        }
        Ok(Self {
            name,
            frame,
            command,
            target,
        })
    }
}
