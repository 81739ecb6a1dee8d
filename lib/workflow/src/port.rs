//! Canvas port naming.
//!
//! Canvas nodes expose numbered ports named `input_N` and `output_N`
//! (1-based). A block descriptor's `inputs`/`outputs` counts say how many of
//! each a node gets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A port name such as `output_1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortName {
    direction: PortDirection,
    index: u32,
}

impl PortName {
    /// Creates an input port name. `index` is 1-based.
    #[must_use]
    pub const fn input(index: u32) -> Self {
        Self {
            direction: PortDirection::Input,
            index,
        }
    }

    /// Creates an output port name. `index` is 1-based.
    #[must_use]
    pub const fn output(index: u32) -> Self {
        Self {
            direction: PortDirection::Output,
            index,
        }
    }

    /// The port every graph edge leaves from.
    #[must_use]
    pub const fn first_output() -> Self {
        Self::output(1)
    }

    /// The port every graph edge arrives at.
    #[must_use]
    pub const fn first_input() -> Self {
        Self::input(1)
    }

    #[must_use]
    pub const fn direction(&self) -> PortDirection {
        self.direction
    }

    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Returns true if a node with `count` ports on this side has this port.
    #[must_use]
    pub const fn exists_within(&self, count: u32) -> bool {
        self.index >= 1 && self.index <= count
    }

    /// All port names for one side of a node with `count` ports.
    pub fn all(direction: PortDirection, count: u32) -> impl Iterator<Item = Self> {
        (1..=count).map(move |index| Self { direction, index })
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.direction.prefix(), self.index)
    }
}

/// Error returned when a string is not a port name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePortError {
    pub input: String,
}

impl fmt::Display for ParsePortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a port name: '{}'", self.input)
    }
}

impl std::error::Error for ParsePortError {}

impl FromStr for PortName {
    type Err = ParsePortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePortError {
            input: s.to_string(),
        };
        let (prefix, index) = s.rsplit_once('_').ok_or_else(err)?;
        let direction = match prefix {
            "input" => PortDirection::Input,
            "output" => PortDirection::Output,
            _ => return Err(err()),
        };
        let index: u32 = index.parse().map_err(|_| err())?;
        if index == 0 {
            return Err(err());
        }
        Ok(Self { direction, index })
    }
}

impl Serialize for PortName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PortName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
