// src/protocol/command.rs
//
// Typed device commands and their canonical wire encoding.
//
// Wire formats:
//   Bare:      $menu;  $exit;  $stream;
//   Frequency: $freq, <1..=100>;
//   Axis:      $axis, <pitch|roll|yaw>;
//   Vectors:   $ref, <roll>, <pitch>, <yaw>;   $sig, <roll>, <pitch>, <yaw>;

use std::fmt;

use serde::Serialize;

/// Lowest accepted sample frequency in Hz
pub const MIN_FREQUENCY_HZ: u8 = 1;
/// Highest accepted sample frequency in Hz
pub const MAX_FREQUENCY_HZ: u8 = 100;

// ============================================================================
// Types
// ============================================================================

/// Sensor axis selectable with `$axis, ...;`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Pitch,
    Roll,
    Yaw,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Pitch, Axis::Roll, Axis::Yaw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Pitch => "pitch",
            Axis::Roll => "roll",
            Axis::Yaw => "yaw",
        }
    }

    /// Exact, case-sensitive match against the protocol keywords
    pub fn from_keyword(s: &str) -> Option<Axis> {
        Axis::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roll/pitch/yaw triple carried by `$ref` and `$sig`.
///
/// Note the field order on the wire is roll, pitch, yaw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Attitude {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

impl Attitude {
    pub fn new(roll: i32, pitch: i32, yaw: i32) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// A validated device command.
///
/// Values of this type only come out of [`crate::protocol::validate`] (or are
/// built by hand from already range-checked parts), so every `Command` has a
/// wire encoding the device accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Menu,
    Exit,
    /// Enter streaming mode. Leaving it is implied by the next accepted command.
    StreamToggle,
    SetFrequency { hz: u8 },
    SetAxis { axis: Axis },
    SetReference(Attitude),
    SetSignal(Attitude),
}

impl Command {
    /// Protocol keyword between `$` and the first separator
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Menu => "menu",
            Command::Exit => "exit",
            Command::StreamToggle => "stream",
            Command::SetFrequency { .. } => "freq",
            Command::SetAxis { .. } => "axis",
            Command::SetReference(_) => "ref",
            Command::SetSignal(_) => "sig",
        }
    }

    /// Canonical wire string, e.g. `$ref, -10, 0, 270;`
    pub fn wire(&self) -> String {
        self.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.wire().into_bytes()
    }

    pub fn is_stream_start(&self) -> bool {
        matches!(self, Command::StreamToggle)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Command::Exit)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Menu | Command::Exit | Command::StreamToggle => {
                write!(f, "${};", self.keyword())
            }
            Command::SetFrequency { hz } => write!(f, "${}, {};", self.keyword(), hz),
            Command::SetAxis { axis } => write!(f, "${}, {};", self.keyword(), axis),
            Command::SetReference(a) | Command::SetSignal(a) => write!(
                f,
                "${}, {}, {}, {};",
                self.keyword(),
                a.roll,
                a.pitch,
                a.yaw
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_wire_encoding() {
        assert_eq!(Command::Menu.wire(), "$menu;");
        assert_eq!(Command::Exit.wire(), "$exit;");
        assert_eq!(Command::StreamToggle.wire(), "$stream;");
    }

    #[test]
    fn test_argument_wire_encoding() {
        assert_eq!(Command::SetFrequency { hz: 50 }.wire(), "$freq, 50;");
        assert_eq!(Command::SetAxis { axis: Axis::Roll }.wire(), "$axis, roll;");
        assert_eq!(
            Command::SetReference(Attitude::new(-10, 0, 270)).wire(),
            "$ref, -10, 0, 270;"
        );
        assert_eq!(
            Command::SetSignal(Attitude::new(1, -2, 3)).to_bytes(),
            b"$sig, 1, -2, 3;".to_vec()
        );
    }

    #[test]
    fn test_axis_keywords_are_case_sensitive() {
        assert_eq!(Axis::from_keyword("yaw"), Some(Axis::Yaw));
        assert_eq!(Axis::from_keyword("Yaw"), None);
        assert_eq!(Axis::from_keyword("bank"), None);
    }
}
