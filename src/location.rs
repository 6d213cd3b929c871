//! Source locations carried by the typed tree.
//!
//! The loader never reads source text; locations only travel from the input
//! into documentation parse errors and fatal-error messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub file_name: String,
    /// Line number (1-indexed).
    pub line: i32,
    /// Offset of the beginning of the line.
    pub bol: i32,
    /// Character offset from beginning of file (0-indexed).
    pub cnum: i32,
}

impl Position {
    pub fn new(file_name: impl Into<String>, line: i32, bol: i32, cnum: i32) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            bol,
            cnum,
        }
    }

    /// Column (0-indexed).
    pub fn column(&self) -> i32 {
        self.cnum - self.bol
    }
}

/// A location span in an interface file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub loc_start: Position,
    pub loc_end: Position,
    /// Compiler-generated, no source text behind it.
    #[serde(default)]
    pub loc_ghost: bool,
}

impl Default for Location {
    fn default() -> Self {
        Self::none()
    }
}

impl Location {
    pub fn from_positions(start: Position, end: Position) -> Self {
        Self {
            loc_start: start,
            loc_end: end,
            loc_ghost: false,
        }
    }

    /// Create a ghost location at the start of a file.
    pub fn in_file(name: impl Into<String>) -> Self {
        let pos = Position::new(name, 1, 0, -1);
        Self {
            loc_start: pos.clone(),
            loc_end: pos,
            loc_ghost: true,
        }
    }

    /// Placeholder location for synthesized nodes.
    pub fn none() -> Self {
        Self::in_file("_none_")
    }

    pub fn is_none(&self) -> bool {
        self.loc_start.file_name == "_none_"
    }

    pub fn file_name(&self) -> &str {
        &self.loc_start.file_name
    }

    pub fn start_line(&self) -> i32 {
        self.loc_start.line
    }

    /// Location of the `line`-th line (0-indexed) of a comment starting here.
    ///
    /// Column information is dropped past the first line since the payload
    /// no longer carries the original indentation.
    pub fn nth_line(&self, line: usize) -> Self {
        if line == 0 {
            return self.clone();
        }
        let line = self.loc_start.line + line as i32;
        let pos = Position::new(self.loc_start.file_name.clone(), line, 0, -1);
        Self {
            loc_start: pos.clone(),
            loc_end: pos,
            loc_ghost: self.loc_ghost,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.is_none() {
            "(unknown)"
        } else {
            self.file_name()
        };
        let col = self.loc_start.column();
        if col < 0 {
            write!(f, "{}:{}", file, self.loc_start.line)
        } else {
            write!(f, "{}:{}:{}", file, self.loc_start.line, col + 1)
        }
    }
}

/// A value with an associated location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Located<T> {
    pub txt: T,
    pub loc: Location,
}

impl<T> Located<T> {
    pub fn new(txt: T, loc: Location) -> Self {
        Self { txt, loc }
    }

    pub fn mknoloc(txt: T) -> Self {
        Self {
            txt,
            loc: Location::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_none() {
        let loc = Location::none();
        assert!(loc.is_none());
        assert_eq!(loc.to_string(), "(unknown):1");
    }

    #[test]
    fn test_location_display() {
        let start = Position::new("m.mli", 5, 40, 45);
        let end_pos = Position::new("m.mli", 5, 40, 50);
        let loc = Location::from_positions(start, end_pos);

        assert_eq!(loc.to_string(), "m.mli:5:6");
    }

    #[test]
    fn test_nth_line() {
        let loc = Location::from_positions(
            Position::new("m.mli", 3, 10, 14),
            Position::new("m.mli", 6, 60, 62),
        );
        assert_eq!(loc.nth_line(0), loc);
        let third = loc.nth_line(2);
        assert_eq!(third.start_line(), 5);
        assert_eq!(third.to_string(), "m.mli:5");
    }
}
