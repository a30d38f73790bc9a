//! Host-test line protocol
//!
//! Newline-terminated ASCII, one message per line, fields separated by
//! single spaces. Rows and columns are 0-based.
//!
//! | Direction | Line                      | Meaning                         |
//! |-----------|---------------------------|---------------------------------|
//! | out       | `L <row> <col> <r> <g> <b>` | Stage a square's indicator color |
//! | out       | `C`                       | Turn every indicator off        |
//! | out       | `S`                       | Show the staged indicators      |
//! | in        | `E <row> <col> <0\|1>`    | A square's sensor changed       |

use crate::game::feedback::IndicatorColor;
use crate::game::types::Square;
use std::fmt;
use std::str::FromStr;

/// Errors for the harness link
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A line did not match any message shape
    #[error("Malformed line '{line}': {reason}")]
    Malformed { line: String, reason: String },

    /// The link itself failed
    #[error("Harness I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection
    #[error("Harness disconnected")]
    Disconnected,
}

fn malformed(line: &str, reason: impl Into<String>) -> ProtocolError {
    ProtocolError::Malformed {
        line: line.to_string(),
        reason: reason.into(),
    }
}

/// Commands sent to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessCommand {
    SetIndicator { square: Square, color: IndicatorColor },
    ClearAll,
    Show,
}

impl fmt::Display for HarnessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessCommand::SetIndicator { square, color } => write!(
                f,
                "L {} {} {} {} {}",
                square.row(),
                square.col(),
                color.r,
                color.g,
                color.b
            ),
            HarnessCommand::ClearAll => f.write_str("C"),
            HarnessCommand::Show => f.write_str("S"),
        }
    }
}

fn parse_square(line: &str, row: Option<&str>, col: Option<&str>) -> Result<Square, ProtocolError> {
    let row: u8 = row
        .ok_or_else(|| malformed(line, "missing row"))?
        .parse()
        .map_err(|_| malformed(line, "row is not a number"))?;
    let col: u8 = col
        .ok_or_else(|| malformed(line, "missing column"))?
        .parse()
        .map_err(|_| malformed(line, "column is not a number"))?;
    Square::new(row, col).ok_or_else(|| malformed(line, "square out of range"))
}

fn parse_channel(line: &str, field: Option<&str>) -> Result<u8, ProtocolError> {
    field
        .ok_or_else(|| malformed(line, "missing color channel"))?
        .parse()
        .map_err(|_| malformed(line, "color channel is not 0-255"))
}

impl FromStr for HarnessCommand {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let command = match fields.next() {
            Some("L") => {
                let square = parse_square(line, fields.next(), fields.next())?;
                let r = parse_channel(line, fields.next())?;
                let g = parse_channel(line, fields.next())?;
                let b = parse_channel(line, fields.next())?;
                HarnessCommand::SetIndicator {
                    square,
                    color: IndicatorColor::new(r, g, b),
                }
            }
            Some("C") => HarnessCommand::ClearAll,
            Some("S") => HarnessCommand::Show,
            Some(other) => return Err(malformed(line, format!("unknown command '{other}'"))),
            None => return Err(malformed(line, "empty line")),
        };
        if fields.next().is_some() {
            return Err(malformed(line, "trailing fields"));
        }
        Ok(command)
    }
}

/// A sensor change reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReport {
    pub square: Square,
    pub occupied: bool,
}

impl fmt::Display for SensorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E {} {} {}",
            self.square.row(),
            self.square.col(),
            u8::from(self.occupied)
        )
    }
}

impl FromStr for SensorReport {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("E") {
            return Err(malformed(line, "expected 'E'"));
        }
        let square = parse_square(line, fields.next(), fields.next())?;
        let occupied = match fields.next() {
            Some("0") => false,
            Some("1") => true,
            _ => return Err(malformed(line, "state must be 0 or 1")),
        };
        if fields.next().is_some() {
            return Err(malformed(line, "trailing fields"));
        }
        Ok(SensorReport { square, occupied })
    }
}
