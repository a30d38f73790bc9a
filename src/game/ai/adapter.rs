//! Engine adapter seam
//!
//! The board never searches for moves itself. On the engine's turn it
//! serializes the position, hands it to an [`EngineAdapter`], and gets back a
//! [`MoveSpec`] that the human then replays on the physical board.
//!
//! The service answers with a small JSON object whose `bestmove` field holds
//! a UCI-style line, e.g. `"bestmove":"bestmove e2e4 ponder e7e5"`. It is
//! scanned as text rather than deserialized: only the literal markers below
//! are trusted, and anything else is a [`EngineError::Parse`].

use super::resource::EngineSettings;
use crate::game::types::Square;
use std::fmt;
use std::str::FromStr;

const SUCCESS_MARKER: &str = "\"success\":true";
const BESTMOVE_FIELD: &str = "\"bestmove\":\"";
const BESTMOVE_PREFIX: &str = "bestmove ";

/// Failures of a single engine request
///
/// All variants are non-fatal: the board and the turn are left untouched and
/// the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The service could not be reached or answered with a transport error
    #[error("Engine connection failed: {0}")]
    Connection(String),

    /// No answer within the request timeout
    #[error("Engine did not answer within {0} ms")]
    Timeout(u64),

    /// The answer did not contain a usable move
    #[error("Unusable engine response: {0}")]
    Parse(String),
}

/// A move as the engine reports it: origin, destination, optional promotion
/// letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveSpec {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<char>,
}

impl MoveSpec {
    pub fn new(from: Square, to: Square) -> Self {
        MoveSpec {
            from,
            to,
            promotion: None,
        }
    }
}

impl FromStr for MoveSpec {
    type Err = EngineError;

    /// Parse `<file><rank><file><rank>[promo]`, e.g. `e2e4` or `a7a8q`
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(EngineError::Parse(format!(
                "move '{token}' must be 4 or 5 characters"
            )));
        }

        let from = Square::from_file_rank(chars[0], chars[1])
            .ok_or_else(|| EngineError::Parse(format!("origin of '{token}' is off the board")))?;
        let to = Square::from_file_rank(chars[2], chars[3]).ok_or_else(|| {
            EngineError::Parse(format!("destination of '{token}' is off the board"))
        })?;

        let promotion = match chars.get(4) {
            None => None,
            Some(&c) if matches!(c.to_ascii_lowercase(), 'q' | 'r' | 'b' | 'n') => {
                Some(c.to_ascii_lowercase())
            }
            Some(c) => {
                return Err(EngineError::Parse(format!(
                    "unknown promotion piece '{c}' in '{token}'"
                )))
            }
        };

        Ok(MoveSpec {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

/// Source of engine moves
///
/// Implementations block until they have an answer or the request fails;
/// `settings.timeout_ms` bounds the wait.
pub trait EngineAdapter {
    fn request_move(
        &self,
        position: &str,
        settings: &EngineSettings,
    ) -> Result<MoveSpec, EngineError>;
}

impl<T: EngineAdapter + ?Sized> EngineAdapter for &T {
    fn request_move(
        &self,
        position: &str,
        settings: &EngineSettings,
    ) -> Result<MoveSpec, EngineError> {
        (**self).request_move(position, settings)
    }
}

/// Extract the best move from a raw service response
///
/// Anything before the first `{` (stray headers, BOM) is skipped. A trailing
/// `ponder` move is ignored.
pub fn parse_engine_response(response: &str) -> Result<MoveSpec, EngineError> {
    let start = response
        .find('{')
        .ok_or_else(|| EngineError::Parse("no JSON object in response".to_string()))?;
    let json = &response[start..];

    if !json.contains(SUCCESS_MARKER) {
        return Err(EngineError::Parse("request was not successful".to_string()));
    }

    let value_start = json
        .find(BESTMOVE_FIELD)
        .map(|i| i + BESTMOVE_FIELD.len())
        .ok_or_else(|| EngineError::Parse("no bestmove field".to_string()))?;
    let value_len = json[value_start..]
        .find('"')
        .ok_or_else(|| EngineError::Parse("unterminated bestmove field".to_string()))?;
    let line = &json[value_start..value_start + value_len];

    let move_start = line
        .find(BESTMOVE_PREFIX)
        .map(|i| i + BESTMOVE_PREFIX.len())
        .ok_or_else(|| EngineError::Parse(format!("no 'bestmove' prefix in '{line}'")))?;
    let rest = &line[move_start..];
    let token = rest.split(' ').next().unwrap_or(rest);

    token.parse()
}
