//! Board hardware capability
//!
//! The controller never talks to sensors or indicators directly; the host
//! loop samples a [`BoardHardware`] and pushes feedback frames back to it.

use crate::game::feedback::IndicatorColor;
use crate::game::sensors::SensorSnapshot;
use crate::game::types::Square;
use crate::networking::protocol::ProtocolError;
use tracing::warn;

/// Short fire-and-forget signals layered over the normal frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A capture was completed on this square
    Capture(Square),
    /// A promotion was completed on this square
    Promotion(Square),
    /// The starting layout was verified
    SetupComplete,
    /// A gesture was refused on this square
    Rejected(Square),
}

/// Sensors and indicators of one physical (or emulated) board
pub trait BoardHardware {
    /// Current occupancy of all 64 squares
    fn sample_occupancy(&mut self) -> SensorSnapshot;

    /// Stage a square's color; shown on the next commit
    fn set_square_indicator(&mut self, square: Square, color: IndicatorColor);

    /// Show every staged color
    fn commit_indicators(&mut self) -> Result<(), ProtocolError>;

    /// Turn every indicator off and drop anything staged
    fn clear_indicators(&mut self) -> Result<(), ProtocolError>;

    /// Flash a cue; failures are logged, never returned
    fn cue(&mut self, cue: Cue) {
        let result = match cue {
            Cue::Capture(square) => flash(self, square, IndicatorColor::GREEN),
            Cue::Promotion(square) => flash(self, square, IndicatorColor::GOLD),
            Cue::Rejected(square) => flash(self, square, IndicatorColor::RED),
            Cue::SetupComplete => self.clear_indicators().and_then(|()| {
                for square in Square::all() {
                    self.set_square_indicator(square, IndicatorColor::GREEN);
                }
                self.commit_indicators()
            }),
        };
        if let Err(error) = result {
            warn!("[HARDWARE] Cue {:?} not shown: {}", cue, error);
        }
    }
}

fn flash<H: BoardHardware + ?Sized>(
    hardware: &mut H,
    square: Square,
    color: IndicatorColor,
) -> Result<(), ProtocolError> {
    hardware.set_square_indicator(square, color);
    hardware.commit_indicators()
}
