//! In-memory board for tests and hardware-free runs
//!
//! Keeps an occupancy bitboard that tests edit directly (or feed with `E`
//! lines) and records every protocol line the host would have sent.

use super::hardware::BoardHardware;
use super::protocol::{HarnessCommand, ProtocolError, SensorReport};
use crate::game::feedback::IndicatorColor;
use crate::game::sensors::SensorSnapshot;
use crate::game::types::Square;

#[derive(Debug, Clone, Default)]
pub struct MockBoard {
    snapshot: SensorSnapshot,
    staged: Vec<HarnessCommand>,
    sent: Vec<String>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board whose sensors already read `occupied`
    pub fn with_occupancy(occupied: u64) -> Self {
        Self {
            snapshot: SensorSnapshot::from_bits(occupied),
            ..Self::default()
        }
    }

    pub fn lift(&mut self, square: Square) {
        self.snapshot.set(square, false);
    }

    pub fn place(&mut self, square: Square) {
        self.snapshot.set(square, true);
    }

    /// Apply an inbound `E <row> <col> <0|1>` line
    pub fn feed_line(&mut self, line: &str) -> Result<(), ProtocolError> {
        let report: SensorReport = line.parse()?;
        self.snapshot.set(report.square, report.occupied);
        Ok(())
    }

    /// Every outbound line so far, oldest first
    pub fn sent_lines(&self) -> &[String] {
        &self.sent
    }

    /// Drain the outbound log
    pub fn take_sent(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent)
    }
}

impl BoardHardware for MockBoard {
    fn sample_occupancy(&mut self) -> SensorSnapshot {
        self.snapshot
    }

    fn set_square_indicator(&mut self, square: Square, color: IndicatorColor) {
        self.staged
            .push(HarnessCommand::SetIndicator { square, color });
    }

    fn commit_indicators(&mut self) -> Result<(), ProtocolError> {
        self.sent
            .extend(self.staged.drain(..).map(|command| command.to_string()));
        self.sent.push(HarnessCommand::Show.to_string());
        Ok(())
    }

    fn clear_indicators(&mut self) -> Result<(), ProtocolError> {
        self.staged.clear();
        self.sent.push(HarnessCommand::ClearAll.to_string());
        Ok(())
    }
}
