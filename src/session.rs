//! Polling session
//!
//! One call to [`Session::poll`] is one iteration of the host loop:
//! sample the sensors, advance the controller, ask the engine when it is its
//! turn, and refresh the indicators. The engine request is the only blocking
//! point and is bounded by its timeout.
//!
//! Clearing every piece off the board during a game resets it back to setup.
//! A session built with [`Session::sensor_test`] skips the game entirely and
//! mirrors the raw sensor readings on the indicators.

use crate::game::ai::{EngineAdapter, EngineSettings};
use crate::game::controller::{GameController, GameMode, GamePhase, TickOutcome};
use crate::game::error::GameError;
use crate::game::feedback::{self, Frame};
use crate::game::reconciler::ReconcilerEvent;
use crate::game::sensors::SensorSnapshot;
use crate::networking::hardware::{BoardHardware, Cue};
use crate::networking::protocol::ProtocolError;
use tracing::{info, warn};

/// Polls a cue stays on the board before the normal frame returns
const CUE_HOLD_POLLS: u32 = 8;

/// Polls between occupancy dumps in the sensor test
const SENSOR_LOG_POLLS: u32 = 40;

#[derive(Debug)]
pub struct Session {
    controller: GameController,
    engine_settings: EngineSettings,
    last_frame: Option<Frame>,
    cue_hold: u32,
    gave_up: bool,
    /// A piece has been read since the last reset
    seen_pieces: bool,
    sensor_test: bool,
    polls: u32,
}

impl Session {
    pub fn new(mode: GameMode, engine_settings: EngineSettings) -> Self {
        Self::with_controller(GameController::new(mode), engine_settings)
    }

    pub fn with_controller(controller: GameController, engine_settings: EngineSettings) -> Self {
        Self {
            controller,
            engine_settings,
            last_frame: None,
            cue_hold: 0,
            gave_up: false,
            seen_pieces: false,
            sensor_test: false,
            polls: 0,
        }
    }

    /// Session that only mirrors sensor readings on the indicators
    pub fn sensor_test() -> Self {
        let mut session = Self::new(GameMode::Local, EngineSettings::default());
        session.sensor_test = true;
        info!("[SESSION] Sensor test: place pieces to light their squares");
        session
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Start over from setup, forgetting the engine failure history
    pub fn reset(&mut self) {
        self.controller.reset();
        self.last_frame = None;
        self.cue_hold = 0;
        self.gave_up = false;
        self.seen_pieces = false;
    }

    /// One loop iteration
    ///
    /// Errors come only from the hardware link; game and engine errors are
    /// reported on the board and logged.
    pub fn poll<H, E>(&mut self, hardware: &mut H, engine: &E) -> Result<(), ProtocolError>
    where
        H: BoardHardware + ?Sized,
        E: EngineAdapter + ?Sized,
    {
        let snapshot = hardware.sample_occupancy();
        if self.sensor_test {
            return self.mirror_sensors(hardware, snapshot);
        }

        if snapshot.is_empty() {
            if self.seen_pieces && self.controller.phase() != GamePhase::AwaitingSetup {
                info!("[SESSION] Board cleared, back to setup");
                self.reset();
            }
        } else {
            self.seen_pieces = true;
        }

        if self.controller.phase() == GamePhase::AwaitingSetup {
            let report = self.controller.verify_setup(snapshot);
            if report.is_complete() {
                self.cue(hardware, Cue::SetupComplete);
            } else if self.cue_hold == 0 {
                let frame = feedback::render_setup(self.controller.board(), &report);
                self.show(hardware, frame)?;
            } else {
                self.cue_hold -= 1;
            }
            return Ok(());
        }

        match self.controller.tick(snapshot) {
            TickOutcome::Event(ReconcilerEvent::Place {
                to,
                captured: Some(_),
                ..
            }) => self.cue(hardware, Cue::Capture(to)),
            TickOutcome::Event(ReconcilerEvent::Promotion { square, .. }) => {
                self.cue(hardware, Cue::Promotion(square))
            }
            TickOutcome::Rejected(
                GameError::InvalidPlacement { square } | GameError::IllegalPickup { square },
            ) => self.cue(hardware, Cue::Rejected(square)),
            _ => {}
        }

        if self.controller.needs_engine_move() {
            self.ask_engine(hardware, engine)?;
        }

        if self.cue_hold > 0 {
            self.cue_hold -= 1;
            return Ok(());
        }
        let frame = feedback::render_game(&self.controller);
        self.show(hardware, frame)
    }

    fn ask_engine<H, E>(&mut self, hardware: &mut H, engine: &E) -> Result<(), ProtocolError>
    where
        H: BoardHardware + ?Sized,
        E: EngineAdapter + ?Sized,
    {
        if self.controller.engine_retries_exhausted(&self.engine_settings) {
            if !self.gave_up {
                warn!(
                    "[ENGINE] Giving up after {} failed requests; clear the board to start over",
                    self.controller.engine_failures()
                );
                self.gave_up = true;
            }
            return Ok(());
        }

        self.show(hardware, feedback::render_thinking())?;
        if let Ok(spec) = self
            .controller
            .request_engine_move(engine, &self.engine_settings)
        {
            info!("[ENGINE] Replay {} on the board", spec);
            self.gave_up = false;
        }
        Ok(())
    }

    fn mirror_sensors<H: BoardHardware + ?Sized>(
        &mut self,
        hardware: &mut H,
        snapshot: SensorSnapshot,
    ) -> Result<(), ProtocolError> {
        if self.polls % SENSOR_LOG_POLLS == 0 {
            info!(
                "[SESSION] {} squares occupied\n{}",
                snapshot.bits().count_ones(),
                snapshot.diagram()
            );
        }
        self.polls = self.polls.wrapping_add(1);
        self.show(hardware, feedback::render_occupancy(snapshot))
    }

    fn cue<H: BoardHardware + ?Sized>(&mut self, hardware: &mut H, cue: Cue) {
        hardware.cue(cue);
        self.last_frame = None;
        self.cue_hold = CUE_HOLD_POLLS;
    }

    fn show<H: BoardHardware + ?Sized>(&mut self, hardware: &mut H, frame: Frame) -> Result<(), ProtocolError> {
        if self.last_frame == Some(frame) {
            return Ok(());
        }
        feedback::present(hardware, &frame)?;
        self.last_frame = Some(frame);
        Ok(())
    }
}
