//! Board I/O
//!
//! - `hardware` - the `BoardHardware` capability the host loop drives
//! - `protocol` - line protocol shared by the emulator and the mock
//! - `emulator` - TCP client for the board emulator
//! - `mock` - in-memory board for tests

pub mod emulator;
pub mod hardware;
pub mod mock;
pub mod protocol;

pub use emulator::{EmulatorLink, DEFAULT_EMULATOR_ADDR};
pub use hardware::{BoardHardware, Cue};
pub use mock::MockBoard;
pub use protocol::{HarnessCommand, ProtocolError, SensorReport};
