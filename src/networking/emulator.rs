//! TCP link to the board emulator
//!
//! The emulator speaks the line protocol from [`super::protocol`]. A
//! background reader thread parses inbound `E` lines and hands them to the
//! polling loop over a crossbeam channel; the loop is the only consumer and
//! the only writer of the socket.
//!
//! On connect the emulator reports every occupied square, so the first few
//! samples converge on the physical position.

use super::hardware::BoardHardware;
use super::protocol::{HarnessCommand, ProtocolError, SensorReport};
use crate::game::feedback::IndicatorColor;
use crate::game::sensors::SensorSnapshot;
use crate::game::types::Square;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Default emulator address
pub const DEFAULT_EMULATOR_ADDR: &str = "127.0.0.1:2323";

pub struct EmulatorLink {
    stream: TcpStream,
    writer: BufWriter<TcpStream>,
    reports: Receiver<SensorReport>,
    snapshot: SensorSnapshot,
    reader: Option<JoinHandle<()>>,
    connected: bool,
}

impl EmulatorLink {
    pub fn connect<A: ToSocketAddrs + std::fmt::Debug>(addr: A) -> Result<Self, ProtocolError> {
        info!("[EMULATOR] Connecting to {:?}", addr);
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let read_half = stream.try_clone()?;
        let reader = std::thread::Builder::new()
            .name("emulator-reader".to_string())
            .spawn(move || read_reports(read_half, tx))?;

        let writer = BufWriter::new(stream.try_clone()?);
        info!("[EMULATOR] Connected to {}", stream.peer_addr()?);

        Ok(Self {
            stream,
            writer,
            reports: rx,
            snapshot: SensorSnapshot::default(),
            reader: Some(reader),
            connected: true,
        })
    }

    /// False once the emulator closed the connection
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, command: HarnessCommand) -> Result<(), ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::Disconnected);
        }
        writeln!(self.writer, "{command}")?;
        Ok(())
    }
}

fn read_reports(stream: TcpStream, tx: Sender<SensorReport>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("[EMULATOR] Read failed: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<SensorReport>() {
            Ok(report) => {
                if tx.send(report).is_err() {
                    break;
                }
            }
            Err(e) => warn!("[EMULATOR] {}", e),
        }
    }
    debug!("[EMULATOR] Reader thread exiting");
}

impl BoardHardware for EmulatorLink {
    fn sample_occupancy(&mut self) -> SensorSnapshot {
        loop {
            match self.reports.try_recv() {
                Ok(report) => {
                    debug!("[EMULATOR] {}", report);
                    self.snapshot.set(report.square, report.occupied);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        warn!("[EMULATOR] Emulator closed the connection");
                        self.connected = false;
                    }
                    break;
                }
            }
        }
        self.snapshot
    }

    fn set_square_indicator(&mut self, square: Square, color: IndicatorColor) {
        if let Err(e) = self.send(HarnessCommand::SetIndicator { square, color }) {
            debug!("[EMULATOR] Dropped indicator for {}: {}", square, e);
        }
    }

    fn commit_indicators(&mut self) -> Result<(), ProtocolError> {
        self.send(HarnessCommand::Show)?;
        self.writer.flush()?;
        Ok(())
    }

    fn clear_indicators(&mut self) -> Result<(), ProtocolError> {
        self.send(HarnessCommand::ClearAll)
    }
}

impl Drop for EmulatorLink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let _ = self.stream.shutdown(Shutdown::Both);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}
