//! A weather-band receiver chip driver with SAME alert decoding
//!
//! This crate drives an Si4707-class weather-band receiver over a
//! byte-oriented command bus: power sequencing, tuning across the seven
//! NOAA weather channels (162.400–162.550 MHz), signal-quality and
//! alert-tone queries, and retrieval of the SAME
//! ([Specific Area Message Encoding](https://en.wikipedia.org/wiki/Specific_Area_Message_Encoding))
//! headers the chip demodulates from the broadcast audio.
//!
//! It is hardware-agnostic. You supply a [`Transport`] that moves bytes
//! over whatever bus the chip hangs off of; everything above that,
//! including command framing, settle timing, state tracking, frame
//! assembly, and header decoding, lives here.
//!
//! # Disclaimer
//!
//! This crate has not been certified as a weather radio receiver or for
//! any other purpose. The author **strongly discourages** its use in
//! any safety-critical applications. Always have at least two methods
//! available for receiving weather alerts.
//!
//! # Example
//!
//! Bring the chip up, tune it, and decode alerts as they arrive:
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::time::Duration;
//!
//! use wxband::{command, ChipController, SameAssembler, SamePoll, Transport};
//!
//! // stand-in for a real I²C (or similar) bus binding
//! struct Bus;
//!
//! impl Transport for Bus {
//!     type Error = Infallible;
//!
//!     fn write(&mut self, _bytes: &[u8]) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//!
//!     fn read(&mut self, buf: &mut [u8]) -> Result<(), Infallible> {
//!         buf.fill(0);
//!         Ok(())
//!     }
//!
//!     fn set_reset(&mut self, _level: bool) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//!
//!     fn delay(&mut self, interval: Duration) {
//!         std::thread::sleep(interval);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut radio = ChipController::new(Bus);
//!     radio.reset()?;
//!     radio.power_up(true)?;
//!     radio.tune_khz(162_400)?;
//!
//!     let mut same = SameAssembler::new();
//!     loop {
//!         if radio.int_status()?.same()
//!             && same.poll(&mut radio, command::INTACK)? == SamePoll::Ready
//!         {
//!             let alert = same.parse()?;
//!             println!("{}: {}", alert.callsign(), alert);
//!             same.flush(&mut radio)?;
//!         }
//!     }
//! }
//! ```
//!
//! # Crate layout
//!
//! * [`ChipController`]: owns the [`Transport`] and issues every
//!   command, with the per-command settle delays the chip requires.
//! * [`SameAssembler`]: polls the chip's SAME buffer, applies
//!   per-byte confidence gating, and assembles complete frames.
//! * [`AlertRecord`]: the decoded header, with originator, event,
//!   location codes, timing, and call sign.
//! * [`command`]: raw command bytes and property identifiers, for
//!   callers that need properties the typed API does not cover.
//! * [`patch`]: the bundled 1050 Hz false-detection calibration patch.
//!
//! The controller is single-threaded by design: one command in flight
//! at a time, with `&mut self` enforcing exclusive bus access.

mod assembler;
pub mod command;
mod controller;
mod message;
pub mod patch;
mod status;
mod transport;
mod tuning;

pub use assembler::{
    SameAssembler, SamePoll, CONFIDENCE_THRESHOLD, SAME_BUFFER_SIZE, SAME_MIN_LENGTH,
};
pub use controller::{volume_in_range, ChipController, ChipError, ChipState, MAX_VOLUME};
pub use message::{
    AlertDecodeErr, AlertRecord, Originator, SignificanceLevel, UnknownSignificanceLevel,
    MAX_LOCATION_CODES,
};
pub use status::{
    AgcStatus, AsqStatus, IntStatus, Revision, RsqStatus, SameHeader, TuneStatus,
};
pub use transport::Transport;
pub use tuning::{band_channels, Channel, CHANNEL_SPACING, MAX_CHANNEL, MIN_CHANNEL};
