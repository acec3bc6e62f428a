//! Bus transport contract
//!
//! The controller speaks to the chip through a [`Transport`]: one command
//! write followed by one burst read per transaction. The transport
//! guarantees byte ordering within a transaction but nothing across
//! transactions; the controller is responsible for separating them with
//! the settle delays in [`crate::command`].

use std::error::Error;
use std::time::Duration;

/// Byte-level access to the receiver chip
///
/// Implementations wrap whatever physical bus the chip hangs off of
/// (typically I²C) plus the dedicated reset line. Every method is a
/// discrete, blocking operation; the core never pipelines.
pub trait Transport {
    /// Bus-level failure
    type Error: Error + 'static;

    /// Write one command byte sequence as a single bus transaction
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Burst-read `buf.len()` response bytes as a single bus transaction
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Drive the chip's reset line to the given level
    fn set_reset(&mut self, level: bool) -> Result<(), Self::Error>;

    /// Block the calling context for the given settle time
    fn delay(&mut self, interval: Duration);
}
