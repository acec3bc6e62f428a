//! SAME frame assembly
//!
//! The chip decodes SAME headers from the broadcast audio on its own and
//! buffers the result together with a 2-bit confidence score for every
//! byte. The [`SameAssembler`] polls that buffer, copies it out in
//! eight-byte windows, and decides whether the frame is trustworthy
//! enough to hand to the [decoder](crate::AlertRecord::from_frame).
//!
//! SAME headers are transmitted three times for redundancy. The
//! assembler counts header repeats so the third — and last — occurrence
//! can mark the frame for mandatory purge after use, which is the one
//! safe point to discard it.

use arrayvec::ArrayVec;

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::command::{CLRBUF, INTACK};
use crate::controller::{ChipController, ChipError};
use crate::message::{AlertDecodeErr, AlertRecord};
use crate::transport::Transport;

/// Maximum SAME frame length, in bytes
///
/// The capacity ceiling of the host-side receive buffer. The chip never
/// reports more than this.
pub const SAME_BUFFER_SIZE: usize = 255;

/// Minimum acceptable SAME frame length, in bytes
///
/// Shorter headers cannot carry a complete message and are discarded as
/// noise.
pub const SAME_MIN_LENGTH: usize = 36;

/// Per-byte confidence a frame must meet to be accepted
///
/// The chip reports confidence 0–3 for every byte. Values above the
/// threshold are clamped down to it before comparison; a single byte
/// below it rejects the whole frame. Must be 1, 2, or 3. Levels 2–3 are
/// stricter and historically unused.
pub const CONFIDENCE_THRESHOLD: u8 = 1;

// Printable range SAME messages use. The first byte outside it is
// treated as end of message.
const PRINTABLE: std::ops::RangeInclusive<u8> = 0x2B..=0x7F;

/// Outcome of one assembler poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamePoll {
    /// No header is ready; nothing was read and no state changed
    NoHeader,

    /// A header was signaled but its reported length is below
    /// [`SAME_MIN_LENGTH`]; discarded as noise
    TooShort,

    /// A frame was assembled but at least one byte fell below the
    /// confidence threshold; assembly state was reset to await a fresh
    /// header
    Rejected,

    /// A complete, sufficiently confident frame is available
    Ready,
}

/// Builds SAME frames from repeated chip polls
///
/// Owns the host-side receive buffer and its per-byte confidence
/// scores. All chip access goes through the
/// [`ChipController`] passed into [`poll`](SameAssembler::poll) and
/// [`flush`](SameAssembler::flush); the assembler itself never touches
/// the bus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SameAssembler {
    buffer: ArrayVec<u8, SAME_BUFFER_SIZE>,
    confidence: ArrayVec<u8, SAME_BUFFER_SIZE>,
    header_count: u8,
    read_cursor: usize,
    read_len: usize,
    available: bool,
    used: bool,
    parsed: bool,
    purge_pending: bool,
}

impl SameAssembler {
    /// New assembler with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll the chip's SAME status register and assemble the buffer
    ///
    /// `mode` is an acknowledge mode from [`crate::command`], usually
    /// [`INTACK`](crate::command::INTACK) to clear the SAME interrupt.
    ///
    /// If no header is ready this performs no buffer mutation. On
    /// header-ready, the chip's buffered bytes are copied out in
    /// eight-byte windows along with their confidence values. Assembly
    /// stops at the first byte outside the printable SAME range, which
    /// is treated as end of message. The finished frame is accepted
    /// only if every byte's confidence, clamped to
    /// [`CONFIDENCE_THRESHOLD`], still meets the threshold; otherwise
    /// the frame is dropped and the buffer reset.
    pub fn poll<T: Transport>(
        &mut self,
        chip: &mut ChipController<T>,
        mode: u8,
    ) -> Result<SamePoll, ChipError<T::Error>> {
        let header = chip.same_status(mode)?;
        if !header.header_ready {
            return Ok(SamePoll::NoHeader);
        }

        self.header_count = self.header_count.saturating_add(1);
        if self.header_count >= 3 {
            // third repeat is the last; safe to purge after use
            self.purge_pending = true;
        }

        if (header.length as usize) < SAME_MIN_LENGTH {
            debug!("same: discarded {}-byte header as noise", header.length);
            return Ok(SamePoll::TooShort);
        }

        let reported = usize::min(header.length as usize, SAME_BUFFER_SIZE);
        self.buffer.clear();
        self.confidence.clear();
        'windows: for base in (0..reported).step_by(8) {
            let (data, conf) = chip.same_window(base as u8)?;
            for (j, (&byte, &level)) in data.iter().zip(conf.iter()).enumerate() {
                if base + j >= reported {
                    break 'windows;
                }
                if !PRINTABLE.contains(&byte) {
                    // first invalid byte ends the message
                    break 'windows;
                }
                self.buffer.push(byte);
                self.confidence.push(level);
            }
        }

        for level in self.confidence.iter_mut() {
            if *level > CONFIDENCE_THRESHOLD {
                *level = CONFIDENCE_THRESHOLD;
            }
        }
        if let Some(pos) = self
            .confidence
            .iter()
            .position(|&level| level < CONFIDENCE_THRESHOLD)
        {
            debug!("same: rejected frame, low confidence at byte {}", pos);
            self.clear_frame();
            return Ok(SamePoll::Rejected);
        }

        self.available = true;
        self.used = false;
        self.parsed = false;
        self.read_cursor = 0;
        self.read_len = self.buffer.len();
        debug!("same: frame of {} bytes available", self.read_len);
        Ok(SamePoll::Ready)
    }

    /// Is an accepted frame available for reading or parsing?
    pub fn available(&self) -> bool {
        self.available
    }

    /// Count of unread bytes remaining in the available frame
    pub fn remaining(&self) -> usize {
        self.read_len - self.read_cursor
    }

    /// Consume one byte from the front of the available frame
    ///
    /// Returns `None` once the frame is exhausted, at which point the
    /// frame is marked used and the read window reset. The frame's
    /// contents remain parseable until the next poll or flush.
    pub fn read(&mut self) -> Option<u8> {
        if self.read_cursor < self.read_len {
            let byte = self.buffer[self.read_cursor];
            self.read_cursor += 1;
            Some(byte)
        } else {
            self.read_cursor = 0;
            self.read_len = 0;
            self.used = true;
            None
        }
    }

    /// Decode the available frame into an [`AlertRecord`]
    ///
    /// On success the frame is marked used and parsed; the caller is
    /// expected to [`flush`](SameAssembler::flush) afterwards. A frame
    /// that cannot be decoded is discarded and the assembler resets to
    /// await a fresh header; no partial record is ever produced.
    pub fn parse(&mut self) -> Result<AlertRecord, AlertDecodeErr> {
        if !self.available {
            return Err(AlertDecodeErr::NotAvailable);
        }
        match AlertRecord::from_frame(&self.buffer) {
            Ok(record) => {
                self.used = true;
                self.parsed = true;
                Ok(record)
            }
            Err(err) => {
                debug!("same: discarding undecodable frame: {}", err);
                self.clear_frame();
                Err(err)
            }
        }
    }

    /// Flush host and chip receive state
    ///
    /// Clears the local buffer, cursors, header counters, and flags,
    /// and issues a clear-buffer-and-acknowledge to the chip so its
    /// accumulation state matches the host's. Idempotent.
    pub fn flush<T: Transport>(
        &mut self,
        chip: &mut ChipController<T>,
    ) -> Result<(), ChipError<T::Error>> {
        chip.same_status(CLRBUF | INTACK)?;
        self.clear();
        Ok(())
    }

    /// Clear host-side state only, leaving the chip untouched
    pub fn clear(&mut self) {
        self.clear_frame();
        self.header_count = 0;
        self.used = false;
        self.parsed = false;
        self.purge_pending = false;
    }

    /// Inject a synthetic frame, bypassing the chip
    ///
    /// Test support: loads up to [`SAME_BUFFER_SIZE`] bytes of `text`
    /// with every byte's confidence forced to the accept threshold, and
    /// marks the frame available.
    pub fn fill(&mut self, text: &str) {
        self.clear();
        for &byte in text.as_bytes().iter().take(SAME_BUFFER_SIZE) {
            self.buffer.push(byte);
            self.confidence.push(CONFIDENCE_THRESHOLD);
        }
        self.available = true;
        self.read_len = self.buffer.len();
    }

    /// Headers seen for the current message, including repeats
    pub fn header_count(&self) -> u8 {
        self.header_count
    }

    /// The third header repeat has been seen; the frame must be purged
    /// after use
    pub fn purge_pending(&self) -> bool {
        self.purge_pending
    }

    /// Has the frame been consumed (fully read or parsed)?
    pub fn used(&self) -> bool {
        self.used
    }

    /// Has the frame been successfully parsed?
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Raw bytes of the assembled frame
    pub fn frame(&self) -> &[u8] {
        &self.buffer
    }

    fn clear_frame(&mut self) {
        self.buffer.clear();
        self.confidence.clear();
        self.read_cursor = 0;
        self.read_len = 0;
        self.available = false;
    }
}
