//! Chip command sequencing
//!
//! [`ChipController`] is the only part of the crate that touches the
//! [`Transport`]. It translates high-level intents into command writes
//! and burst reads, inserts the settle delay mandated for each command,
//! and tracks the chip's power and tuning state.
//!
//! The controller is single-owner and non-reentrant: every operation
//! blocks for its bus transaction plus settle time, and nothing here is
//! cancellable mid-transaction. Any locking discipline belongs to the
//! embedding application.

use log::{debug, trace};
use thiserror::Error;

use crate::command::*;
use crate::patch::PATCH_FRAME_LEN;
use crate::status::{AgcStatus, AsqStatus, IntStatus, Revision, RsqStatus, SameHeader, TuneStatus};
use crate::transport::Transport;
use crate::tuning::{band_channels, Channel, MIN_CHANNEL};

/// Highest accepted volume level.
pub const MAX_VOLUME: u8 = 0x3F;

/// Controller-level failure
///
/// Out-of-range inputs (frequency, volume) are deliberately *not*
/// errors: those operations are silent no-ops, matching the chip
/// vendor's reference driver. Protocol-level trouble surfaces either
/// here or in the error bit of the returned status snapshot.
#[derive(Debug, Error)]
pub enum ChipError<E>
where
    E: std::error::Error + 'static,
{
    /// Bus transaction failed
    #[error("bus transport error")]
    Bus(#[source] E),

    /// The operation requires the chip to be powered up
    #[error("chip is powered down")]
    PoweredDown,

    /// The patch blob is not a whole number of eight-byte frames
    #[error("patch length {0} is not a multiple of 8 bytes")]
    PatchLength(usize),

    /// The chip raised the error interrupt while accepting a patch
    /// frame. The upload is not retried automatically.
    #[error("chip rejected patch frame {0}")]
    PatchRejected(usize),
}

impl<E> From<E> for ChipError<E>
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        ChipError::Bus(err)
    }
}

/// Host-side view of the chip's state
///
/// Owned exclusively by the [`ChipController`] and mutated only through
/// its operations. Created unpowered; invalidated again at power-down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipState {
    power: bool,
    mute: bool,
    channel: Channel,
    volume: u8,
    valid: bool,
    afc_railed: bool,
    tune_pending: bool,
}

impl ChipState {
    fn new() -> Self {
        Self {
            power: false,
            mute: false,
            channel: MIN_CHANNEL,
            volume: MAX_VOLUME,
            valid: false,
            afc_railed: false,
            tune_pending: false,
        }
    }

    /// Is the chip powered up?
    pub fn powered(&self) -> bool {
        self.power
    }

    /// Is the audio output muted?
    pub fn muted(&self) -> bool {
        self.mute
    }

    /// Channel last tuned or reported by a tune status query
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Volume level last accepted by [`ChipController::set_volume`]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Did the last tune status query report a valid channel?
    pub fn channel_valid(&self) -> bool {
        self.valid
    }

    /// Did the last tune status query report the AFC on its rail?
    pub fn afc_railed(&self) -> bool {
        self.afc_railed
    }

    /// A tune has been issued whose status has not been read yet
    pub fn tune_pending(&self) -> bool {
        self.tune_pending
    }
}

/// Accept/reject decision for a volume level
///
/// [`ChipController::set_volume`] silently ignores levels this function
/// rejects.
pub fn volume_in_range(level: u8) -> bool {
    level <= MAX_VOLUME
}

/// Drives the receiver chip over a [`Transport`]
pub struct ChipController<T: Transport> {
    bus: T,
    state: ChipState,
}

impl<T: Transport> ChipController<T> {
    /// New controller over the given bus, chip assumed unpowered
    pub fn new(bus: T) -> Self {
        Self {
            bus,
            state: ChipState::new(),
        }
    }

    /// Current host-side chip state
    pub fn state(&self) -> &ChipState {
        &self.state
    }

    /// Destroy the controller and release the bus
    pub fn release(self) -> T {
        self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    /// Pulse the reset line, leaving the chip in a known unpowered state
    ///
    /// Idempotent; may be called at any time.
    pub fn reset(&mut self) -> Result<(), ChipError<T::Error>> {
        self.bus.set_reset(false)?;
        self.bus.delay(CMD_SETTLE);
        self.bus.set_reset(true)?;
        self.bus.delay(CMD_SETTLE);
        self.state = ChipState::new();
        Ok(())
    }

    /// Power up into weather-band receive mode
    ///
    /// No-op if already powered. With `with_patch`, the power-up is
    /// issued with the patch-enable flag and the bundled
    /// [calibration patch](crate::patch::FALSE_DETECT_PATCH) is
    /// uploaded before the chip is considered ready. A patch failure
    /// leaves the chip powered but uncalibrated; retrying is the
    /// caller's decision.
    pub fn power_up(&mut self, with_patch: bool) -> Result<(), ChipError<T::Error>> {
        if self.state.power {
            return Ok(());
        }

        let mut flags = GPO2EN | XOSCEN | FUNC_WB;
        if with_patch {
            flags |= PATCH;
        }
        self.bus.write(&[POWER_UP, flags, OPMODE_ANALOG])?;
        self.bus.delay(POWER_UP_SETTLE);

        let status = self.read_status()?;
        trace!("power up: status {:#04x}", status.raw());
        self.state.power = true;

        if with_patch {
            self.load_patch(crate::patch::FALSE_DETECT_PATCH)?;
        }
        Ok(())
    }

    /// Stream a calibration patch to the chip in eight-byte frames
    ///
    /// The blob is opaque; only its framing is validated. Each frame is
    /// followed by a settle delay and a status read, and an error
    /// interrupt aborts the upload without retry.
    pub fn load_patch(&mut self, blob: &[u8]) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        if blob.len() % PATCH_FRAME_LEN != 0 {
            return Err(ChipError::PatchLength(blob.len()));
        }

        for (n, frame) in blob.chunks_exact(PATCH_FRAME_LEN).enumerate() {
            self.bus.write(frame)?;
            self.bus.delay(PROP_SETTLE);
            if self.read_status()?.error() {
                return Err(ChipError::PatchRejected(n));
            }
        }
        debug!("patch: uploaded {} frames", blob.len() / PATCH_FRAME_LEN);
        Ok(())
    }

    /// Power the chip down
    ///
    /// No-op if already off.
    pub fn power_down(&mut self) -> Result<(), ChipError<T::Error>> {
        if !self.state.power {
            return Ok(());
        }
        self.write_command(POWER_DOWN)?;
        self.state = ChipState::new();
        Ok(())
    }

    /// Tune to a frequency given in kHz
    ///
    /// Frequencies outside the weather band or off the 25 kHz channel
    /// grid are silently ignored; see [`Channel::from_khz`]. There is
    /// no rounding to the nearest channel.
    pub fn tune_khz(&mut self, khz: u32) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        match Channel::from_khz(khz) {
            Some(channel) => self.tune(channel),
            None => {
                debug!("tune: rejected {} kHz (out of band or off grid)", khz);
                Ok(())
            }
        }
    }

    /// Tune to a channel
    ///
    /// Blocks for the tune settle time. Afterwards a tune status is
    /// pending; retrieve it with [`ChipController::tune_status`].
    pub fn tune(&mut self, channel: Channel) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_word(WB_TUNE_FREQ, channel.raw())?;
        self.bus.delay(TUNE_SETTLE);
        self.state.channel = channel;
        self.state.tune_pending = true;
        Ok(())
    }

    /// Sweep the band and settle on the strongest channel
    ///
    /// Mutes audio, tunes every channel in the band recording the best
    /// reported RSSI, re-tunes to the winner, and un-mutes. The sweep
    /// is blocking and atomic from the caller's perspective. If no
    /// channel reports a non-zero RSSI, the first channel in the band
    /// wins.
    pub fn scan(&mut self) -> Result<Channel, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.set_mute(true)?;

        let mut best = MIN_CHANNEL;
        let mut best_rssi = 0u8;
        for channel in band_channels() {
            self.tune(channel)?;
            let status = self.tune_status(INTACK)?;
            trace!("scan: {} rssi {}", status.channel, status.rssi);
            if status.rssi > best_rssi {
                best_rssi = status.rssi;
                best = status.channel;
            }
        }
        debug!("scan: best {} rssi {}", best, best_rssi);

        self.tune(best)?;
        self.set_mute(false)?;
        Ok(best)
    }

    /// Read the interrupt status bits
    pub fn int_status(&mut self) -> Result<IntStatus, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_command(GET_INT_STATUS)?;
        self.read_status()
    }

    /// Query the result of the previous tune
    ///
    /// `mode` is one of the acknowledge modes in [`crate::command`]:
    /// [`CHECK`] leaves the tune-complete interrupt set, [`INTACK`]
    /// clears it. Updates the host-side channel/valid/AFC state from
    /// the chip's answer.
    pub fn tune_status(&mut self, mode: u8) -> Result<TuneStatus, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_byte(WB_TUNE_STATUS, mode)?;
        let resp: [u8; 6] = self.read_response()?;
        let status = TuneStatus::from_response(&resp);

        self.state.channel = status.channel;
        self.state.valid = status.valid;
        self.state.afc_railed = status.afc_railed;
        self.state.tune_pending = false;
        Ok(status)
    }

    /// Query received signal quality
    pub fn rsq_status(&mut self, mode: u8) -> Result<RsqStatus, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_byte(WB_RSQ_STATUS, mode)?;
        let resp: [u8; 8] = self.read_response()?;
        Ok(RsqStatus::from_response(&resp))
    }

    /// Query 1050 Hz alert tone status
    pub fn asq_status(&mut self, mode: u8) -> Result<AsqStatus, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_byte(WB_ASQ_STATUS, mode)?;
        let resp: [u8; 3] = self.read_response()?;
        Ok(AsqStatus::from_response(&resp))
    }

    /// Query AGC status
    pub fn agc_status(&mut self) -> Result<AgcStatus, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_command(WB_AGC_STATUS)?;
        let resp: [u8; 2] = self.read_response()?;
        Ok(AgcStatus::from_response(&resp))
    }

    /// Query device revision information
    pub fn revision(&mut self) -> Result<Revision, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_command(GET_REV)?;
        let resp: [u8; 9] = self.read_response()?;
        Ok(Revision::from_response(&resp))
    }

    /// Set the audio volume, 0–63
    ///
    /// Out-of-range levels are silently ignored; see
    /// [`volume_in_range`].
    pub fn set_volume(&mut self, level: u8) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        if !volume_in_range(level) {
            debug!("volume: rejected level {}", level);
            return Ok(());
        }
        self.set_property(RX_VOLUME, level as u16)?;
        self.state.volume = level;
        Ok(())
    }

    /// Hard-mute or un-mute the audio output
    pub fn set_mute(&mut self, on: bool) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        self.set_property(RX_HARD_MUTE, if on { 0x0003 } else { 0x0000 })?;
        self.state.mute = on;
        Ok(())
    }

    /// Write a 16-bit property
    pub fn set_property(&mut self, property: u16, value: u16) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        let [ph, pl] = property.to_be_bytes();
        let [vh, vl] = value.to_be_bytes();
        self.bus.write(&[SET_PROPERTY, 0x00, ph, pl, vh, vl])?;
        self.bus.delay(PROP_SETTLE);
        Ok(())
    }

    /// Read a 16-bit property
    pub fn property(&mut self, property: u16) -> Result<u16, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_word(GET_PROPERTY, property)?;
        let resp: [u8; 4] = self.read_response()?;
        Ok(u16::from_be_bytes([resp[2], resp[3]]))
    }

    /// Configure GPO pins as outputs or Hi-Z
    pub fn gpio_control(&mut self, value: u8) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_byte(GPIO_CTL, value)
    }

    /// Set GPO output levels
    pub fn gpio_set(&mut self, value: u8) -> Result<(), ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_byte(GPIO_SET, value)
    }

    /// Read the SAME decoder status, optionally acknowledging
    /// interrupts or clearing the chip's buffer per `mode`
    pub(crate) fn same_status(&mut self, mode: u8) -> Result<SameHeader, ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_same_address(mode, 0)?;
        let resp: [u8; 4] = self.read_response()?;
        Ok(SameHeader::from_response(&resp))
    }

    /// Read one eight-byte window of SAME data starting at `offset`,
    /// returning the data bytes and their unpacked confidence values
    pub(crate) fn same_window(
        &mut self,
        offset: u8,
    ) -> Result<([u8; 8], [u8; 8]), ChipError<T::Error>> {
        self.ensure_powered()?;
        self.write_same_address(CHECK, offset)?;
        let resp: [u8; 14] = self.read_response()?;

        let mut data = [0u8; 8];
        data.copy_from_slice(&resp[6..14]);

        // two 2-bit confidence values per nibble: byte 5 covers window
        // bytes 0..4, byte 4 covers window bytes 4..8
        let mut conf = [0u8; 8];
        for j in 0..4 {
            conf[j] = (resp[5] >> (2 * j)) & 0x03;
            conf[4 + j] = (resp[4] >> (2 * j)) & 0x03;
        }
        Ok((data, conf))
    }

    fn ensure_powered(&self) -> Result<(), ChipError<T::Error>> {
        if self.state.power {
            Ok(())
        } else {
            Err(ChipError::PoweredDown)
        }
    }

    fn write_command(&mut self, command: u8) -> Result<(), ChipError<T::Error>> {
        self.bus.write(&[command])?;
        self.bus.delay(CMD_SETTLE);
        Ok(())
    }

    fn write_byte(&mut self, command: u8, value: u8) -> Result<(), ChipError<T::Error>> {
        self.bus.write(&[command, value])?;
        self.bus.delay(CMD_SETTLE);
        Ok(())
    }

    fn write_word(&mut self, command: u8, value: u16) -> Result<(), ChipError<T::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.bus.write(&[command, 0x00, hi, lo])?;
        self.bus.delay(CMD_SETTLE);
        Ok(())
    }

    fn write_same_address(&mut self, mode: u8, address: u8) -> Result<(), ChipError<T::Error>> {
        self.bus.write(&[WB_SAME_STATUS, mode, address])?;
        self.bus.delay(SAME_SETTLE);
        Ok(())
    }

    fn read_status(&mut self) -> Result<IntStatus, ChipError<T::Error>> {
        let mut buf = [0u8; 1];
        self.bus.read(&mut buf)?;
        self.bus.delay(CMD_SETTLE);
        Ok(IntStatus::from_raw(buf[0]))
    }

    fn read_response<const N: usize>(&mut self) -> Result<[u8; N], ChipError<T::Error>> {
        let mut buf = [0u8; N];
        self.bus.read(&mut buf)?;
        self.bus.delay(CMD_SETTLE);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::transport::sim::ChipSim;

    fn powered_controller() -> ChipController<ChipSim> {
        let mut ctl = ChipController::new(ChipSim::new());
        ctl.power_up(false).unwrap();
        ctl
    }

    #[test]
    fn test_operations_fail_fast_while_unpowered() {
        let mut ctl = ChipController::new(ChipSim::new());
        assert!(matches!(ctl.tune_khz(162_400), Err(ChipError::PoweredDown)));
        assert!(matches!(ctl.scan(), Err(ChipError::PoweredDown)));
        assert!(matches!(ctl.set_volume(10), Err(ChipError::PoweredDown)));
        assert!(matches!(ctl.int_status(), Err(ChipError::PoweredDown)));
        assert!(matches!(
            ctl.property(RX_VOLUME),
            Err(ChipError::PoweredDown)
        ));
        // power_down without power is a no-op, not an error
        ctl.power_down().unwrap();
    }

    #[test]
    fn test_power_cycle() {
        let mut ctl = ChipController::new(ChipSim::new());
        ctl.power_up(false).unwrap();
        assert!(ctl.state().powered());
        assert!(ctl.bus_mut().powered);
        // power-up settle time was waited out
        assert!(ctl.bus_mut().elapsed >= Duration::from_millis(200));

        // second power-up is a no-op: no further delay accrues
        let before = ctl.bus_mut().elapsed;
        ctl.power_up(false).unwrap();
        assert_eq!(before, ctl.bus_mut().elapsed);

        ctl.power_down().unwrap();
        assert!(!ctl.state().powered());
        assert!(!ctl.release().powered);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut ctl = powered_controller();
        ctl.reset().unwrap();
        assert!(!ctl.state().powered());
        ctl.reset().unwrap();
        assert!(!ctl.state().powered());
        assert!(ctl.release().reset_line);
    }

    #[test]
    fn test_power_up_with_patch_streams_all_frames() {
        let mut ctl = ChipController::new(ChipSim::new());
        ctl.power_up(true).unwrap();
        assert!(ctl.state().powered());
        assert_eq!(
            ctl.release().patch_frames,
            crate::patch::FALSE_DETECT_PATCH.len() / PATCH_FRAME_LEN
        );
    }

    #[test]
    fn test_patch_error_interrupt_aborts_upload() {
        let mut sim = ChipSim::new();
        sim.error_status = true;
        let mut ctl = ChipController::new(sim);
        assert!(matches!(
            ctl.power_up(true),
            Err(ChipError::PatchRejected(0))
        ));
        // chip is powered but uncalibrated; the caller decides on retry
        assert!(ctl.state().powered());
    }

    #[test]
    fn test_patch_length_must_be_whole_frames() {
        let mut ctl = powered_controller();
        assert!(matches!(
            ctl.load_patch(&[0x15, 0x00, 0x00]),
            Err(ChipError::PatchLength(3))
        ));
    }

    #[test]
    fn test_tune_and_read_status() {
        let mut ctl = powered_controller();
        ctl.bus_mut().signal = |_| 22;

        ctl.tune_khz(162_400).unwrap();
        assert!(ctl.state().tune_pending());
        assert_eq!(ctl.state().channel(), MIN_CHANNEL);

        let status = ctl.tune_status(INTACK).unwrap();
        assert!(!status.int.error());
        assert_eq!(status.channel, MIN_CHANNEL);
        assert_eq!(status.channel.raw(), 0xFDC0);
        assert_eq!(status.rssi, 22);
        assert!(!ctl.state().tune_pending());
        assert!(ctl.state().channel_valid());
    }

    #[test]
    fn test_tune_rejects_invalid_frequency() {
        let mut ctl = powered_controller();
        ctl.tune_khz(162_450).unwrap();
        let tuned = ctl.state().channel();

        // off-grid and out-of-band requests leave the channel unchanged
        ctl.tune_khz(162_410).unwrap();
        assert_eq!(ctl.state().channel(), tuned);
        ctl.tune_khz(162_551).unwrap();
        assert_eq!(ctl.state().channel(), tuned);
        ctl.tune_khz(88_500).unwrap();
        assert_eq!(ctl.state().channel(), tuned);
    }

    #[test]
    fn test_scan_finds_strongest_channel() {
        let mut ctl = powered_controller();
        ctl.bus_mut().signal = |ch| if ch == 0xFDD4 { 40 } else { 10 };

        let best = ctl.scan().unwrap();
        assert_eq!(best, Channel::from_khz(162_450).unwrap());
        assert_eq!(ctl.state().channel(), best);
        // audio is un-muted after the sweep
        assert!(!ctl.state().muted());
        assert_eq!(ctl.release().properties.get(&RX_HARD_MUTE), Some(&0));
    }

    #[test]
    fn test_scan_with_no_signal_falls_back_to_first_channel() {
        let mut ctl = powered_controller();
        let best = ctl.scan().unwrap();
        assert_eq!(best, MIN_CHANNEL);
        assert_eq!(ctl.state().channel(), MIN_CHANNEL);
    }

    #[test]
    fn test_set_volume_ignores_out_of_range() {
        let mut ctl = powered_controller();
        ctl.set_volume(64).unwrap();
        assert_eq!(ctl.state().volume(), MAX_VOLUME);
        assert!(!ctl.bus_mut().properties.contains_key(&RX_VOLUME));

        ctl.set_volume(40).unwrap();
        assert_eq!(ctl.state().volume(), 40);
        assert_eq!(ctl.release().properties.get(&RX_VOLUME), Some(&40));
    }

    #[test]
    fn test_volume_in_range() {
        assert!(volume_in_range(0));
        assert!(volume_in_range(63));
        assert!(!volume_in_range(64));
        assert!(!volume_in_range(255));
    }

    #[test]
    fn test_property_round_trip() {
        let mut ctl = powered_controller();
        ctl.set_property(WB_VALID_SNR_THRESHOLD, 0x1234).unwrap();
        assert_eq!(ctl.property(WB_VALID_SNR_THRESHOLD).unwrap(), 0x1234);
    }

    #[test]
    fn test_rsq_status_freq_offset() {
        let mut ctl = powered_controller();
        ctl.bus_mut().freq_offset_raw = 0xFF;
        let rsq = ctl.rsq_status(CHECK).unwrap();
        assert_eq!(rsq.freq_offset, -1);
    }

    #[test]
    fn test_revision() {
        let mut ctl = powered_controller();
        let rev = ctl.revision().unwrap();
        assert_eq!(rev.part_number, 7);
        assert_eq!(rev.patch_id, 0xD195);
    }
}
