//! Decoded status snapshots
//!
//! Every status query returns a burst of response bytes. The types here
//! are read-only decodes of one such burst: each query replaces the whole
//! snapshot, never part of it. The caller owns the snapshot it asked for.

use crate::tuning::Channel;

const STCINT: u8 = 0x01;
const ASQINT: u8 = 0x02;
const SAMEINT: u8 = 0x04;
const RSQINT: u8 = 0x08;
const ERRINT: u8 = 0x40;
const CTSINT: u8 = 0x80;

const VALID: u8 = 0x01;
const AFCRL: u8 = 0x02;

const RSSILINT: u8 = 0x01;
const RSSIHINT: u8 = 0x02;
const SNRLINT: u8 = 0x04;
const SNRHINT: u8 = 0x08;

const HDRRDY: u8 = 0x01;
const PREDET: u8 = 0x02;
const SOMDET: u8 = 0x04;
const EOMDET: u8 = 0x08;

const ALERTON: u8 = 0x01;
const ALERTOF: u8 = 0x02;
const ALERT: u8 = 0x01;

const AGCDIS: u8 = 0x01;

/// Interrupt status bits
///
/// The first byte of every response. Also returned on its own by
/// [`ChipController::int_status`](crate::ChipController::int_status).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntStatus(u8);

impl IntStatus {
    pub const fn from_raw(raw: u8) -> Self {
        IntStatus(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Clear to send: the chip is ready for another command
    pub const fn clear_to_send(self) -> bool {
        self.0 & CTSINT != 0
    }

    /// Error interrupt: the last command was rejected
    pub const fn error(self) -> bool {
        self.0 & ERRINT != 0
    }

    /// Seek/tune complete
    pub const fn tune_complete(self) -> bool {
        self.0 & STCINT != 0
    }

    /// 1050 Hz alert tone interrupt
    pub const fn alert_tone(self) -> bool {
        self.0 & ASQINT != 0
    }

    /// SAME decoder interrupt
    pub const fn same(self) -> bool {
        self.0 & SAMEINT != 0
    }

    /// Received signal quality interrupt
    pub const fn signal_quality(self) -> bool {
        self.0 & RSQINT != 0
    }
}

/// Result of the previous tune command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuneStatus {
    pub int: IntStatus,
    /// Channel meets the valid-channel RSSI/SNR thresholds
    pub valid: bool,
    /// AFC correction has hit its rail
    pub afc_railed: bool,
    /// Channel the chip is actually tuned to
    pub channel: Channel,
    /// Received signal strength, 0–127
    pub rssi: u8,
    /// Signal-to-noise ratio, 0–127
    pub snr: u8,
}

impl TuneStatus {
    pub(crate) fn from_response(resp: &[u8; 6]) -> Self {
        Self {
            int: IntStatus(resp[0]),
            valid: resp[1] & VALID != 0,
            afc_railed: resp[1] & AFCRL != 0,
            channel: Channel::from_raw(u16::from_be_bytes([resp[2], resp[3]])),
            rssi: resp[4],
            snr: resp[5],
        }
    }
}

/// Received signal quality of the current channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RsqStatus {
    pub int: IntStatus,
    pub rssi_low: bool,
    pub rssi_high: bool,
    pub snr_low: bool,
    pub snr_high: bool,
    pub rssi: u8,
    pub snr: u8,
    /// Signed frequency offset from the tuned channel, in units of
    /// half the reported register value
    pub freq_offset: i8,
}

impl RsqStatus {
    pub(crate) fn from_response(resp: &[u8; 8]) -> Self {
        Self {
            int: IntStatus(resp[0]),
            rssi_low: resp[1] & RSSILINT != 0,
            rssi_high: resp[1] & RSSIHINT != 0,
            snr_low: resp[1] & SNRLINT != 0,
            snr_high: resp[1] & SNRHINT != 0,
            rssi: resp[4],
            snr: resp[5],
            freq_offset: (resp[7] as i8) >> 1,
        }
    }
}

/// 1050 Hz alert tone status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsqStatus {
    pub int: IntStatus,
    /// Tone-on edge seen since the last tune
    pub tone_on: bool,
    /// Tone-off edge seen since the last tune
    pub tone_off: bool,
    /// Tone is present right now
    pub tone_present: bool,
}

impl AsqStatus {
    pub(crate) fn from_response(resp: &[u8; 3]) -> Self {
        Self {
            int: IntStatus(resp[0]),
            tone_on: resp[1] & ALERTON != 0,
            tone_off: resp[1] & ALERTOF != 0,
            tone_present: resp[2] & ALERT != 0,
        }
    }
}

/// Automatic gain control status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgcStatus {
    pub int: IntStatus,
    pub agc_disabled: bool,
}

impl AgcStatus {
    pub(crate) fn from_response(resp: &[u8; 2]) -> Self {
        Self {
            int: IntStatus(resp[0]),
            agc_disabled: resp[1] & AGCDIS != 0,
        }
    }
}

/// SAME decoder status for the current channel
///
/// Reports decoder progress; the buffered bytes themselves are read
/// separately in eight-byte windows by the
/// [`SameAssembler`](crate::SameAssembler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SameHeader {
    pub int: IntStatus,
    /// A complete header is buffered and ready to be read out
    pub header_ready: bool,
    pub preamble_detected: bool,
    pub start_of_message: bool,
    pub end_of_message: bool,
    /// Raw decoder state machine value
    pub state: u8,
    /// Bytes currently buffered by the chip
    pub length: u8,
}

impl SameHeader {
    pub(crate) fn from_response(resp: &[u8; 4]) -> Self {
        Self {
            int: IntStatus(resp[0]),
            header_ready: resp[1] & HDRRDY != 0,
            preamble_detected: resp[1] & PREDET != 0,
            start_of_message: resp[1] & SOMDET != 0,
            end_of_message: resp[1] & EOMDET != 0,
            state: resp[2],
            length: resp[3],
        }
    }
}

/// Device revision information
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Revision {
    /// Part number suffix (e.g. 7 for the xx07)
    pub part_number: u8,
    /// Firmware revision, major then minor
    pub firmware: (u8, u8),
    /// Identifier of the applied patch, if any
    pub patch_id: u16,
    /// Component firmware revision, major then minor
    pub component: (u8, u8),
    /// Chip mask revision
    pub chip_rev: u8,
}

impl Revision {
    pub(crate) fn from_response(resp: &[u8; 9]) -> Self {
        Self {
            part_number: resp[1],
            firmware: (resp[2], resp[3]),
            patch_id: u16::from_be_bytes([resp[4], resp[5]]),
            component: (resp[6], resp[7]),
            chip_rev: resp[8],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_status_bits() {
        let st = IntStatus::from_raw(0x80 | 0x40 | 0x04);
        assert!(st.clear_to_send());
        assert!(st.error());
        assert!(st.same());
        assert!(!st.tune_complete());
        assert!(!st.alert_tone());
        assert!(!st.signal_quality());
    }

    #[test]
    fn test_tune_status_decode() {
        let st = TuneStatus::from_response(&[0x81, 0x01, 0xFD, 0xC0, 35, 20]);
        assert!(st.int.tune_complete());
        assert!(st.valid);
        assert!(!st.afc_railed);
        assert_eq!(st.channel.as_khz(), 162_400);
        assert_eq!(st.rssi, 35);
        assert_eq!(st.snr, 20);
    }

    #[test]
    fn test_rsq_freq_offset_is_signed() {
        let neg = RsqStatus::from_response(&[0x80, 0, 0, 0, 10, 5, 0, 0xFF]);
        assert_eq!(neg.freq_offset, -1);

        let railed = RsqStatus::from_response(&[0x80, 0, 0, 0, 10, 5, 0, 0x80]);
        assert_eq!(railed.freq_offset, -64);

        let pos = RsqStatus::from_response(&[0x80, 0, 0, 0, 10, 5, 0, 0x04]);
        assert_eq!(pos.freq_offset, 2);
    }

    #[test]
    fn test_same_header_decode() {
        let st = SameHeader::from_response(&[0x84, 0x03, 2, 42]);
        assert!(st.header_ready);
        assert!(st.preamble_detected);
        assert!(!st.end_of_message);
        assert_eq!(st.state, 2);
        assert_eq!(st.length, 42);
    }

    #[test]
    fn test_revision_decode() {
        let rev = Revision::from_response(&[0x80, 7, 0x42, 0x30, 0xD1, 0x95, 0x42, 0x30, 0x80]);
        assert_eq!(rev.part_number, 7);
        assert_eq!(rev.firmware, (0x42, 0x30));
        assert_eq!(rev.patch_id, 0xD195);
        assert_eq!(rev.chip_rev, 0x80);
    }
}
