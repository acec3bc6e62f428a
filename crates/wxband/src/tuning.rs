//! Channel units and band limits
//!
//! The chip tunes in units of 2.5 kHz. The seven US weather-band
//! channels lie between 162.400 MHz and 162.550 MHz on a 25 kHz grid.

use std::fmt;

/// Channel spacing, in channel units (25 kHz).
pub const CHANNEL_SPACING: u16 = 10;

/// Lowest weather-band channel: 162.400 MHz.
pub const MIN_CHANNEL: Channel = Channel(0xFDC0);

/// Highest weather-band channel: 162.550 MHz.
pub const MAX_CHANNEL: Channel = Channel(0xFDFC);

/// A tuning frequency in the chip's internal channel units
///
/// One channel unit is 2.5 kHz. Channels are constructed from a
/// frequency in kHz via [`Channel::from_khz`], which admits only
/// frequencies inside the weather band and aligned to the 25 kHz
/// channel grid. The raw unit value is what goes over the wire in a
/// tune command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u16);

impl Channel {
    /// Construct from a raw channel-unit value, unvalidated
    ///
    /// Used when decoding a tune status response, which reports
    /// whatever the chip is actually tuned to.
    pub const fn from_raw(raw: u16) -> Self {
        Channel(raw)
    }

    /// Construct from a frequency in kHz
    ///
    /// Returns `None` if the frequency lies outside
    /// [162400 kHz, 162550 kHz] or is not aligned to the 25 kHz
    /// channel grid. There is no rounding: an off-grid request is
    /// rejected outright.
    pub fn from_khz(khz: u32) -> Option<Self> {
        if !(MIN_CHANNEL.as_khz()..=MAX_CHANNEL.as_khz()).contains(&khz) {
            return None;
        }
        if (khz - MIN_CHANNEL.as_khz()) % 25 != 0 {
            return None;
        }
        // khz is a multiple of 25, so 2*khz/5 is exact
        Some(Channel((khz * 2 / 5) as u16))
    }

    /// Raw channel-unit value, as sent in a tune command
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Frequency in kHz
    pub const fn as_khz(self) -> u32 {
        self.0 as u32 * 5 / 2
    }

    /// Frequency in MHz
    ///
    /// Lossy conversion for display and signal-quality reporting.
    /// Exact arithmetic should use [`Channel::as_khz`].
    pub fn as_mhz(self) -> f32 {
        self.0 as f32 * 0.0025
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} MHz", self.as_mhz())
    }
}

/// Iterator over every channel in the band, lowest first
pub fn band_channels() -> impl Iterator<Item = Channel> {
    (MIN_CHANNEL.raw()..=MAX_CHANNEL.raw())
        .step_by(CHANNEL_SPACING as usize)
        .map(Channel)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_band_limits() {
        assert_eq!(MIN_CHANNEL.as_khz(), 162_400);
        assert_eq!(MAX_CHANNEL.as_khz(), 162_550);
        assert_approx_eq!(MIN_CHANNEL.as_mhz(), 162.400, 1e-4);
        assert_approx_eq!(MAX_CHANNEL.as_mhz(), 162.550, 1e-4);
    }

    #[test]
    fn test_from_khz_accepts_grid() {
        for (khz, raw) in [
            (162_400u32, 0xFDC0u16),
            (162_425, 0xFDCA),
            (162_450, 0xFDD4),
            (162_475, 0xFDDE),
            (162_500, 0xFDE8),
            (162_525, 0xFDF2),
            (162_550, 0xFDFC),
        ] {
            let ch = Channel::from_khz(khz).expect("in-band channel rejected");
            assert_eq!(ch.raw(), raw);
            assert_eq!(ch.as_khz(), khz);
        }
    }

    #[test]
    fn test_from_khz_rejects_out_of_band() {
        assert_eq!(Channel::from_khz(162_375), None);
        assert_eq!(Channel::from_khz(162_575), None);
        assert_eq!(Channel::from_khz(0), None);
        assert_eq!(Channel::from_khz(88_500), None);
    }

    #[test]
    fn test_from_khz_rejects_off_grid() {
        assert_eq!(Channel::from_khz(162_410), None);
        assert_eq!(Channel::from_khz(162_401), None);
        assert_eq!(Channel::from_khz(162_549), None);
    }

    #[test]
    fn test_band_channels() {
        let all: Vec<Channel> = band_channels().collect();
        assert_eq!(all.len(), 7);
        assert_eq!(all.first(), Some(&MIN_CHANNEL));
        assert_eq!(all.last(), Some(&MAX_CHANNEL));
    }

    #[test]
    fn test_display() {
        assert_eq!("162.400 MHz", format!("{}", MIN_CHANNEL));
        assert_eq!("162.550 MHz", format!("{}", MAX_CHANNEL));
    }
}
