//! SAME header decoding
//!
//! Converts an assembled frame of header bytes into a structured
//! [`AlertRecord`]. Frames arrive from the chip without the leading
//! preamble or the `ZCZC` start-of-message marker, so the first byte is
//! the dash before the originator code:
//!
//! ```txt
//! -WXR-RWT-012345-067890+0030-1051230-WXK123-
//! ```
//!
//! Decoding is positional. The originator and event codes live at fixed
//! offsets; everything after them is located relative to the last `+`
//! delimiter in the frame.

use std::fmt;
use std::str::FromStr;

use arrayvec::{ArrayString, ArrayVec};
use strum::EnumMessage;

use crate::assembler::SAME_BUFFER_SIZE;

/// Maximum number of location codes one header may carry
///
/// Fixed by the SAME standard. A frame delimiting more than this is
/// malformed and refused outright.
pub const MAX_LOCATION_CODES: usize = 30;

/// A decoded SAME alert header
///
/// All fields are copied out of the frame; the record does not borrow
/// from the assembler and remains valid after the buffer is flushed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertRecord {
    originator: ArrayString<3>,
    event: ArrayString<3>,
    locations: ArrayVec<u32, MAX_LOCATION_CODES>,
    duration_minutes: u16,
    day_of_year: u16,
    issue_time: u16,
    callsign: ArrayString<8>,
}

impl AlertRecord {
    /// Decode a raw frame as read out of the chip buffer
    ///
    /// The frame must begin with the dash preceding the originator
    /// code. Fields are bounds-checked; a frame that ends mid-field or
    /// delimits too many location codes is refused and no partial
    /// record is produced.
    pub fn from_frame(frame: &[u8]) -> Result<Self, AlertDecodeErr> {
        if !frame.is_ascii() {
            return Err(AlertDecodeErr::NotAscii);
        }

        let mut buf: ArrayVec<u8, SAME_BUFFER_SIZE> =
            frame.iter().copied().take(SAME_BUFFER_SIZE).collect();

        // fixed-offset character fields come out before digit stripping
        let originator = char_field::<3>(&buf, 1)?;
        let event = char_field::<3>(&buf, 5)?;

        // locate the final '+' and strip ASCII digits to their nibble
        // values in place, so numeric fields extract by place weight
        let mut plus_index = None;
        for (i, byte) in buf.iter_mut().enumerate() {
            if *byte == b'+' {
                plus_index = Some(i);
            }
            if byte.is_ascii_digit() {
                *byte &= 0x0F;
            }
        }
        let plus = plus_index.ok_or(AlertDecodeErr::MissingDelimiter)?;

        // every dash between the event code and the '+' starts a
        // six-digit location code
        let mut locations = ArrayVec::new();
        for i in 6..plus {
            if buf[i] == b'-' {
                let digits = buf.get(i + 1..i + 7).ok_or(AlertDecodeErr::Truncated)?;
                let code = digits.iter().fold(0u32, |acc, &d| acc * 10 + d as u32);
                locations
                    .try_push(code)
                    .map_err(|_| AlertDecodeErr::TooManyLocations)?;
            }
        }

        let duration_minutes = {
            let d = buf.get(plus + 1..plus + 5).ok_or(AlertDecodeErr::Truncated)?;
            d[0] as u16 * 600 + d[1] as u16 * 60 + d[2] as u16 * 10 + d[3] as u16
        };
        let day_of_year = {
            let d = buf.get(plus + 6..plus + 9).ok_or(AlertDecodeErr::Truncated)?;
            d[0] as u16 * 100 + d[1] as u16 * 10 + d[2] as u16
        };
        let issue_time = {
            let d = buf.get(plus + 9..plus + 13).ok_or(AlertDecodeErr::Truncated)?;
            d[0] as u16 * 1000 + d[1] as u16 * 100 + d[2] as u16 * 10 + d[3] as u16
        };

        // call sign: up to eight characters, ended early by a dash, a
        // NUL, or the end of the frame; digits get their ASCII form back
        let mut callsign = ArrayString::<8>::new();
        for i in 0..8 {
            match buf.get(plus + 14 + i) {
                Some(&b) if b == b'-' || b == 0x00 => break,
                Some(&b) if b <= 9 => callsign.push((b | 0x30) as char),
                Some(&b) => callsign.push(b as char),
                None => break,
            }
        }

        Ok(Self {
            originator,
            event,
            locations,
            duration_minutes,
            day_of_year,
            issue_time,
            callsign,
        })
    }

    /// Originator code, decoded
    pub fn originator(&self) -> Originator {
        Originator::from(self.originator.as_str())
    }

    /// Raw three-character originator code (e.g. `"WXR"`)
    pub fn originator_str(&self) -> &str {
        &self.originator
    }

    /// Raw three-character event code (e.g. `"RWT"`)
    pub fn event_str(&self) -> &str {
        &self.event
    }

    /// Significance level derived from the event code's last character
    pub fn significance(&self) -> Result<SignificanceLevel, UnknownSignificanceLevel> {
        SignificanceLevel::from_event(&self.event)
    }

    /// FIPS-style location codes, in frame order
    pub fn locations(&self) -> &[u32] {
        &self.locations
    }

    /// Valid duration of the alert, in minutes
    pub fn duration_minutes(&self) -> u16 {
        self.duration_minutes
    }

    /// Ordinal day of the year the alert was issued (1–366)
    pub fn day_of_year(&self) -> u16 {
        self.day_of_year
    }

    /// Issue time of day, UTC, as `HHMM`
    pub fn issue_time(&self) -> u16 {
        self.issue_time
    }

    /// Issue hour, UTC
    pub fn issue_hour(&self) -> u8 {
        (self.issue_time / 100) as u8
    }

    /// Issue minute
    pub fn issue_minute(&self) -> u8 {
        (self.issue_time % 100) as u8
    }

    /// Station call sign of the sender, up to eight characters
    pub fn callsign(&self) -> &str {
        &self.callsign
    }
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}-{}", self.originator, self.event)?;
        for code in &self.locations {
            write!(f, "-{:06}", code)?;
        }
        write!(
            f,
            "+{:04}-{:03}{:04}-{}",
            self.duration_minutes, self.day_of_year, self.issue_time, self.callsign
        )
    }
}

fn char_field<const N: usize>(
    buf: &[u8],
    offset: usize,
) -> Result<ArrayString<N>, AlertDecodeErr> {
    let bytes = buf.get(offset..offset + N).ok_or(AlertDecodeErr::Truncated)?;
    let mut out = ArrayString::new();
    for &b in bytes {
        out.push(b as char);
    }
    Ok(out)
}

/// Frame could not be decoded into an [`AlertRecord`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AlertDecodeErr {
    /// No accepted frame is buffered
    #[error("no accepted SAME frame is available")]
    NotAvailable,

    /// Frame contains bytes outside the ASCII range
    #[error("SAME frame contains non-ASCII bytes")]
    NotAscii,

    /// Frame ends in the middle of a required field
    #[error("SAME frame ends before a required field")]
    Truncated,

    /// No `+` delimiter separates locations from the time fields
    #[error("SAME frame has no '+' delimiter")]
    MissingDelimiter,

    /// More location codes than the standard permits
    #[error("SAME frame lists more than 30 location codes")]
    TooManyLocations,
}

/// SAME message originator code
///
/// ```
/// use wxband::Originator;
///
/// let orig = Originator::from("WXR");
/// assert_eq!(orig, Originator::WeatherService);
/// assert_eq!(orig.as_str(), "WXR");
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumMessage,
)]
pub enum Originator {
    /// An unknown or unrecognized originator code
    #[strum(serialize = "OOO", detailed_message = "Unknown Originator")]
    Unknown,

    /// A national Primary Entry Point station
    #[strum(serialize = "PEP", detailed_message = "Primary Entry Point System")]
    PrimaryEntryPoint,

    /// Civil authorities
    #[strum(serialize = "CIV", detailed_message = "Civil Authorities")]
    CivilAuthority,

    /// The National Weather Service
    #[strum(serialize = "WXR", detailed_message = "National Weather Service")]
    WeatherService,

    /// A broadcast station or cable system
    #[strum(serialize = "EAS", detailed_message = "Broadcast station or cable system")]
    BroadcastStation,
}

impl Originator {
    /// Three-character SAME code
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Human-readable name
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().unwrap_or_default()
    }
}

// Hand-written equivalent of `strum_macros::EnumString`: the derive also
// emits a `TryFrom<&str>` impl, which collides with the blanket impl
// arising from `From<&str>` below.
impl FromStr for Originator {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OOO" => Ok(Originator::Unknown),
            "PEP" => Ok(Originator::PrimaryEntryPoint),
            "CIV" => Ok(Originator::CivilAuthority),
            "WXR" => Ok(Originator::WeatherService),
            "EAS" => Ok(Originator::BroadcastStation),
            _ => Err(strum::ParseError::VariantNotFound),
        }
    }
}

impl From<&str> for Originator {
    fn from(code: &str) -> Self {
        Self::from_str(code).unwrap_or(Originator::Unknown)
    }
}

impl fmt::Display for Originator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display_str())
    }
}

/// Significance level of a SAME event code
///
/// Derived from the last character of the event code. Orders from
/// least to most severe, so levels can be compared:
///
/// ```
/// use wxband::SignificanceLevel;
///
/// let lvl = SignificanceLevel::from_event("RWT").unwrap();
/// assert_eq!(lvl, SignificanceLevel::Test);
/// assert!(SignificanceLevel::Warning > SignificanceLevel::Watch);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumString,
    strum_macros::EnumMessage,
)]
pub enum SignificanceLevel {
    /// Test messages, routine or practice
    #[strum(serialize = "T", detailed_message = "Test")]
    Test,

    /// A non-urgent broadcast message
    #[strum(serialize = "M", detailed_message = "Message")]
    Message,

    /// Follow-up statement to an earlier event
    #[strum(serialize = "S", detailed_message = "Statement")]
    Statement,

    /// Conditions favor the hazard; stay alert
    #[strum(serialize = "A", detailed_message = "Watch")]
    Watch,

    /// The hazard is imminent or occurring; act now
    #[strum(serialize = "W", detailed_message = "Warning")]
    Warning,
}

impl SignificanceLevel {
    /// Decode from the last character of an event code
    ///
    /// The user is cautioned that not every event code follows this
    /// convention; codes like `EVI` carry a significance that their
    /// last character does not express.
    pub fn from_event(code: &str) -> Result<Self, UnknownSignificanceLevel> {
        match code.as_bytes().last().ok_or(UnknownSignificanceLevel)? {
            b'T' => Ok(SignificanceLevel::Test),
            b'M' => Ok(SignificanceLevel::Message),
            b'S' => Ok(SignificanceLevel::Statement),
            b'A' => Ok(SignificanceLevel::Watch),
            b'W' => Ok(SignificanceLevel::Warning),
            _ => Err(UnknownSignificanceLevel),
        }
    }

    /// One-character SAME code
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Human-readable name
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().unwrap_or_default()
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display_str())
    }
}

/// Event code does not end in a known significance character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("unknown significance level")]
pub struct UnknownSignificanceLevel;

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LOCATIONS: &str = "-WXR-RWT-012345-067890+0030-1051230-WXK123-";
    const ONE_LOCATION: &str = "-WXR-RWT-012345+0030-1051230-WXK123-";

    #[test]
    fn test_decode_full_header() {
        let alert = AlertRecord::from_frame(TWO_LOCATIONS.as_bytes()).unwrap();
        assert_eq!(alert.originator_str(), "WXR");
        assert_eq!(alert.originator(), Originator::WeatherService);
        assert_eq!(alert.event_str(), "RWT");
        assert_eq!(alert.significance(), Ok(SignificanceLevel::Test));
        assert_eq!(alert.locations(), &[12345, 67890]);
        assert_eq!(alert.duration_minutes(), 30);
        assert_eq!(alert.day_of_year(), 105);
        assert_eq!(alert.issue_time(), 1230);
        assert_eq!(alert.issue_hour(), 12);
        assert_eq!(alert.issue_minute(), 30);
        assert_eq!(alert.callsign(), "WXK123");
    }

    #[test]
    fn test_decode_single_location() {
        let alert = AlertRecord::from_frame(ONE_LOCATION.as_bytes()).unwrap();
        assert_eq!(alert.locations(), &[12345]);
        assert_eq!(alert.callsign(), "WXK123");
    }

    #[test]
    fn test_duration_place_weights() {
        let frame = "-WXR-TOW-012345+1215-1051230-WXK123-";
        let alert = AlertRecord::from_frame(frame.as_bytes()).unwrap();
        // "1215" decodes as 1*600 + 2*60 + 1*10 + 5
        assert_eq!(alert.duration_minutes(), 735);
    }

    #[test]
    fn test_missing_plus_is_refused() {
        let frame = "-WXR-RWT-012345-067890-0030-1051230-WXK123-";
        assert_eq!(
            AlertRecord::from_frame(frame.as_bytes()),
            Err(AlertDecodeErr::MissingDelimiter)
        );
    }

    #[test]
    fn test_thirty_locations_is_the_limit() {
        let mut ok = String::from("-WXR-RWT");
        for _ in 0..MAX_LOCATION_CODES {
            ok.push_str("-012345");
        }
        ok.push_str("+0030-1051230-WXK123-");
        let alert = AlertRecord::from_frame(ok.as_bytes()).unwrap();
        assert_eq!(alert.locations().len(), MAX_LOCATION_CODES);

        let mut over = String::from("-WXR-RWT");
        for _ in 0..MAX_LOCATION_CODES + 1 {
            over.push_str("-012345");
        }
        over.push_str("+0030-1051230-WXK123-");
        assert_eq!(
            AlertRecord::from_frame(over.as_bytes()),
            Err(AlertDecodeErr::TooManyLocations)
        );
    }

    #[test]
    fn test_truncated_frame_is_refused() {
        let frame = "-WXR-RWT-012345+0030";
        assert_eq!(
            AlertRecord::from_frame(frame.as_bytes()),
            Err(AlertDecodeErr::Truncated)
        );

        assert_eq!(
            AlertRecord::from_frame(b"-WXR"),
            Err(AlertDecodeErr::Truncated)
        );
    }

    #[test]
    fn test_non_ascii_is_refused() {
        let mut frame = TWO_LOCATIONS.as_bytes().to_vec();
        frame[20] = 0xFF;
        assert_eq!(
            AlertRecord::from_frame(&frame),
            Err(AlertDecodeErr::NotAscii)
        );
    }

    #[test]
    fn test_callsign_ends_at_frame_end() {
        // no trailing dash after the call sign
        let frame = "-WXR-RWT-012345+0030-1051230-KLOX/NWS";
        let alert = AlertRecord::from_frame(frame.as_bytes()).unwrap();
        assert_eq!(alert.callsign(), "KLOX/NWS");
    }

    #[test]
    fn test_originator_codes() {
        assert_eq!(Originator::from("PEP"), Originator::PrimaryEntryPoint);
        assert_eq!(Originator::from("CIV"), Originator::CivilAuthority);
        assert_eq!(Originator::from("EAS"), Originator::BroadcastStation);
        assert_eq!(Originator::from("XYZ"), Originator::Unknown);
        assert_eq!(Originator::WeatherService.as_str(), "WXR");
        assert_eq!(
            Originator::WeatherService.to_string(),
            "National Weather Service"
        );
    }

    #[test]
    fn test_significance_ordering() {
        assert_eq!(
            SignificanceLevel::from_event("TOR"),
            Ok(SignificanceLevel::Warning)
        );
        assert_eq!(
            SignificanceLevel::from_event("SVA"),
            Ok(SignificanceLevel::Watch)
        );
        assert!(SignificanceLevel::Warning > SignificanceLevel::Test);
        assert_eq!(
            SignificanceLevel::from_event("XYZ"),
            Err(UnknownSignificanceLevel)
        );
        assert_eq!(
            SignificanceLevel::from_event(""),
            Err(UnknownSignificanceLevel)
        );
    }

    #[test]
    fn test_display_reconstructs_header() {
        let alert = AlertRecord::from_frame(ONE_LOCATION.as_bytes()).unwrap();
        assert_eq!(alert.to_string(), "-WXR-RWT-012345+0030-1051230-WXK123");
    }
}
