//! Chip command set, property identifiers, and timing constants
//!
//! The receiver chip speaks a register-oriented serial protocol: the host
//! writes a command byte (plus arguments), waits out the documented settle
//! time, and burst-reads the response. Everything in this module is taken
//! from the chip's published command interface.

use std::time::Duration;

/// Power up the device into weather-band receive mode.
pub const POWER_UP: u8 = 0x01;
/// Query device revision information.
pub const GET_REV: u8 = 0x10;
/// Power down the device.
pub const POWER_DOWN: u8 = 0x11;
/// Set the value of a 16-bit property.
pub const SET_PROPERTY: u8 = 0x12;
/// Retrieve the value of a 16-bit property.
pub const GET_PROPERTY: u8 = 0x13;
/// Read the interrupt status bits.
pub const GET_INT_STATUS: u8 = 0x14;
/// Select the weather-band tuning frequency.
pub const WB_TUNE_FREQ: u8 = 0x50;
/// Query the status of the previous tune command.
pub const WB_TUNE_STATUS: u8 = 0x52;
/// Query the received signal quality of the current channel.
pub const WB_RSQ_STATUS: u8 = 0x53;
/// Query SAME decoder state and buffered data for the current channel.
pub const WB_SAME_STATUS: u8 = 0x54;
/// Query the status of the 1050 Hz alert tone.
pub const WB_ASQ_STATUS: u8 = 0x55;
/// Query the status of the AGC.
pub const WB_AGC_STATUS: u8 = 0x57;
/// Configure GPO pins as outputs or Hi-Z.
pub const GPIO_CTL: u8 = 0x80;
/// Set GPO output levels.
pub const GPIO_SET: u8 = 0x81;

/// First byte of a firmware patch argument frame.
pub const PATCH_ARGS: u8 = 0x15;
/// First byte of a firmware patch data frame.
pub const PATCH_DATA: u8 = 0x16;

// Power-up command arguments.

/// Function select: weather-band receive.
pub const FUNC_WB: u8 = 0x03;
/// Crystal oscillator enable.
pub const XOSCEN: u8 = 0x10;
/// Patch enable: the power-up is followed by a patch download.
pub const PATCH: u8 = 0x20;
/// GPO2 output enable.
pub const GPO2EN: u8 = 0x40;
/// Application setting: analog L and R audio outputs.
pub const OPMODE_ANALOG: u8 = 0x05;

// Property identifiers.

/// Enables GPO2 interrupt sources.
pub const GPO_IEN: u16 = 0x0001;
/// Reference clock frequency in Hz.
pub const REFCLK_FREQ: u16 = 0x0201;
/// Reference clock prescaler.
pub const REFCLK_PRESCALE: u16 = 0x0202;
/// Audio output volume, 0–63.
pub const RX_VOLUME: u16 = 0x4000;
/// Audio output hard mute.
pub const RX_HARD_MUTE: u16 = 0x4001;
/// Maximum tune error the AFC will lock to.
pub const WB_MAX_TUNE_ERROR: u16 = 0x5108;
/// RSQ interrupt source configuration.
pub const WB_RSQ_INT_SOURCE: u16 = 0x5200;
/// SNR high threshold for RSQ interrupts.
pub const WB_RSQ_SNR_HIGH_THRESHOLD: u16 = 0x5201;
/// SNR low threshold for RSQ interrupts.
pub const WB_RSQ_SNR_LOW_THRESHOLD: u16 = 0x5202;
/// RSSI high threshold for RSQ interrupts.
pub const WB_RSQ_RSSI_HIGH_THRESHOLD: u16 = 0x5203;
/// RSSI low threshold for RSQ interrupts.
pub const WB_RSQ_RSSI_LOW_THRESHOLD: u16 = 0x5204;
/// SNR threshold for declaring a valid channel.
pub const WB_VALID_SNR_THRESHOLD: u16 = 0x5403;
/// RSSI threshold for declaring a valid channel.
pub const WB_VALID_RSSI_THRESHOLD: u16 = 0x5404;
/// SAME interrupt source configuration.
pub const WB_SAME_INTERRUPT_SOURCE: u16 = 0x5500;
/// 1050 Hz alert tone interrupt source configuration.
pub const WB_ASQ_INT_SOURCE: u16 = 0x5600;

// Status-query acknowledge modes.

/// Read status without clearing the underlying interrupt.
pub const CHECK: u8 = 0x00;
/// Read status and clear the underlying interrupt.
pub const INTACK: u8 = 0x01;
/// Clear the chip's SAME receive buffer.
pub const CLRBUF: u8 = 0x02;

// Settle times. Each bus transaction must be separated from the next by
// the delay mandated for the command that preceded it.

/// Inter-command settle time.
pub const CMD_SETTLE: Duration = Duration::from_millis(2);
/// Property-write settle time.
pub const PROP_SETTLE: Duration = Duration::from_millis(10);
/// Power-up settle time.
pub const POWER_UP_SETTLE: Duration = Duration::from_millis(200);
/// Tune settle time.
pub const TUNE_SETTLE: Duration = Duration::from_millis(250);
/// SAME status settle time. A buffer clear takes considerably longer
/// than an ordinary command.
pub const SAME_SETTLE: Duration = Duration::from_millis(8);
