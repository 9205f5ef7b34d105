//! HT1632C command vocabulary.
//!
//! Every transaction on the serial interface opens with a 3-bit ID code that
//! selects the transaction kind. Command transactions then carry one or more
//! 8-bit command words, each followed by a single don't-care padding bit.
//! RAM writes carry a 7-bit start address followed by 4-bit data words.
//!
//! The codes below are taken verbatim from the HT1632C datasheet command
//! summary.

/// Transaction ID for command mode (`100`).
pub const ID_COMMAND: u8 = 0b100;
/// Transaction ID for a RAM write (`101`).
pub const ID_WRITE: u8 = 0b101;
/// Transaction ID for a RAM read (`110`). The driver never reads back, but
/// the code is part of the chip's vocabulary.
pub const ID_READ: u8 = 0b110;

/// Width of a transaction ID in bits.
pub const ID_LEN: u8 = 3;
/// Width of a command word in bits.
pub const CMD_LEN: u8 = 8;
/// Width of a RAM address in bits.
pub const ADDR_LEN: u8 = 7;
/// Width of a RAM data word in bits. A full buffer byte is transmitted as
/// two consecutive words, high bits first.
pub const WORD_LEN: u8 = 4;

/// Common-pin driving configuration, set once during bring-up.
///
/// The variants encode the output structure (N-MOS open drain or P-MOS open
/// drain) and the number of commons the chip drives (8 or 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommonsMode {
    /// N-MOS open drain output, 8 commons.
    NMos8,
    /// N-MOS open drain output, 16 commons.
    NMos16,
    /// P-MOS open drain output, 8 commons.
    PMos8,
    /// P-MOS open drain output, 16 commons.
    PMos16,
}

impl CommonsMode {
    /// The 8-bit command word for this mode.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::NMos8 => 0x20,
            Self::NMos16 => 0x24,
            Self::PMos8 => 0x28,
            Self::PMos16 => 0x2C,
        }
    }
}

/// An 8-bit HT1632C command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Turn off the system oscillator.
    SysDis,
    /// Turn on the system oscillator.
    SysEn,
    /// Turn off the LED duty cycle generator.
    LedOff,
    /// Turn on the LED duty cycle generator.
    LedOn,
    /// Turn off blinking.
    BlinkOff,
    /// Turn on blinking.
    BlinkOn,
    /// Set the chip to RC slave mode.
    SlaveMode,
    /// Set the chip to RC master mode. Not sent during bring-up: RC master
    /// is the power-on default, and sending it confuses HT1632C parts.
    MasterMode,
    /// Clock the system from the on-chip RC oscillator.
    IntClock,
    /// Clock the system from the external clock pin.
    ExtClock,
    /// Select the common-pin driving configuration.
    Commons(CommonsMode),
    /// Set the PWM duty cycle to `duty`/16, for `duty` in `1..=16`.
    ///
    /// The duty value is encoded verbatim: values outside `1..=16` are not
    /// clamped and produce a command word the chip may interpret as
    /// something else entirely.
    Pwm(u8),
}

impl Command {
    /// The 8-bit command word transmitted for this command.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::SysDis => 0x00,
            Self::SysEn => 0x01,
            Self::LedOff => 0x02,
            Self::LedOn => 0x03,
            Self::BlinkOff => 0x08,
            Self::BlinkOn => 0x09,
            Self::SlaveMode => 0x10,
            Self::MasterMode => 0x14,
            Self::IntClock => 0x18,
            Self::ExtClock => 0x1C,
            Self::Commons(mode) => mode.bits(),
            Self::Pwm(duty) => 0xA0 | duty.wrapping_sub(1),
        }
    }
}
