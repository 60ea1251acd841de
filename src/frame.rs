//! * Decoding of the DLC status/data frame
//!
//! After a measurement completes the sensor returns seven bytes:
//!
//! ```text
//! S[7:0] P[23:16] P[15:8] P[7:0] T[23:16] T[15:8] T[7:0]
//! ```
//!
//! Status byte layout, MSB first:
//!
//! | bit | meaning                                |
//! |-----|----------------------------------------|
//! | 7   | always 0                               |
//! | 6   | power on (1)                           |
//! | 5   | busy (1 = processing, 0 = ready)       |
//! | 4:3 | mode (00 = normal operation)           |
//! | 2   | memory error (EEPROM checksum failure) |
//! | 1   | sensor configuration, always 0         |
//! | 0   | ALU error                              |

use byteorder::{BigEndian, ByteOrder};
use std::fmt;

/// Number of bytes in a status/data read.
pub const FRAME_LENGTH: usize = 7;

const STATUS_POWER: u8 = 0b0100_0000;
const STATUS_BUSY: u8 = 0b0010_0000;
const STATUS_MODE: u8 = 0b0001_1000;
const STATUS_MEMORY_ERROR: u8 = 0b0000_0100;
const STATUS_ALU_ERROR: u8 = 0b0000_0001;

/// One status/data read, in wire order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RawFrame(pub [u8; FRAME_LENGTH]);

/// The sensor condition reported in the status byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusCode {
    /// Normal operation, data valid
    Ok,
    /// Still converting
    Busy,
    /// Power bit not set
    NoPower,
    /// Arithmetic unit reported an error
    AluError,
    /// EEPROM checksum failure
    MemError,
    /// Any other combination, e.g. a non-normal mode
    Error,
}

/// The individual sub-fields of a status byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusBits {
    pub power: bool,
    pub busy: bool,
    pub mode: u8,
    pub memory_error: bool,
    pub alu_error: bool,
}

impl StatusBits {
    pub fn from_byte(status: u8) -> StatusBits {
        StatusBits {
            power: status & STATUS_POWER != 0,
            busy: status & STATUS_BUSY != 0,
            mode: (status & STATUS_MODE) >> 3,
            memory_error: status & STATUS_MEMORY_ERROR != 0,
            alu_error: status & STATUS_ALU_ERROR != 0,
        }
    }
}

impl StatusCode {
    /// Decode a status byte. The first matching condition wins: power, busy,
    /// memory error, ALU error, then mode.
    pub fn from_status_byte(status: u8) -> StatusCode {
        match StatusBits::from_byte(status) {
            StatusBits { power: false, .. } => StatusCode::NoPower,
            StatusBits { busy: true, .. } => StatusCode::Busy,
            StatusBits {
                memory_error: true, ..
            } => StatusCode::MemError,
            StatusBits {
                alu_error: true, ..
            } => StatusCode::AluError,
            StatusBits { mode: 0, .. } => StatusCode::Ok,
            _ => StatusCode::Error,
        }
    }

    /// Numeric status value.
    pub fn code(self) -> u8 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Busy => 1,
            StatusCode::NoPower => 6,
            StatusCode::Error => 7,
            StatusCode::MemError => 8,
            StatusCode::AluError => 9,
        }
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match *self {
            StatusCode::Ok => "ok",
            StatusCode::Busy => "busy",
            StatusCode::NoPower => "no power",
            StatusCode::AluError => "ALU error",
            StatusCode::MemError => "memory checksum error",
            StatusCode::Error => "error",
        };
        f.write_str(text)
    }
}

impl RawFrame {
    pub fn status_byte(&self) -> u8 {
        self.0[0]
    }
}

impl From<[u8; FRAME_LENGTH]> for RawFrame {
    fn from(bytes: [u8; FRAME_LENGTH]) -> RawFrame {
        RawFrame(bytes)
    }
}

/// Decode the status byte of a frame.
pub fn decode_status(frame: &RawFrame) -> StatusCode {
    StatusCode::from_status_byte(frame.status_byte())
}

/// The 24-bit pressure reading, bytes 1 to 3.
pub fn decode_pressure_raw(frame: &RawFrame) -> u32 {
    BigEndian::read_u24(&frame.0[1..4])
}

/// The 24-bit temperature reading, bytes 4 to 6.
pub fn decode_temperature_raw(frame: &RawFrame) -> u32 {
    BigEndian::read_u24(&frame.0[4..7])
}
