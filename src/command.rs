//! Commands understood by the DLC sensor.

/// The default I2C address from the datasheet.
pub const I2C_ADDRESS: u16 = 0x29;

/// Measurement commands.
///
/// Each command wakes the sensor from Idle into Active and starts a
/// measurement cycle. The averaging variants repeat the cycle 2, 4, 8 or 16
/// times before returning to Idle. The EOC line is held low until the result
/// is available.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeasurementMode {
    Single,
    Average2,
    Average4,
    Average8,
    Average16,
}

impl MeasurementMode {
    /// The command byte to send for this mode.
    pub fn command(self) -> u8 {
        match self {
            MeasurementMode::Single => 0xAA,
            MeasurementMode::Average2 => 0xAC,
            MeasurementMode::Average4 => 0xAD,
            MeasurementMode::Average8 => 0xAE,
            MeasurementMode::Average16 => 0xAF,
        }
    }

    /// Number of readings the sensor averages.
    pub fn samples(self) -> u8 {
        match self {
            MeasurementMode::Single => 1,
            MeasurementMode::Average2 => 2,
            MeasurementMode::Average4 => 4,
            MeasurementMode::Average8 => 8,
            MeasurementMode::Average16 => 16,
        }
    }
}

impl Default for MeasurementMode {
    fn default() -> MeasurementMode {
        MeasurementMode::Single
    }
}
