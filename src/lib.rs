//! # A driver for AllSensors DLC series pressure sensors
//!
//! The [DLC series](https://www.allsensors.com/products/dlc-series) are
//! digital low voltage pressure sensors with an I2C interface and an EOC
//! (end of conversion) output. Each sensor reports a 24-bit pressure and a
//! 24-bit temperature reading together with a status byte.
//!
//! Supported parts:
//!
//! * Gage sensors, DLC-L01G to DLC-L60G
//! * Differential sensors, DLC-L01D to DLC-L60D
//!
//! Other ranges and absolute parts can be described with a `Calibration`.
//!
//! ```no_run
//! extern crate allsensors_dlc;
//! extern crate i2cdev;
//! # extern crate embedded_hal;
//! # use embedded_hal::digital::v2::InputPin;
//! # struct Eoc;
//! # impl InputPin for Eoc {
//! #     type Error = ();
//! #     fn is_high(&self) -> Result<bool, ()> { Ok(true) }
//! #     fn is_low(&self) -> Result<bool, ()> { Ok(false) }
//! # }
//! # let eoc = Eoc;
//! use allsensors_dlc::{Dlc, MeasurementMode, Model, PressureUnit, I2C_ADDRESS};
//! use i2cdev::linux::LinuxI2CDevice;
//!
//! let bus = LinuxI2CDevice::new("/dev/i2c-1", I2C_ADDRESS).unwrap();
//! let mut dlc = Dlc::for_model(bus, eoc, Model::L01G);
//! dlc.set_pressure_unit(PressureUnit::InH2O);
//!
//! let pending = dlc.start_measurement(MeasurementMode::Single).unwrap();
//! while !dlc.is_ready().unwrap() {}
//! let measurement = dlc.read_measurement(pending).unwrap();
//! println!("{}", measurement);
//! ```

extern crate byteorder;
extern crate embedded_hal;
#[cfg(test)]
extern crate embedded_hal_mock;
extern crate i2cdev;
#[macro_use]
extern crate log;
extern crate measurements;

mod bus;
mod calibration;
mod command;
mod dlc;
pub mod frame;
mod units;

pub use measurements::Pressure;
pub use measurements::Temperature;

pub use bus::Bus;
pub use calibration::{Calibration, Model, SensorType, UnknownModel};
pub use command::{MeasurementMode, I2C_ADDRESS};
pub use dlc::{Dlc, Measurement, PendingMeasurement, ReadyPolicy};
pub use frame::{RawFrame, StatusCode};
pub use units::{convert_pressure, convert_temperature, OutputUnits, PressureUnit, TemperatureUnit};

use std::error::Error;
use std::fmt;

/// Errors that this crate can return. `B` is the bus error type and `P` the
/// EOC pin error type.
///
/// A sensor fault is not an error: it is reported in
/// `Measurement::status`.
#[derive(Debug)]
pub enum DlcError<B, P> {
    /// The bus transaction failed
    Bus(B),
    /// The EOC line couldn't be read
    ReadyLine(P),
    /// The EOC line didn't go high in time
    Timeout,
}

/// A shortcut for Results that can return `T` or `DlcError`
pub type DlcResult<T, B, P> = Result<T, DlcError<B, P>>;

impl<B, P> fmt::Display for DlcError<B, P>
where
    B: fmt::Display,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DlcError::Bus(ref e) => write!(f, "I2C error: {}", e),
            DlcError::ReadyLine(ref e) => write!(f, "EOC pin error: {:?}", e),
            DlcError::Timeout => write!(f, "timed out waiting for end of conversion"),
        }
    }
}

impl<B, P> Error for DlcError<B, P>
where
    B: Error,
    P: fmt::Debug,
{
}


// End of file
