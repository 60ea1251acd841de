//! # Output units for pressure and temperature
//!
//! The transfer functions produce PSI and degrees Celsius; these are
//! converted to whatever the driver has been configured to report.

use std::fmt;

pub const PASCALS_PER_PSI: f64 = 6894.75729;
pub const INCHES_H2O_PER_PSI: f64 = 27.679904;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PressureUnit {
    Psi,
    InH2O,
    Pascal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

/// The units a driver reports its measurements in. Defaults to PSI and
/// degrees Celsius.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OutputUnits {
    pub pressure: PressureUnit,
    pub temperature: TemperatureUnit,
}

impl Default for PressureUnit {
    fn default() -> PressureUnit {
        PressureUnit::Psi
    }
}

impl Default for TemperatureUnit {
    fn default() -> TemperatureUnit {
        TemperatureUnit::Celsius
    }
}

/// Convert a pressure in PSI to `unit`.
pub fn convert_pressure(psi: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Psi => psi,
        PressureUnit::InH2O => psi * INCHES_H2O_PER_PSI,
        PressureUnit::Pascal => psi * PASCALS_PER_PSI,
    }
}

/// Convert a temperature in degrees Celsius to `unit`.
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
        TemperatureUnit::Kelvin => celsius + 273.15,
    }
}

impl PressureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            PressureUnit::Psi => "psi",
            PressureUnit::InH2O => "inH2O",
            PressureUnit::Pascal => "Pa",
        }
    }
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
