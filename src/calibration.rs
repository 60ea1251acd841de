//! # Sensor calibration and the DLC transfer functions
//!
//! The sensors are sold as gage, differential or absolute parts with a
//! number of pressure ranges. The part number encodes both, so DLC-L05D is a
//! 5 PSI differential sensor.
//!
//! Pressure(psi) = 1.25 x ((P_out_dig - OS_dig) / 2^14) x FSS(psi)
//!
//! Temperature(degC) = T_out_dig x (200 / (2^11 - 1)) - 50
//!
//! FSS is the full scale span: the full scale pressure for gage and absolute
//! parts, twice the full scale pressure for differential parts.
//!
//! The datasheet also quotes a 2^24 based form (T = T_out_dig x 150 / 2^24 -
//! 40). That form is not used here. Note that 200 / 2047 applied to a full
//! 24-bit temperature word gives values far outside the rated range.

use std::fmt;
use std::str::FromStr;

const FULL_SCALE_REF: f64 = (1u32 << 14) as f64;
const GAGE_ZERO_REF: u32 = 1638;
const DIFFERENTIAL_ZERO_REF: u32 = 8192;

/// The sensor type, where part numbers:
///   * DLC-xxxG-* are gage sensors.
///   * DLC-xxxD-* are differential sensors.
///   * DLC-xxxA-* are absolute sensors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SensorType {
    Gage,
    Differential,
    Absolute,
}

impl SensorType {
    /// The letter used in the part number.
    pub fn tag(self) -> char {
        match self {
            SensorType::Gage => 'G',
            SensorType::Differential => 'D',
            SensorType::Absolute => 'A',
        }
    }

    pub fn from_tag(tag: char) -> Option<SensorType> {
        match tag.to_ascii_uppercase() {
            'G' => Some(SensorType::Gage),
            'D' => Some(SensorType::Differential),
            'A' => Some(SensorType::Absolute),
            _ => None,
        }
    }
}

/// Fixed calibration of one sensor. The zero reference and range follow
/// from the sensor type and cannot be set independently.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Calibration {
    sensor_type: SensorType,
    full_scale: f64,
    zero_ref: u32,
    range: f64,
}

impl Calibration {
    /// `full_scale` is the rated pressure in PSI.
    pub fn new(sensor_type: SensorType, full_scale: f64) -> Calibration {
        let (zero_ref, range) = match sensor_type {
            SensorType::Gage | SensorType::Absolute => (GAGE_ZERO_REF, full_scale),
            SensorType::Differential => (DIFFERENTIAL_ZERO_REF, full_scale * 2.0),
        };
        Calibration {
            sensor_type,
            full_scale,
            zero_ref,
            range,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Rated full scale pressure in PSI.
    pub fn full_scale(&self) -> f64 {
        self.full_scale
    }

    /// Digital output at zero pressure.
    pub fn zero_ref(&self) -> u32 {
        self.zero_ref
    }

    /// Full scale span in PSI.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Convert a raw pressure reading to PSI.
    pub fn pressure_psi(&self, raw: u32) -> f64 {
        1.25 * ((f64::from(raw) - f64::from(self.zero_ref)) / FULL_SCALE_REF) * self.range
    }

    /// Convert a raw temperature reading to degrees Celsius.
    pub fn temperature_celsius(&self, raw: u32) -> f64 {
        temperature_celsius(raw)
    }
}

/// Temperature transfer function. It is the same for every sensor type.
pub fn temperature_celsius(raw: u32) -> f64 {
    f64::from(raw) * (200.0 / 2047.0) - 50.0
}

/// The purchasable low pressure parts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Model {
    L01G,
    L02G,
    L05G,
    L10G,
    L20G,
    L30G,
    L60G,
    L01D,
    L02D,
    L05D,
    L10D,
    L20D,
    L30D,
    L60D,
}

/// Error returned when a string doesn't name a known part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModel(String);

impl Model {
    pub const ALL: [Model; 14] = [
        Model::L01G,
        Model::L02G,
        Model::L05G,
        Model::L10G,
        Model::L20G,
        Model::L30G,
        Model::L60G,
        Model::L01D,
        Model::L02D,
        Model::L05D,
        Model::L10D,
        Model::L20D,
        Model::L30D,
        Model::L60D,
    ];

    pub fn sensor_type(self) -> SensorType {
        match self {
            Model::L01G
            | Model::L02G
            | Model::L05G
            | Model::L10G
            | Model::L20G
            | Model::L30G
            | Model::L60G => SensorType::Gage,
            Model::L01D
            | Model::L02D
            | Model::L05D
            | Model::L10D
            | Model::L20D
            | Model::L30D
            | Model::L60D => SensorType::Differential,
        }
    }

    /// Full scale pressure in PSI.
    pub fn full_scale(self) -> f64 {
        match self {
            Model::L01G | Model::L01D => 1.0,
            Model::L02G | Model::L02D => 2.0,
            Model::L05G | Model::L05D => 5.0,
            Model::L10G | Model::L10D => 10.0,
            Model::L20G | Model::L20D => 20.0,
            Model::L30G | Model::L30D => 30.0,
            Model::L60G | Model::L60D => 60.0,
        }
    }

    pub fn calibration(self) -> Calibration {
        Calibration::new(self.sensor_type(), self.full_scale())
    }

    /// Short model code, e.g. "L05D".
    pub fn code(self) -> &'static str {
        match self {
            Model::L01G => "L01G",
            Model::L02G => "L02G",
            Model::L05G => "L05G",
            Model::L10G => "L10G",
            Model::L20G => "L20G",
            Model::L30G => "L30G",
            Model::L60G => "L60G",
            Model::L01D => "L01D",
            Model::L02D => "L02D",
            Model::L05D => "L05D",
            Model::L10D => "L10D",
            Model::L20D => "L20D",
            Model::L30D => "L30D",
            Model::L60D => "L60D",
        }
    }

    /// Part number, e.g. "DLC-L05D".
    pub fn part_number(self) -> String {
        format!("DLC-{}", self.code())
    }
}

impl From<Model> for Calibration {
    fn from(model: Model) -> Calibration {
        model.calibration()
    }
}

impl FromStr for Model {
    type Err = UnknownModel;

    /// Accepts "L05D" or "DLC-L05D", in any case. Anything after the model
    /// code (such as the "-U2" package suffix) is ignored.
    fn from_str(s: &str) -> Result<Model, UnknownModel> {
        let upper = s.trim().to_ascii_uppercase();
        let code = if upper.starts_with("DLC-") {
            &upper[4..]
        } else {
            &upper[..]
        };
        let code = code.split('-').next().unwrap_or("");
        Model::ALL
            .iter()
            .cloned()
            .find(|m| m.code() == code)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DLC-{}", self.code())
    }
}

impl fmt::Display for UnknownModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown DLC model {:?}", self.0)
    }
}

impl std::error::Error for UnknownModel {}
