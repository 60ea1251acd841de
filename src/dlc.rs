//! * Driver for the AllSensors DLC series pressure sensors
//! See https://www.allsensors.com/datasheets/DS-0365_Rev_A.pdf
//!
//! The sensor measures on command. The host sends one of the measurement
//! commands, waits for the EOC line to go high and then reads seven bytes of
//! status and data:
//!
//! ```text
//!   Idle ──start_measurement──► Active ──EOC high──► Data available
//!    ▲                                                     │
//!    └──────────────────read_measurement───────────────────┘
//! ```
//!
//! `start_measurement` hands back a `PendingMeasurement` which
//! `read_measurement` consumes, so a read can't be issued without a command
//! having been sent first.

use std::cmp;
use std::fmt;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use measurements::{Pressure, Temperature};

use bus::Bus;
use calibration::{Calibration, Model};
use command::MeasurementMode;
use frame::{self, RawFrame, StatusCode, FRAME_LENGTH};
use units::{self, OutputUnits, PressureUnit, TemperatureUnit, INCHES_H2O_PER_PSI};
use DlcError;

type Error<B, P> = DlcError<<B as Bus>::Error, <P as InputPin>::Error>;

/// How long `wait_ready` keeps polling the EOC line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReadyPolicy {
    /// Delay between two reads of the EOC line.
    pub poll_interval_ms: u32,
    /// Reads of the EOC line before giving up. Zero is treated as one.
    pub max_polls: u32,
}

impl Default for ReadyPolicy {
    fn default() -> ReadyPolicy {
        ReadyPolicy {
            poll_interval_ms: 1,
            max_polls: 250,
        }
    }
}

/// A measurement command has been sent and its result not yet read.
#[must_use]
#[derive(Debug)]
pub struct PendingMeasurement {
    mode: MeasurementMode,
}

impl PendingMeasurement {
    pub fn mode(&self) -> MeasurementMode {
        self.mode
    }
}

/// The result of one read cycle, in the units the driver was configured
/// with at the time of the read.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    pub status: StatusCode,
    pub pressure: f64,
    pub temperature: f64,
    pub raw_pressure: u32,
    pub raw_temperature: u32,
    pub units: OutputUnits,
}

impl Measurement {
    pub fn decode(frame: &RawFrame, calibration: &Calibration, units: OutputUnits) -> Measurement {
        let raw_pressure = frame::decode_pressure_raw(frame);
        let raw_temperature = frame::decode_temperature_raw(frame);
        let psi = calibration.pressure_psi(raw_pressure);
        let celsius = calibration.temperature_celsius(raw_temperature);
        Measurement {
            status: frame::decode_status(frame),
            pressure: units::convert_pressure(psi, units.pressure),
            temperature: units::convert_temperature(celsius, units.temperature),
            raw_pressure,
            raw_temperature,
            units,
        }
    }

    /// True if the sensor reported normal operation.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn pressure_quantity(&self) -> Pressure {
        match self.units.pressure {
            PressureUnit::Psi => Pressure::from_psi(self.pressure),
            PressureUnit::InH2O => Pressure::from_psi(self.pressure / INCHES_H2O_PER_PSI),
            PressureUnit::Pascal => Pressure::from_pascals(self.pressure),
        }
    }

    pub fn temperature_quantity(&self) -> Temperature {
        match self.units.temperature {
            TemperatureUnit::Celsius => Temperature::from_celsius(self.temperature),
            TemperatureUnit::Fahrenheit => Temperature::from_fahrenheit(self.temperature),
            TemperatureUnit::Kelvin => Temperature::from_kelvin(self.temperature),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {:.4} {}, {:.2} {}",
            self.status, self.pressure, self.units.pressure, self.temperature, self.units.temperature
        )
    }
}

pub struct Dlc<B, P>
where
    B: Bus,
    P: InputPin,
{
    bus: B,
    eoc: P,
    calibration: Calibration,
    units: OutputUnits,
    ready_policy: ReadyPolicy,
    last: Option<Measurement>,
}

impl<B, P> Dlc<B, P>
where
    B: Bus,
    P: InputPin,
{
    /// Create a driver for a sensor on `bus` whose EOC output is wired to
    /// `eoc`. Nothing is sent to the sensor.
    pub fn new(bus: B, eoc: P, calibration: Calibration) -> Dlc<B, P> {
        Dlc {
            bus,
            eoc,
            calibration,
            units: OutputUnits::default(),
            ready_policy: ReadyPolicy::default(),
            last: None,
        }
    }

    /// Create a driver for one of the standard parts.
    pub fn for_model(bus: B, eoc: P, model: Model) -> Dlc<B, P> {
        debug!("[dlc] configured for {}", model);
        Dlc::new(bus, eoc, model.calibration())
    }

    /// Give back the bus and the EOC pin.
    pub fn release(self) -> (B, P) {
        (self.bus, self.eoc)
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn units(&self) -> OutputUnits {
        self.units
    }

    /// Takes effect from the next `read_measurement`.
    pub fn set_units(&mut self, units: OutputUnits) {
        self.units = units;
    }

    pub fn set_pressure_unit(&mut self, unit: PressureUnit) {
        self.units.pressure = unit;
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.units.temperature = unit;
    }

    pub fn ready_policy(&self) -> ReadyPolicy {
        self.ready_policy
    }

    pub fn set_ready_policy(&mut self, policy: ReadyPolicy) {
        self.ready_policy = policy;
    }

    /// The most recent successful read, if any.
    pub fn last_measurement(&self) -> Option<&Measurement> {
        self.last.as_ref()
    }

    /// Check whether the sensor acknowledges its address.
    pub fn probe(&mut self) -> bool {
        match self.bus.probe() {
            Ok(()) => true,
            Err(e) => {
                warn!("[dlc] no sensor found: {}", e);
                false
            }
        }
    }

    /// Send a measurement command. Returns immediately; the EOC line drops
    /// until the sensor has finished.
    pub fn start_measurement(&mut self, mode: MeasurementMode) -> Result<PendingMeasurement, Error<B, P>> {
        let command = mode.command();
        self.bus.write_command(command).map_err(DlcError::Bus)?;
        debug!("[dlc] sent command {:#04x} ({:?})", command, mode);
        Ok(PendingMeasurement { mode })
    }

    /// True once the EOC line is high, i.e. the sensor is idle and any
    /// result is available.
    pub fn is_ready(&self) -> Result<bool, Error<B, P>> {
        self.eoc.is_high().map_err(DlcError::ReadyLine)
    }

    /// Poll the EOC line according to the ready policy.
    pub fn wait_ready<D>(&mut self, pending: &PendingMeasurement, delay: &mut D) -> Result<(), Error<B, P>>
    where
        D: DelayMs<u32>,
    {
        let policy = self.ready_policy;
        // the line is always read at least once
        let polls = cmp::max(policy.max_polls, 1);
        for poll in 0..polls {
            if self.is_ready()? {
                trace!("[dlc] ready after {} polls", poll + 1);
                return Ok(());
            }
            if poll + 1 < polls {
                delay.delay_ms(policy.poll_interval_ms);
            }
        }
        warn!("[dlc] EOC still low after {} polls ({:?})", polls, pending.mode());
        Err(DlcError::Timeout)
    }

    /// Read and convert the result of a finished measurement. Call this
    /// once `is_ready` reports true.
    ///
    /// A sensor fault is not an error here: check `Measurement::status`.
    pub fn read_measurement(&mut self, pending: PendingMeasurement) -> Result<Measurement, Error<B, P>> {
        let mut buf = [0u8; FRAME_LENGTH];
        self.bus.read_bytes(&mut buf).map_err(DlcError::Bus)?;
        let frame = RawFrame(buf);
        trace!("[dlc] frame {:02x?}", frame.0);

        let measurement = Measurement::decode(&frame, &self.calibration, self.units);
        if measurement.is_ok() {
            debug!("[dlc] {:?} measurement: {}", pending.mode(), measurement);
        } else {
            warn!("[dlc] sensor reported {}", measurement.status);
        }
        self.last = Some(measurement);
        Ok(measurement)
    }

    /// Run a complete measurement cycle: send the command, wait for EOC and
    /// read the result.
    pub fn measure<D>(&mut self, mode: MeasurementMode, delay: &mut D) -> Result<Measurement, Error<B, P>>
    where
        D: DelayMs<u32>,
    {
        let pending = self.start_measurement(mode)?;
        self.wait_ready(&pending, delay)?;
        self.read_measurement(pending)
    }

    /// Read just the status byte. This can be done at any time.
    pub fn read_status(&mut self) -> Result<StatusCode, Error<B, P>> {
        let mut buf = [0u8; 1];
        self.bus.read_bytes(&mut buf).map_err(DlcError::Bus)?;
        Ok(StatusCode::from_status_byte(buf[0]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use calibration::SensorType;
    use embedded_hal_mock::delay::MockNoop as MockDelay;
    use embedded_hal_mock::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
    use embedded_hal_mock::MockError;
    use std::collections::VecDeque;
    use std::io::ErrorKind;

    #[derive(Debug)]
    struct FakeBusError;

    impl fmt::Display for FakeBusError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("nack")
        }
    }

    impl std::error::Error for FakeBusError {}

    /// Records commands and hands out queued responses.
    #[derive(Default)]
    struct FakeBus {
        present: bool,
        commands: Vec<u8>,
        responses: VecDeque<Vec<u8>>,
    }

    impl FakeBus {
        fn present() -> FakeBus {
            FakeBus {
                present: true,
                ..FakeBus::default()
            }
        }

        fn respond(mut self, bytes: &[u8]) -> FakeBus {
            self.responses.push_back(bytes.to_vec());
            self
        }
    }

    impl Bus for FakeBus {
        type Error = FakeBusError;

        fn probe(&mut self) -> Result<(), FakeBusError> {
            if self.present {
                Ok(())
            } else {
                Err(FakeBusError)
            }
        }

        fn write_command(&mut self, command: u8) -> Result<(), FakeBusError> {
            if !self.present {
                return Err(FakeBusError);
            }
            self.commands.push(command);
            Ok(())
        }

        fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), FakeBusError> {
            match self.responses.pop_front() {
                Some(ref bytes) if self.present && bytes.len() == buf.len() => {
                    buf.copy_from_slice(bytes);
                    Ok(())
                }
                _ => Err(FakeBusError),
            }
        }
    }

    /// EOC line that reads low `low_reads` times, then high once.
    fn eoc_high_after(low_reads: usize) -> PinMock {
        let mut expectations = vec![PinTransaction::get(PinState::Low); low_reads];
        expectations.push(PinTransaction::get(PinState::High));
        PinMock::new(&expectations)
    }

    fn eoc_unused() -> PinMock {
        PinMock::new(&[])
    }

    // power on, normal mode; P = 16384; T = 1023
    const DIFFERENTIAL_HALF_SCALE: [u8; 7] = [0x40, 0x00, 0x40, 0x00, 0x00, 0x03, 0xff];

    #[test]
    fn reports_presence() {
        let mut dlc = Dlc::for_model(FakeBus::present(), eoc_unused(), Model::L01G);
        assert!(dlc.probe());
        let mut dlc = Dlc::for_model(FakeBus::default(), eoc_unused(), Model::L01G);
        assert!(!dlc.probe());
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn start_sends_command() {
        let mut dlc = Dlc::for_model(FakeBus::present(), eoc_unused(), Model::L01G);
        let pending = dlc.start_measurement(MeasurementMode::Average8).unwrap();
        assert_eq!(pending.mode(), MeasurementMode::Average8);
        let (bus, mut eoc) = dlc.release();
        assert_eq!(bus.commands, vec![0xAE]);
        eoc.done();
    }

    #[test]
    fn start_reports_bus_error() {
        let mut dlc = Dlc::for_model(FakeBus::default(), eoc_unused(), Model::L01G);
        match dlc.start_measurement(MeasurementMode::Single) {
            Err(DlcError::Bus(FakeBusError)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn is_ready_follows_eoc() {
        let dlc = Dlc::for_model(FakeBus::present(), eoc_high_after(1), Model::L01G);
        assert_eq!(dlc.is_ready().unwrap(), false);
        assert_eq!(dlc.is_ready().unwrap(), true);
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn is_ready_reports_pin_error() {
        let expectations = [PinTransaction::get(PinState::High).with_error(MockError::Io(ErrorKind::Other))];
        let dlc = Dlc::for_model(FakeBus::present(), PinMock::new(&expectations), Model::L01G);
        match dlc.is_ready() {
            Err(DlcError::ReadyLine(MockError::Io(ErrorKind::Other))) => {}
            other => panic!("unexpected {:?}", other),
        }
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn measure_differential() {
        let bus = FakeBus::present().respond(&DIFFERENTIAL_HALF_SCALE);
        let mut dlc = Dlc::for_model(bus, eoc_high_after(3), Model::L05D);
        let mut delay = MockDelay::new();
        let m = dlc.measure(MeasurementMode::Single, &mut delay).unwrap();
        assert_eq!(m.status, StatusCode::Ok);
        assert_eq!(m.raw_pressure, 16384);
        assert_eq!(m.raw_temperature, 1023);
        assert_eq!(m.pressure, 6.25);
        assert!((m.temperature - (1023.0 * 200.0 / 2047.0 - 50.0)).abs() < 1e-9);
        assert_eq!(dlc.last_measurement(), Some(&m));
        let (bus, mut eoc) = dlc.release();
        assert_eq!(bus.commands, vec![0xAA]);
        eoc.done();
    }

    #[test]
    fn zero_pressure_in_other_units() {
        // P = 8192 is zero for a differential part; T raw 0 is -50 C
        let bus = FakeBus::present().respond(&[0x40, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00]);
        let mut dlc = Dlc::for_model(bus, eoc_unused(), Model::L05D);
        dlc.set_pressure_unit(PressureUnit::Pascal);
        dlc.set_temperature_unit(TemperatureUnit::Kelvin);
        let pending = dlc.start_measurement(MeasurementMode::Single).unwrap();
        let m = dlc.read_measurement(pending).unwrap();
        assert_eq!(m.pressure, 0.0);
        assert!((m.temperature - 223.15).abs() < 1e-9);
        assert_eq!(m.units.pressure, PressureUnit::Pascal);
    }

    #[test]
    fn units_apply_to_next_read() {
        let bus = FakeBus::present()
            .respond(&DIFFERENTIAL_HALF_SCALE)
            .respond(&DIFFERENTIAL_HALF_SCALE);
        let eoc = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
        ]);
        let mut dlc = Dlc::for_model(bus, eoc, Model::L05D);
        let mut delay = MockDelay::new();
        let first = dlc.measure(MeasurementMode::Single, &mut delay).unwrap();
        dlc.set_pressure_unit(PressureUnit::InH2O);
        let second = dlc.measure(MeasurementMode::Single, &mut delay).unwrap();
        assert_eq!(first.pressure, 6.25);
        assert_eq!(second.pressure, 6.25 * 27.679904);
        assert_eq!(dlc.last_measurement(), Some(&second));
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn sensor_fault_is_not_an_error() {
        // power on, memory error
        let bus = FakeBus::present().respond(&[0x44, 0, 0, 0, 0, 0, 0]);
        let mut dlc = Dlc::for_model(bus, eoc_unused(), Model::L01G);
        let pending = dlc.start_measurement(MeasurementMode::Single).unwrap();
        let m = dlc.read_measurement(pending).unwrap();
        assert_eq!(m.status, StatusCode::MemError);
        assert!(!m.is_ok());
    }

    #[test]
    fn failed_read_keeps_last_measurement() {
        let bus = FakeBus::present().respond(&DIFFERENTIAL_HALF_SCALE);
        let eoc = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
        ]);
        let mut dlc = Dlc::for_model(bus, eoc, Model::L05D);
        let mut delay = MockDelay::new();
        let m = dlc.measure(MeasurementMode::Single, &mut delay).unwrap();
        // nothing queued, so the read fails
        match dlc.measure(MeasurementMode::Single, &mut delay) {
            Err(DlcError::Bus(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(dlc.last_measurement(), Some(&m));
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn wait_ready_times_out() {
        // three low reads and no more
        let eoc = PinMock::new(&[
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::Low),
        ]);
        let mut dlc = Dlc::for_model(FakeBus::present(), eoc, Model::L01G);
        dlc.set_ready_policy(ReadyPolicy {
            poll_interval_ms: 5,
            max_polls: 3,
        });
        let mut delay = MockDelay::new();
        let pending = dlc.start_measurement(MeasurementMode::Average16).unwrap();
        match dlc.wait_ready(&pending, &mut delay) {
            Err(DlcError::Timeout) => {}
            other => panic!("unexpected {:?}", other),
        }
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn zero_polls_still_reads_eoc_once() {
        let bus = FakeBus::present().respond(&DIFFERENTIAL_HALF_SCALE);
        let mut dlc = Dlc::for_model(bus, eoc_high_after(0), Model::L05D);
        dlc.set_ready_policy(ReadyPolicy {
            poll_interval_ms: 1,
            max_polls: 0,
        });
        let mut delay = MockDelay::new();
        let m = dlc.measure(MeasurementMode::Single, &mut delay).unwrap();
        assert_eq!(m.pressure, 6.25);
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn zero_polls_times_out_when_low() {
        let eoc = PinMock::new(&[PinTransaction::get(PinState::Low)]);
        let mut dlc = Dlc::for_model(FakeBus::present(), eoc, Model::L01G);
        dlc.set_ready_policy(ReadyPolicy {
            poll_interval_ms: 1,
            max_polls: 0,
        });
        let mut delay = MockDelay::new();
        let pending = dlc.start_measurement(MeasurementMode::Single).unwrap();
        match dlc.wait_ready(&pending, &mut delay) {
            Err(DlcError::Timeout) => {}
            other => panic!("unexpected {:?}", other),
        }
        let (_, mut eoc) = dlc.release();
        eoc.done();
    }

    #[test]
    fn read_status_byte() {
        let bus = FakeBus::present().respond(&[0x60]);
        let mut dlc = Dlc::new(bus, eoc_unused(), Calibration::new(SensorType::Gage, 1.0));
        assert_eq!(dlc.read_status().unwrap(), StatusCode::Busy);
    }

    #[test]
    fn typed_quantities() {
        let frame = RawFrame(DIFFERENTIAL_HALF_SCALE);
        let cal = Model::L05D.calibration();
        let psi = Measurement::decode(&frame, &cal, OutputUnits::default());
        let pa = Measurement::decode(
            &frame,
            &cal,
            OutputUnits {
                pressure: PressureUnit::Pascal,
                temperature: TemperatureUnit::Fahrenheit,
            },
        );
        assert!((psi.pressure_quantity().as_psi() - 6.25).abs() < 1e-6);
        assert!((pa.pressure_quantity().as_psi() - 6.25).abs() < 1e-3);
        assert!((psi.temperature_quantity().as_celsius() - pa.temperature_quantity().as_celsius()).abs() < 1e-6);
    }
}
