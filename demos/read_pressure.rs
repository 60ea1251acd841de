extern crate allsensors_dlc;
extern crate i2cdev;
extern crate linux_embedded_hal as hal;

use allsensors_dlc::{Dlc, MeasurementMode, Model, TemperatureUnit, I2C_ADDRESS};
use hal::sysfs_gpio::Direction;
use hal::{Delay, SysfsPin};
use i2cdev::linux::LinuxI2CDevice;

fn main() {
    let mut args = ::std::env::args().skip(1);
    let model: Model = args
        .next()
        .unwrap_or_else(|| "L01G".to_string())
        .parse()
        .expect("Unknown model");
    let gpio: u64 = args
        .next()
        .unwrap_or_else(|| "17".to_string())
        .parse()
        .expect("Bad GPIO number");

    let eoc = SysfsPin::new(gpio);
    eoc.export().expect("Couldn't export EOC pin");
    eoc.set_direction(Direction::In).expect("Couldn't set EOC direction");

    let bus = LinuxI2CDevice::new("/dev/i2c-1", I2C_ADDRESS).expect("Couldn't open I2C bus");
    let mut dlc = Dlc::for_model(bus, eoc, model);
    dlc.set_temperature_unit(TemperatureUnit::Celsius);

    if !dlc.probe() {
        println!("No {} found at {:#04x}", model, I2C_ADDRESS);
        return;
    }

    let mut delay = Delay;
    loop {
        let measurement = dlc
            .measure(MeasurementMode::Average4, &mut delay)
            .expect("Couldn't read sensor");
        println!("{}: {}", model, measurement);
        println!(
            "  {} / {}",
            measurement.pressure_quantity(),
            measurement.temperature_quantity()
        );
        ::std::thread::sleep(::std::time::Duration::from_millis(250));
    }
}
