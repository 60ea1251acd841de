//! The bus transactions the DLC driver needs.
//!
//! Every `i2cdev` device already implements this, so a `LinuxI2CDevice`
//! opened at `I2C_ADDRESS` can be handed straight to the driver.

use i2cdev::core::I2CDevice;

pub trait Bus {
    type Error: std::error::Error;

    /// Address the device without transferring any data. Fails if nothing
    /// acknowledges.
    fn probe(&mut self) -> Result<(), Self::Error>;

    /// Send a single command byte.
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Read `buf.len()` bytes from the device.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T> Bus for T
where
    T: I2CDevice,
{
    type Error = T::Error;

    fn probe(&mut self) -> Result<(), T::Error> {
        self.smbus_write_quick(false)
    }

    fn write_command(&mut self, command: u8) -> Result<(), T::Error> {
        self.write(&[command])
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), T::Error> {
        self.read(buf)
    }
}
