/*!
  # Synchronous I2C bus master based on GPIO bitbang

  This implementation consumes the following hardware resources:
  - Two GPIO pins for SDA and SCL lines.
  - A monotonic microsecond clock to bound clock stretching.

  The driver is layered:
  - line control: release or drive the open-drain lines, wait out clock stretching
  - framing: START/STOP, address and byte frames, ACK/NACK
  - transfers: register and device reads/writes built from the frames

  ## Hardware requirements

  1. Configure GPIO pins as Open-Drain outputs with their input buffer enabled,
     so that `set_high` releases the line and `is_high` reads the wire level.
  2. Fit pull-up resistors on both lines.

  ## Clock stretching

  After releasing SCL the driver polls it until it reads high. When the
  configured stretch timeout elapses first, the transfer carries on anyway and
  a sticky flag is raised. Poll it with [`I2cBB::check_stretch_timeout`].
  A zero timeout waits forever.

  ## Example

  ```ignore
    use bitbang_i2c::i2c::{Address, Config, I2cBB};

    let mut i2c = I2cBB::new(scl, sda, clock, Address::new(0x48).unwrap(), Config::default());
    i2c.init().unwrap();
    i2c.write_register(0x01, 0x60, true).unwrap();
    let config = i2c.read_register_u16_msb_first(0x01, true).unwrap();
    if i2c.check_stretch_timeout() {
        // the sensor held SCL low for too long at some point
    }
  ```
*/

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::{Duration, Monotonic};

mod address;
mod framing;
mod hal;
mod line;
mod transfer;

#[cfg(test)]
mod sim;

pub use address::{Address, Direction, InvalidAddress};

/// I2C error
#[derive(Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// GPIO error
    Bus(E),
    /// No ack received
    NoAck,
    /// Invalid input
    InvalidData,
    /// Address does not fit in 7 bits
    InvalidAddress,
}

impl<E: core::fmt::Debug> embedded_hal::i2c::Error for Error<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Error::Bus(_) => embedded_hal::i2c::ErrorKind::Other,
            Error::NoAck => embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Unknown,
            ),
            Error::InvalidData => embedded_hal::i2c::ErrorKind::Other,
            Error::InvalidAddress => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

impl<E> From<InvalidAddress> for Error<E> {
    fn from(_: InvalidAddress) -> Self {
        Error::InvalidAddress
    }
}

/// Configuration of the I2C bus master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How long to wait for a target to release a stretched clock.
    /// Zero waits forever.
    pub stretch_timeout: Duration,
}

impl Config {
    /// Stretch timeout used by [`Config::default`].
    pub const DEFAULT_STRETCH_TIMEOUT: Duration = Duration::millis(500);
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stretch_timeout: Self::DEFAULT_STRETCH_TIMEOUT,
        }
    }
}

/// Bit banging I2C bus master talking to one target address
pub struct I2cBB<SCL, SDA, CLK> {
    scl: SCL,
    sda: SDA,
    clk: CLK,
    address: Address,
    config: Config,
    stretch_timeout_error: bool,
}

impl<SCL, SDA, CLK> I2cBB<SCL, SDA, CLK> {
    /// Create instance
    ///
    /// The lines are not touched until [`I2cBB::init`] or the first transfer.
    pub fn new(scl: SCL, sda: SDA, clk: CLK, address: Address, config: Config) -> Self {
        I2cBB {
            scl,
            sda,
            clk,
            address,
            config,
            stretch_timeout_error: false,
        }
    }

    /// Release the pins and the clock
    pub fn free(self) -> (SCL, SDA, CLK) {
        (self.scl, self.sda, self.clk)
    }

    /// Target address used by the register and device transfers.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Change the target address.
    ///
    /// Must not be called between a transfer sent without STOP and the
    /// transfer that completes it.
    pub fn set_address(&mut self, address: Address) {
        self.address = address;
    }

    /// Current stretch timeout. Zero means no timeout.
    pub fn stretch_timeout(&self) -> Duration {
        self.config.stretch_timeout
    }

    /// Change the stretch timeout. Zero waits forever.
    pub fn set_stretch_timeout(&mut self, timeout: Duration) {
        self.config.stretch_timeout = timeout;
    }

    /// Returns whether a clock stretch exceeded the timeout since the last
    /// call, and clears the flag.
    pub fn check_stretch_timeout(&mut self) -> bool {
        core::mem::replace(&mut self.stretch_timeout_error, false)
    }
}

impl<SCL, SDA, CLK, E> I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    /// Put the bus in its idle state: both lines released.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.release_data()?;
        self.release_clock()
    }
}
