//! Line control
//!
//! Both lines are open-drain: `set_high` releases the line to the pull-up,
//! `set_low` drives it low. Only the clock can be held low by a target.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Error, I2cBB};
use crate::clock::Monotonic;

impl<SCL, SDA, CLK, E> I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    /// Release SCL and wait until it reads high.
    ///
    /// A target stretching the clock past the stretch timeout raises the
    /// sticky timeout flag; the call still returns `Ok`.
    pub fn release_clock(&mut self) -> Result<(), Error<E>> {
        self.scl.set_high().map_err(Error::Bus)?;
        if self.scl.is_high().map_err(Error::Bus)? {
            return Ok(());
        }

        let timeout = self.config.stretch_timeout;
        if timeout.ticks() == 0 {
            while self.scl.is_low().map_err(Error::Bus)? {}
            return Ok(());
        }

        let start = self.clk.now();
        while self.scl.is_low().map_err(Error::Bus)? {
            if self.clk.elapsed_since(start) >= timeout {
                log::warn!(
                    "SCL held low by {} for more than {} us",
                    self.address,
                    timeout.ticks()
                );
                self.stretch_timeout_error = true;
                break;
            }
        }
        Ok(())
    }

    /// Drive SCL low.
    pub fn drive_clock_low(&mut self) -> Result<(), Error<E>> {
        self.scl.set_low().map_err(Error::Bus)
    }

    /// Release SDA to the pull-up.
    pub fn release_data(&mut self) -> Result<(), Error<E>> {
        self.sda.set_high().map_err(Error::Bus)
    }

    /// Drive SDA low.
    pub fn drive_data_low(&mut self) -> Result<(), Error<E>> {
        self.sda.set_low().map_err(Error::Bus)
    }

    pub(super) fn data_is_high(&mut self) -> Result<bool, Error<E>> {
        self.sda.is_high().map_err(Error::Bus)
    }
}
