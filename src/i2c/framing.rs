//! Framing primitives
//!
//! Every primitive except `start_condition` expects SCL low on entry and
//! leaves it low. Data changes only while SCL is low; it is sampled while
//! SCL is high.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Address, Direction, Error, I2cBB};
use crate::clock::Monotonic;

impl<SCL, SDA, CLK, E> I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    /// START, or repeated START. SDA must be released.
    pub fn start_condition(&mut self) -> Result<(), Error<E>> {
        self.release_clock()?;
        self.drive_data_low()?;
        self.drive_clock_low()
    }

    /// STOP. SCL must be low. Leaves the bus idle.
    pub fn stop_condition(&mut self) -> Result<(), Error<E>> {
        self.drive_data_low()?;
        self.release_clock()?;
        self.release_data()
    }

    /// Send the target address and R/W bit, then release SDA for the ACK.
    pub fn write_address_frame(&mut self, direction: Direction) -> Result<(), Error<E>> {
        let address = self.address;
        self.write_address_frame_to(address, direction)
    }

    pub(super) fn write_address_frame_to(
        &mut self,
        address: Address,
        direction: Direction,
    ) -> Result<(), Error<E>> {
        self.write_byte(address.frame(direction))
    }

    /// Send a register address byte, then release SDA for the ACK.
    pub fn write_register_byte(&mut self, register: u8) -> Result<(), Error<E>> {
        self.write_byte(register)
    }

    /// Send a data byte, then release SDA for the ACK.
    pub fn write_data_byte(&mut self, data: u8) -> Result<(), Error<E>> {
        self.write_byte(data)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error<E>> {
        for bit_offset in 0..8 {
            let out_bit = (byte >> (7 - bit_offset)) & 0b1;
            if out_bit == 1 {
                self.release_data()?;
            } else {
                self.drive_data_low()?;
            }
            self.release_clock()?;
            self.drive_clock_low()?;
        }
        self.release_data()
    }

    /// Clock in one byte, MSB first. SDA must be released.
    pub fn read_byte(&mut self) -> Result<u8, Error<E>> {
        let mut byte: u8 = 0;
        for bit_offset in 0..8 {
            self.release_clock()?;
            if self.data_is_high()? {
                byte |= 1 << (7 - bit_offset);
            }
            self.drive_clock_low()?;
        }
        Ok(byte)
    }

    /// Clock the acknowledge bit with SDA released.
    ///
    /// Returns `true` when the target pulled SDA low (ACK). After the last
    /// byte of a read this is how the controller sends its NACK.
    pub fn check_ack(&mut self) -> Result<bool, Error<E>> {
        self.release_data()?;
        self.release_clock()?;
        let nack = self.data_is_high()?;
        self.drive_clock_low()?;
        Ok(!nack)
    }

    /// Acknowledge a received byte so the target sends another one.
    pub fn write_ack(&mut self) -> Result<(), Error<E>> {
        self.drive_data_low()?;
        self.release_clock()?;
        self.drive_clock_low()?;
        self.release_data()
    }

    /// Tell the target no more bytes are wanted.
    pub fn send_nack(&mut self) -> Result<(), Error<E>> {
        self.check_ack().map(|_| ())
    }
}
