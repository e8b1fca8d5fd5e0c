//! Transfer operations
//!
//! Register transfers select a register with the byte following the write
//! address; device transfers talk to single-register targets and skip it.
//! Every transfer takes a `send_stop` flag. Leaving it `false` keeps the bus
//! claimed so the next transfer starts with a repeated START.
//!
//! A NACK on any frame the controller sends aborts the transfer with a STOP,
//! whatever `send_stop` says, and returns [`Error::NoAck`].

use embedded_hal::digital::{InputPin, OutputPin};

use super::{Address, Direction, Error, I2cBB};
use crate::clock::Monotonic;

#[derive(Debug, Clone, Copy)]
enum Frame {
    Address,
    Register,
    Data,
}

impl<SCL, SDA, CLK, E> I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    /// Write `data` to consecutive registers starting at `register`.
    pub fn write_register_bytes(
        &mut self,
        register: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        self.select_register(register)?;
        self.write_payload(self.address, data)?;
        self.end(send_stop)
    }

    /// Write one byte to `register`.
    pub fn write_register(
        &mut self,
        register: u8,
        data: u8,
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        self.write_register_bytes(register, &[data], send_stop)
    }

    /// Write a 16-bit value to `register`, least significant byte first.
    pub fn write_register_u16(
        &mut self,
        register: u8,
        value: u16,
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        self.write_register_bytes(register, &value.to_le_bytes(), send_stop)
    }

    /// Write a 16-bit value to `register`, most significant byte first.
    pub fn write_register_u16_msb_first(
        &mut self,
        register: u8,
        value: u16,
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        self.write_register_u16(register, value.swap_bytes(), send_stop)
    }

    /// Write `data` to a target without register selection.
    ///
    /// An empty `data` only addresses the target, which checks that it is
    /// present.
    pub fn write_device_bytes(&mut self, data: &[u8], send_stop: bool) -> Result<(), Error<E>> {
        let address = self.address;
        self.begin(address, Direction::Write)?;
        self.write_payload(address, data)?;
        self.end(send_stop)
    }

    /// Write one byte to a target without register selection.
    pub fn write_device(&mut self, data: u8, send_stop: bool) -> Result<(), Error<E>> {
        self.write_device_bytes(&[data], send_stop)
    }

    /// Read consecutive registers starting at `register` into `buffer`.
    ///
    /// The register is selected in a write phase followed by a repeated
    /// START, never a STOP.
    pub fn read_register_bytes(
        &mut self,
        register: u8,
        buffer: &mut [u8],
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        if buffer.is_empty() {
            return Err(Error::InvalidData);
        }
        self.select_register(register)?;
        let address = self.address;
        self.begin(address, Direction::Read)?;
        self.read_payload(buffer, true)?;
        self.end(send_stop)
    }

    /// Read one byte from `register`.
    pub fn read_register(&mut self, register: u8, send_stop: bool) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.read_register_bytes(register, &mut buffer, send_stop)?;
        Ok(buffer[0])
    }

    /// Read a 16-bit value from `register`, least significant byte first.
    pub fn read_register_u16(&mut self, register: u8, send_stop: bool) -> Result<u16, Error<E>> {
        let mut buffer = [0u8; 2];
        self.read_register_bytes(register, &mut buffer, send_stop)?;
        Ok(u16::from_le_bytes(buffer))
    }

    /// Read a 16-bit value from `register`, most significant byte first.
    pub fn read_register_u16_msb_first(
        &mut self,
        register: u8,
        send_stop: bool,
    ) -> Result<u16, Error<E>> {
        self.read_register_u16(register, send_stop)
            .map(u16::swap_bytes)
    }

    /// Read into `buffer` from a target without register selection.
    pub fn read_device_bytes(
        &mut self,
        buffer: &mut [u8],
        send_stop: bool,
    ) -> Result<(), Error<E>> {
        if buffer.is_empty() {
            return Err(Error::InvalidData);
        }
        let address = self.address;
        self.begin(address, Direction::Read)?;
        self.read_payload(buffer, true)?;
        self.end(send_stop)
    }

    /// Read one byte from a target without register selection.
    pub fn read_device(&mut self, send_stop: bool) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.read_device_bytes(&mut buffer, send_stop)?;
        Ok(buffer[0])
    }

    /// START (or repeated START) and address frame.
    pub(super) fn begin(
        &mut self,
        address: Address,
        direction: Direction,
    ) -> Result<(), Error<E>> {
        log::trace!("START {} {:?}", address, direction);
        self.start_condition()?;
        self.write_address_frame_to(address, direction)?;
        self.expect_ack(address, Frame::Address)
    }

    fn select_register(&mut self, register: u8) -> Result<(), Error<E>> {
        let address = self.address;
        self.begin(address, Direction::Write)?;
        self.write_register_byte(register)?;
        self.expect_ack(address, Frame::Register)
    }

    pub(super) fn write_payload(&mut self, address: Address, data: &[u8]) -> Result<(), Error<E>> {
        for byte in data {
            self.write_data_byte(*byte)?;
            self.expect_ack(address, Frame::Data)?;
        }
        Ok(())
    }

    /// Read `buffer.len()` bytes, acknowledging all of them except the last
    /// one when `nack_last` is set.
    pub(super) fn read_payload(
        &mut self,
        buffer: &mut [u8],
        nack_last: bool,
    ) -> Result<(), Error<E>> {
        let last = buffer.len().saturating_sub(1);
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = self.read_byte()?;
            if nack_last && i == last {
                self.send_nack()?;
            } else {
                self.write_ack()?;
            }
        }
        Ok(())
    }

    pub(super) fn end(&mut self, send_stop: bool) -> Result<(), Error<E>> {
        if send_stop {
            log::trace!("STOP");
            self.stop_condition()
        } else {
            Ok(())
        }
    }

    fn expect_ack(&mut self, address: Address, frame: Frame) -> Result<(), Error<E>> {
        if self.check_ack()? {
            return Ok(());
        }
        log::debug!("NACK from {} on {:?} frame, aborting", address, frame);
        self.stop_condition()?;
        Err(Error::NoAck)
    }
}
