use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use super::{Address, Direction, Error, I2cBB};
use crate::clock::Monotonic;

impl<SCL, SDA, CLK, E> ErrorType for I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    type Error = Error<E>;
}

/// Runs transactions against the address passed in, not the stored target
/// address.
impl<SCL, SDA, CLK, E> I2c<SevenBitAddress> for I2cBB<SCL, SDA, CLK>
where
    SCL: InputPin<Error = E> + OutputPin<Error = E>,
    SDA: InputPin<Error = E> + OutputPin<Error = E>,
    CLK: Monotonic,
    E: core::fmt::Debug,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let address = Address::new(address)?;
        if operations.is_empty() {
            return Ok(());
        }
        if operations
            .iter()
            .any(|op| matches!(op, Operation::Read(buffer) if buffer.is_empty()))
        {
            return Err(Error::InvalidData);
        }

        let mut current = None;
        for i in 0..operations.len() {
            let direction = match operations[i] {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };

            // Start or repeated start if switching direction
            if current != Some(direction) {
                self.begin(address, direction)?;
                current = Some(direction);
            }

            // Adjacent reads form one run; only its last byte is NACKed.
            let next_is_read = matches!(operations.get(i + 1), Some(Operation::Read(_)));
            match &mut operations[i] {
                Operation::Read(buffer) => self.read_payload(buffer, !next_is_read)?,
                Operation::Write(data) => self.write_payload(address, data)?,
            }
        }

        self.end(true)
    }
}
