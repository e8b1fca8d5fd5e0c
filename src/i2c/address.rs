/// 7-bit target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(u8);

/// Returned when a value does not fit in 7 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAddress;

impl Address {
    /// Largest 7-bit address.
    pub const MAX: u8 = 0x7f;

    /// Check and wrap a 7-bit address.
    pub const fn new(address: u8) -> Result<Self, InvalidAddress> {
        if address > Self::MAX {
            Err(InvalidAddress)
        } else {
            Ok(Self(address))
        }
    }

    /// Raw address value.
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Address followed by the R/W bit, as it appears on the wire.
    pub const fn frame(&self, direction: Direction) -> u8 {
        (self.0 << 1) | direction as u8
    }
}

impl TryFrom<u8> for Address {
    type Error = InvalidAddress;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> u8 {
        address.0
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Transfer direction, sent as the R/W bit after the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    /// Controller writes to the target (R/W = 0)
    Write = 0,
    /// Controller reads from the target (R/W = 1)
    Read = 1,
}
