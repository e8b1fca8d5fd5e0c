//! This is a [bit banging] implementation of an I2C bus master on top of the
//! [`embedded-hal`] GPIO traits.
//!
//! [bit banging]: https://en.wikipedia.org/wiki/Bit_banging
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal
//!
//! The driver lives in [`i2c`]. It exposes register and device level
//! transfers for register-mapped targets and also implements
//! [`embedded_hal::i2c::I2c`], so existing device drivers can run on it.
//!
//! Clock stretching is supported with an optional timeout measured by a
//! [`clock::Monotonic`] time source.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod clock;
pub mod i2c;
