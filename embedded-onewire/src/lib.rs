#![no_std]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus and writing and reading bytes.
//! On top of those it provides ROM addressing ([OneWire::address], [OneWire::read_rom]), block transfers and
//! a hook for transports that can hold a strong pull-up while a device runs an internal operation.
//!
//! The CRC flavours used on the bus are provided by [OneWireCrc] (ROM codes, CRC-8) and
//! [OneWireCrc16] (memory and scratchpad transfers, CRC-16).

pub mod consts;
mod error;
mod traits;
mod utils;
pub use error::OneWireError;
pub use traits::{OneWire, OneWireStatus};
pub use utils::{OneWireCrc, OneWireCrc16};

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
