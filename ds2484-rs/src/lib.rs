#![no_std]
#![deny(missing_docs)]

/*! # DS2484
 *
 * Driver for the DS2484 single-channel I2C to 1-Wire bridge. [`Ds2484`]
 * implements [`OneWire`], including the strong pull-up that 1-Wire EEPROM
 * and SHA devices need while they copy or hash data internally.
 */

pub use embedded_onewire::{OneWire, OneWireError, OneWireResult};
mod error;
mod onewire;
mod registers;
mod traits;

pub use error::Ds2484Error;
pub use registers::{DeviceConfiguration, DeviceStatus, Ds2484, Ds2484Builder};
pub use traits::Interact;

/// Results of DS2484-specific function calls.
pub type Ds2484Result<T, E> = Result<T, Ds2484Error<E>>;
