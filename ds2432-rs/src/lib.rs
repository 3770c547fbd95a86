#![no_std]
//! # DS2432
//!
//! Driver for the DS2432 1Kb protected 1-Wire EEPROM with SHA-1 engine
//! (family code `0xB3`).
//!
//! Reads are plain memory reads. Every write goes through the scratchpad and
//! is only committed by the device if the host proves knowledge of the
//! device secret: the host computes a 160-bit MAC over the secret, the
//! target page, the staged data and the device ROM, and the device compares
//! it against its own computation before copying the scratchpad into EEPROM.
//!
//! [`Ds2432`] is the per-device record (ROM code and host copy of the
//! secret). Its methods borrow the bus mutably for the whole protocol
//! sequence, so no other transaction can be interleaved.
//!
//! | Address | Content |
//! |---------|---------|
//! | `0x00..0x80` | data memory, pages 0 to 3 |
//! | `0x80..0x88` | secret (write only) |
//! | `0x88..0x90` | register page |
//! | `0x90..0x98` | registration number (alternate readout) |

pub mod commands;
mod device;
mod error;
mod group;
pub mod mac;
mod registers;

pub use commands::{CopyStatus, EndingStatus, Scratchpad};
pub use device::Ds2432;
pub use error::{Ds2432Error, Mismatch};
pub use group::Ds2432Group;
pub use mac::{Mac, Secret};
pub use registers::{RegisterPage, is_activated};

/// Results of DS2432 operations, generic over the bus error type.
pub type Ds2432Result<T, E> = Result<T, Ds2432Error<E>>;

/// 1-Wire family code of the DS2432.
pub const FAMILY_CODE: u8 = 0xb3;

/// Size of an EEPROM page.
pub const PAGE_SIZE: usize = 32;

/// Size of the scratchpad, and of every authenticated write.
pub const BLOCK_SIZE: usize = 8;

/// Size of the general purpose data memory (pages 0 to 3).
pub const DATA_MEMORY_SIZE: u16 = 0x80;

/// Target address that routes a scratchpad into the secret.
pub const SECRET_ADDRESS: u16 = 0x80;

/// Start of the register page.
pub const REGISTER_PAGE_ADDRESS: u16 = 0x88;

/// Start of the alternate registration number readout.
pub const REGISTRATION_NUMBER_ADDRESS: u16 = 0x90;
