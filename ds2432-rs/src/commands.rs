//! Memory and SHA function commands of the DS2432.
//!
//! Each function performs its own reset and match ROM, runs one command and
//! validates what the device sends back. The functions hold no state; the
//! caller keeps the bus borrowed across a sequence of them.

use crate::{Ds2432Error, Ds2432Result, Mac, Mismatch};
use bitfield_struct::bitfield;
use embedded_hal::delay::DelayNs;
use embedded_onewire::{OneWire, OneWireCrc16, OneWireError};

const DS2432_WRITE_SCRATCHPAD: u8 = 0x0f;
const DS2432_READ_SCRATCHPAD: u8 = 0xaa;
const DS2432_COPY_SCRATCHPAD: u8 = 0x55;
const DS2432_LOAD_FIRST_SECRET: u8 = 0x5a;
const DS2432_READ_MEMORY: u8 = 0xf0;

/// Time the device needs to compute its MAC before the host sends its own.
const DS2432_MAC_TIME_MS: u32 = 2;
/// Worst case EEPROM programming time, the bus must stay powered meanwhile.
const DS2432_PROGRAM_TIME_MS: u32 = 10;

/// Ending status (E/S) byte of the scratchpad.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct EndingStatus {
    /// Offset of the last scratchpad byte written.
    #[bits(3)]
    pub ending_offset: u8,
    #[bits(2)]
    __: u8,
    /// PF: the last write scratchpad ended on a partial byte.
    pub partial: bool,
    #[bits(1)]
    __: u8,
    /// AA: the scratchpad has been copied.
    pub authorization_accepted: bool,
}

/// Scratchpad contents as reported by read scratchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad {
    /// Target address TA2:TA1.
    pub address: u16,
    /// Ending status.
    pub es: EndingStatus,
    /// Staged data.
    pub data: [u8; 8],
}

impl Scratchpad {
    /// Checks that the scratchpad targets `address`, is complete, and holds
    /// `data` when given.
    pub fn verify(&self, address: u16, data: Option<&[u8; 8]>) -> Result<(), Mismatch> {
        if self.address != address {
            log::error!(
                "unexpected address: {:04x} (expected {:04x})",
                self.address,
                address
            );
            return Err(Mismatch::Address {
                expected: address,
                received: self.address,
            });
        }
        if self.es.partial() {
            log::error!("ES partial flag is set ({:02x})", self.es.into_bits());
            return Err(Mismatch::PartialWrite);
        }
        if data.is_some_and(|data| *data != self.data) {
            log::error!("scratchpad data does not match");
            return Err(Mismatch::Data);
        }
        Ok(())
    }
}

/// Outcome of a copy scratchpad, decoded from the byte read after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// Alternating 1s and 0s: the scratchpad was copied.
    Copied,
    /// All zeros: the device computed another MAC.
    MacRejected,
    /// All ones: the MAC matched but the page is write protected.
    WriteProtected,
    /// Anything else.
    Unknown(u8),
}

impl From<u8> for CopyStatus {
    fn from(value: u8) -> Self {
        match value {
            0xaa | 0x55 => Self::Copied,
            0x00 => Self::MacRejected,
            0xff => Self::WriteProtected,
            other => Self::Unknown(other),
        }
    }
}

impl CopyStatus {
    /// Maps the status to the result of the copy.
    pub fn into_result<E>(self) -> Ds2432Result<(), E> {
        match self {
            Self::Copied => Ok(()),
            Self::MacRejected => Err(Ds2432Error::MacRejected),
            Self::WriteProtected => Err(Ds2432Error::WriteProtected),
            Self::Unknown(code) => Err(Ds2432Error::UnexpectedStatus(code)),
        }
    }
}

/// Reads `buf.len()` bytes starting at `address`.
///
/// The device sends no CRC for this command.
pub fn read_memory<O: OneWire>(
    bus: &mut O,
    rom: u64,
    address: u16,
    buf: &mut [u8],
) -> Ds2432Result<(), O::BusError> {
    let [ta1, ta2] = address.to_le_bytes();
    bus.address(Some(rom))?;
    bus.write_bytes(&[DS2432_READ_MEMORY, ta1, ta2])?;
    bus.read_bytes(buf)?;
    log::trace!("read_memory: {} bytes at {:04x}", buf.len(), address);
    Ok(())
}

/// Writes 8 bytes into the scratchpad, targeting `address`.
pub fn write_scratchpad<O: OneWire>(
    bus: &mut O,
    rom: u64,
    address: u16,
    data: &[u8; 8],
) -> Ds2432Result<(), O::BusError> {
    let mut frame = [0; 11];
    frame[0] = DS2432_WRITE_SCRATCHPAD;
    frame[1..3].copy_from_slice(&address.to_le_bytes());
    frame[3..].copy_from_slice(data);
    bus.address(Some(rom))?;
    bus.write_bytes(&frame)?;
    let mut crc = [0; 2];
    bus.read_bytes(&mut crc)?;
    check_crc("write_scratchpad", &frame, crc)?;
    log::trace!("write_scratchpad: staged {:02x?} for {:04x}", data, address);
    Ok(())
}

/// Reads the scratchpad, its target address and ending status.
pub fn read_scratchpad<O: OneWire>(bus: &mut O, rom: u64) -> Ds2432Result<Scratchpad, O::BusError> {
    let mut frame = [0; 12];
    frame[0] = DS2432_READ_SCRATCHPAD;
    bus.address(Some(rom))?;
    bus.write_byte(DS2432_READ_SCRATCHPAD)?;
    bus.read_bytes(&mut frame[1..])?; // TA1, TA2, E/S, 8 data bytes
    let mut crc = [0; 2];
    bus.read_bytes(&mut crc)?;
    check_crc("read_scratchpad", &frame, crc)?;
    let mut data = [0; 8];
    data.copy_from_slice(&frame[4..]);
    Ok(Scratchpad {
        address: u16::from_le_bytes([frame[1], frame[2]]),
        es: EndingStatus::from_bits(frame[3]),
        data,
    })
}

/// Moves a scratchpad staged at [`SECRET_ADDRESS`](crate::SECRET_ADDRESS) into the secret.
///
/// `address` and `es` form the authorization pattern and must be the values
/// just returned by [`read_scratchpad`].
pub fn load_first_secret<O: OneWire, D: DelayNs>(
    bus: &mut O,
    delay: &mut D,
    rom: u64,
    address: u16,
    es: EndingStatus,
) -> Ds2432Result<(), O::BusError> {
    let [ta1, ta2] = address.to_le_bytes();
    bus.address(Some(rom))?;
    bus.write_bytes(&[DS2432_LOAD_FIRST_SECRET, ta1, ta2])?;
    write_powered(bus, es.into_bits())?;
    delay.delay_ms(DS2432_PROGRAM_TIME_MS);
    // alternating 1s and 0s until the next reset
    let status = bus.read_byte()?;
    if status != 0xaa && status != 0x55 {
        log::error!("unable to load_first_secret, code {:02x}", status);
        return Err(Ds2432Error::UnexpectedStatus(status));
    }
    Ok(())
}

/// Asks the device to copy the scratchpad into EEPROM, authenticated by `mac`.
pub fn copy_scratchpad<O: OneWire, D: DelayNs>(
    bus: &mut O,
    delay: &mut D,
    rom: u64,
    address: u16,
    es: EndingStatus,
    mac: &Mac,
) -> Ds2432Result<(), O::BusError> {
    let [ta1, ta2] = address.to_le_bytes();
    bus.address(Some(rom))?;
    bus.write_bytes(&[DS2432_COPY_SCRATCHPAD, ta1, ta2, es.into_bits()])?;
    delay.delay_ms(DS2432_MAC_TIME_MS);
    let mac = mac.to_bytes();
    bus.write_bytes(&mac[..19])?;
    write_powered(bus, mac[19])?;
    delay.delay_ms(DS2432_PROGRAM_TIME_MS);
    let code = bus.read_byte()?;
    let status = CopyStatus::from(code);
    match status {
        CopyStatus::Copied => log::debug!("copy_scratchpad: {:04x} committed", address),
        CopyStatus::MacRejected => {
            log::error!("unable to copy_scratchpad: invalid mac (code {:02x})", code)
        }
        CopyStatus::WriteProtected => {
            log::error!("unable to copy_scratchpad: write protected (code {:02x})", code)
        }
        CopyStatus::Unknown(_) => {
            log::error!("unable to copy_scratchpad: unknown error (code {:02x})", code)
        }
    }
    status.into_result()
}

/// Writes the byte that starts an internal operation, with the strong pull-up
/// engaged if the bus master has one.
fn write_powered<O: OneWire>(bus: &mut O, byte: u8) -> Ds2432Result<(), O::BusError> {
    match bus.strong_pullup() {
        Ok(()) => {}
        Err(OneWireError::Unimplemented) => {
            log::debug!("bus master has no strong pull-up, relying on the weak pull-up");
        }
        Err(e) => return Err(e.into()),
    }
    bus.write_byte(byte)?;
    Ok(())
}

fn check_crc<E>(step: &str, frame: &[u8], received: [u8; 2]) -> Ds2432Result<(), E> {
    if OneWireCrc16::validate(frame, received) {
        return Ok(());
    }
    let expected = !OneWireCrc16::checksum(frame);
    let received = u16::from_le_bytes(received);
    log::error!(
        "{}: invalid checksum: received {:04x} but expected {:04x}",
        step,
        received,
        expected
    );
    Err(Ds2432Error::ChecksumMismatch { expected, received })
}
