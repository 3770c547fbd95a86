use crc::{CRC_16_ARC, Crc};

#[derive(Debug, Default)]
/// Calculate CRC-8 used in 1-Wire communications.
pub struct OneWireCrc(u8);

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        let mut crc = self.0 ^ byte; // XOR the byte with the current CRC value
        for _ in 0..8 {
            if crc & 0x1 == 0x1 {
                crc = (crc >> 1) ^ 0x8c; // Polynomial for CRC-8
            } else {
                crc >>= 1;
            }
        }
        self.0 = crc;
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        let mut crc = OneWireCrc(0);
        for &byte in sequence.iter() {
            crc.update(byte);
        }
        crc.0 == 0x0 // If the last byte is the CRC of the rest, the result is 0
    }
}

static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

/// CRC-16 used by 1-Wire memory devices (`x^16 + x^15 + x^2 + 1`, reflected, zero seed).
///
/// Devices transmit the one's complement of this value, least significant byte first.
#[derive(Debug)]
pub struct OneWireCrc16;

impl OneWireCrc16 {
    /// CRC-16 of `frame`.
    pub fn checksum(frame: &[u8]) -> u16 {
        CRC16.checksum(frame)
    }

    /// The two CRC bytes a device sends after `frame`, in bus order.
    pub fn inverted(frame: &[u8]) -> [u8; 2] {
        (!Self::checksum(frame)).to_le_bytes()
    }

    /// Validate the two CRC bytes a device sent after `frame`.
    pub fn validate(frame: &[u8], received: [u8; 2]) -> bool {
        received == Self::inverted(frame)
    }
}
