use core::fmt;
use embedded_onewire::OneWireError;

/// What did not survive the scratchpad round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// The device echoed another target address.
    Address {
        /// Address that was written.
        expected: u16,
        /// Address the device reported.
        received: u16,
    },
    /// The partial flag of the ending status is set.
    PartialWrite,
    /// The staged data differs from what was written.
    Data,
}

/// DS2432 protocol errors.
#[derive(Debug, PartialEq, Eq)]
pub enum Ds2432Error<E> {
    /// The bus failed, or the device did not answer the reset/select handshake.
    Bus(OneWireError<E>),
    /// The device answered a load or copy command with an unknown status byte.
    UnexpectedStatus(u8),
    /// The inverted CRC-16 sent by the device does not match the transferred bytes.
    ChecksumMismatch {
        /// Inverted CRC-16 computed by the host.
        expected: u16,
        /// Inverted CRC-16 received from the device.
        received: u16,
    },
    /// The scratchpad read back does not match what was written.
    VerificationMismatch(Mismatch),
    /// The device computed another MAC, the copy did not take place.
    MacRejected,
    /// The MAC matched but the target page is write protected.
    WriteProtected,
    /// No free slot is left for another device record.
    AllocationFailure,
    /// The ROM code does not belong to a DS2432, or its CRC is invalid.
    UnsupportedDevice(u64),
    /// The write is not block aligned or leaves the data memory.
    InvalidRange,
}

impl<E> Ds2432Error<E> {
    /// Whether repeating the same operation may succeed.
    ///
    /// Bus, checksum and read-back faults are usually transient. A rejected
    /// MAC or a write protected page fails identically until the secret or
    /// the page protection changes.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Bus(_)
                | Self::UnexpectedStatus(_)
                | Self::ChecksumMismatch { .. }
                | Self::VerificationMismatch(_)
        )
    }
}

impl<E> From<OneWireError<E>> for Ds2432Error<E> {
    fn from(value: OneWireError<E>) -> Self {
        Self::Bus(value)
    }
}

impl<E> From<Mismatch> for Ds2432Error<E> {
    fn from(value: Mismatch) -> Self {
        Self::VerificationMismatch(value)
    }
}

impl<E: fmt::Debug> fmt::Display for Ds2432Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "1-Wire bus error: {e:?}"),
            Self::UnexpectedStatus(code) => write!(f, "unexpected device status {code:02x}"),
            Self::ChecksumMismatch { expected, received } => write!(
                f,
                "invalid checksum: received {received:04x} but expected {expected:04x}"
            ),
            Self::VerificationMismatch(Mismatch::Address { expected, received }) => write!(
                f,
                "scratchpad address {received:04x} (expected {expected:04x})"
            ),
            Self::VerificationMismatch(Mismatch::PartialWrite) => {
                f.write_str("scratchpad partial flag is set")
            }
            Self::VerificationMismatch(Mismatch::Data) => {
                f.write_str("scratchpad data does not match")
            }
            Self::MacRejected => f.write_str("copy scratchpad: invalid MAC"),
            Self::WriteProtected => f.write_str("copy scratchpad: page is write protected"),
            Self::AllocationFailure => f.write_str("no free device slot"),
            Self::UnsupportedDevice(rom) => write!(f, "ROM {rom:016x} is not a DS2432"),
            Self::InvalidRange => f.write_str("write is not block aligned or out of range"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn display_names_the_values() {
        let e = Ds2432Error::<()>::ChecksumMismatch {
            expected: 0xebcf,
            received: 0x1430,
        };
        assert_eq!(
            e.to_string(),
            "invalid checksum: received 1430 but expected ebcf"
        );
        assert_eq!(
            Ds2432Error::<()>::VerificationMismatch(Mismatch::Address {
                expected: 0x40,
                received: 0x48
            })
            .to_string(),
            "scratchpad address 0048 (expected 0040)"
        );
        assert_eq!(
            Ds2432Error::<()>::UnsupportedDevice(0x3d06050403020142).to_string(),
            "ROM 3d06050403020142 is not a DS2432"
        );
        assert_eq!(
            Ds2432Error::<()>::Bus(OneWireError::NoDevicePresent).to_string(),
            "1-Wire bus error: NoDevicePresent"
        );
    }

    #[test]
    fn permanent_outcomes_are_not_transient() {
        assert!(!Ds2432Error::<()>::MacRejected.is_transient());
        assert!(!Ds2432Error::<()>::WriteProtected.is_transient());
        assert!(!Ds2432Error::<()>::InvalidRange.is_transient());
        assert!(Ds2432Error::<()>::VerificationMismatch(Mismatch::Data).is_transient());
        assert!(Ds2432Error::<()>::Bus(OneWireError::NoDevicePresent).is_transient());
        assert!(Ds2432Error::<()>::UnexpectedStatus(0x12).is_transient());
        assert!(
            Ds2432Error::<()>::ChecksumMismatch {
                expected: 0,
                received: 1
            }
            .is_transient()
        );
    }
}
