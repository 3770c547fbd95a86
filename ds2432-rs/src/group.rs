use crate::{Ds2432, Ds2432Error, Ds2432Result, FAMILY_CODE};
use embedded_onewire::OneWireCrc;

/// Fixed capacity table of [`Ds2432`] records, looked up by ROM code.
#[derive(Debug)]
pub struct Ds2432Group<const N: usize> {
    devices: [Ds2432; N],
    count: usize,
}

impl<const N: usize> Default for Ds2432Group<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Ds2432Group<N> {
    /// Creates an empty group.
    pub const fn new() -> Self {
        Self {
            devices: [const { Ds2432::new(0) }; N],
            count: 0,
        }
    }

    /// Adds a record for `rom`, with the secret zeroed.
    ///
    /// Attaching a ROM code twice returns the existing record.
    ///
    /// # Errors
    /// [`Ds2432Error::UnsupportedDevice`] if the family code or the CRC of
    /// `rom` is wrong, [`Ds2432Error::AllocationFailure`] if all slots are in
    /// use.
    pub fn attach<E>(&mut self, rom: u64) -> Ds2432Result<&mut Ds2432, E> {
        let bytes = rom.to_le_bytes();
        if bytes[0] != FAMILY_CODE || !OneWireCrc::validate(&bytes) {
            log::error!("attach: {:016x} is not a DS2432", rom);
            return Err(Ds2432Error::UnsupportedDevice(rom));
        }
        let idx = match self.position(rom) {
            Some(idx) => idx,
            None if self.count == N => {
                log::error!("attach: no slot left for {:016x} ({} in use)", rom, N);
                return Err(Ds2432Error::AllocationFailure);
            }
            None => {
                self.devices[self.count] = Ds2432::new(rom);
                self.count += 1;
                log::debug!("attached {:016x}", rom);
                self.count - 1
            }
        };
        Ok(&mut self.devices[idx])
    }

    /// Removes the record for `rom` and returns it.
    pub fn detach(&mut self, rom: u64) -> Option<Ds2432> {
        let idx = self.position(rom)?;
        let removed = core::mem::replace(&mut self.devices[idx], Ds2432::new(0));
        self.devices[idx..self.count].rotate_left(1);
        self.count -= 1;
        Some(removed)
    }

    /// Record for `rom`.
    pub fn get(&self, rom: u64) -> Option<&Ds2432> {
        self.position(rom).map(|idx| &self.devices[idx])
    }

    /// Mutable record for `rom`.
    pub fn get_mut(&mut self, rom: u64) -> Option<&mut Ds2432> {
        self.position(rom).map(|idx| &mut self.devices[idx])
    }

    /// Number of attached devices.
    pub fn len(&self) -> usize {
        self.count
    }

    /// No device is attached.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Attached records, in attach order.
    pub fn iter(&self) -> impl Iterator<Item = &Ds2432> {
        self.devices[..self.count].iter()
    }

    fn position(&self, rom: u64) -> Option<usize> {
        self.devices[..self.count]
            .iter()
            .position(|dev| dev.rom() == rom)
    }
}
