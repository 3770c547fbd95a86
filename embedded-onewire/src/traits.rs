use crate::{
    OneWireCrc, OneWireError, OneWireResult,
    consts::{
        ONEWIRE_MATCH_ROM_CMD, ONEWIRE_MATCH_ROM_CMD_OD, ONEWIRE_READ_ROM_CMD,
        ONEWIRE_SKIP_ROM_CMD, ONEWIRE_SKIP_ROM_CMD_OD,
    },
};

/// Bus state reported by a 1-Wire master after a reset pulse.
pub trait OneWireStatus {
    /// A presence pulse was detected during the last reset.
    fn presence(&self) -> bool;
    /// A short circuit was detected during the last reset.
    fn shortcircuit(&self) -> bool;
    /// Logic level of the bus, if the master can sample it.
    fn logic_level(&self) -> Option<bool> {
        None
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails, or if no device
    /// answered with a presence pulse.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a byte to the 1-Wire bus.
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Reads a byte from the 1-Wire bus.
    /// # Returns
    /// Byte read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Check if the 1-Wire bus is in overdrive mode.
    fn get_overdrive_mode(&mut self) -> bool;

    /// Set the 1-Wire bus to overdrive mode.
    /// # Arguments
    /// * `enable` - A boolean indicating whether to enable or disable overdrive mode.
    fn set_overdrive_mode(&mut self, _enable: bool) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Arms a strong pull-up for the next byte written to the bus.
    ///
    /// Devices such as secured EEPROMs draw more current than the weak pull-up
    /// supplies while they copy or hash data internally. After the next
    /// [`OneWire::write_byte`] the master keeps the bus actively pulled up until
    /// the following 1-Wire operation.
    ///
    /// # Errors
    /// Returns [`OneWireError::Unimplemented`] if the master has no strong pull-up.
    fn strong_pullup(&mut self) -> OneWireResult<(), Self::BusError> {
        Err(OneWireError::Unimplemented)
    }

    /// Writes a sequence of bytes to the bus.
    fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &b in bytes.iter() {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fills `buf` with bytes read from the bus.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }

    /// Addresses devices on the 1-Wire bus.
    /// The first [`OneWire::read_byte`] or [`OneWire::write_byte`] operation of a transaction should be preceded by this method to address devices on the bus.
    /// Note: A [`OneWire::read_byte`] call will return garbage data if this method is called without specifying a ROM address on a bus with multiple devices.
    /// # Arguments
    /// * `rom` - The ROM address of the device to address. Pass [`None`] to skip ROM addressing and address all devices on the bus.
    fn address(&mut self, rom: Option<u64>) -> OneWireResult<(), Self::BusError> {
        let od = self.get_overdrive_mode();
        let cmd = match (rom.is_some(), od) {
            (true, true) => ONEWIRE_MATCH_ROM_CMD_OD,
            (true, false) => ONEWIRE_MATCH_ROM_CMD,
            (false, true) => ONEWIRE_SKIP_ROM_CMD_OD,
            (false, false) => ONEWIRE_SKIP_ROM_CMD,
        };
        let status = self.reset()?; // Reset the bus before addressing
        if status.shortcircuit() {
            return Err(OneWireError::ShortCircuit);
        }
        if !status.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(cmd)?;
        if let Some(rom) = rom {
            self.write_bytes(&rom.to_le_bytes())?;
        }
        Ok(())
    }

    /// Reads the ROM code of the only device on the bus.
    ///
    /// With more than one device present the wired-AND of all ROM codes is read,
    /// which fails the CRC check.
    ///
    /// | Bit | Description |
    /// |-----|-------------|
    /// | 0-7 | Family code (e.g., 0xb3 for DS2432) |
    /// | 8-55 | Serial number |
    /// | 56-63 | CRC-8 (`0b1_0001_1001` poly) |
    fn read_rom(&mut self) -> OneWireResult<u64, Self::BusError> {
        let status = self.reset()?;
        if !status.presence() {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0; 8];
        self.read_bytes(&mut rom)?;
        if !OneWireCrc::validate(&rom) {
            return Err(OneWireError::InvalidCrc);
        }
        Ok(u64::from_le_bytes(rom))
    }
}
