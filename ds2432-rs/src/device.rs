use crate::{
    BLOCK_SIZE, DATA_MEMORY_SIZE, Ds2432Error, Ds2432Result, FAMILY_CODE, PAGE_SIZE,
    REGISTER_PAGE_ADDRESS, REGISTRATION_NUMBER_ADDRESS, RegisterPage, SECRET_ADDRESS, Secret,
    commands,
    mac::{self, PAGE_DATA_LEN},
};
use embedded_hal::delay::DelayNs;
use embedded_onewire::OneWire;

/// A DS2432 on a 1-Wire bus.
///
/// Holds the ROM code that selects the device and the host copy of its
/// secret. The bus and a delay provider are borrowed per call, so one record
/// can be used with any [`OneWire`] master and the borrow serializes access
/// for the whole protocol sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds2432 {
    rom: u64,
    secret: Secret,
}

impl Ds2432 {
    /// Family code of the device.
    #[inline]
    pub const fn family() -> u8 {
        FAMILY_CODE
    }

    /// Creates a record for the device with ROM code `rom`, secret zeroed.
    pub const fn new(rom: u64) -> Self {
        Self {
            rom,
            secret: Secret::ZERO,
        }
    }

    /// Sets the secret used to authenticate writes.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secret = secret;
        self
    }

    /// ROM code of the device.
    pub const fn rom(&self) -> u64 {
        self.rom
    }

    /// ROM code in bus order: family code, 48-bit serial number, CRC.
    pub const fn serial(&self) -> [u8; 8] {
        self.rom.to_le_bytes()
    }

    /// Host copy of the secret.
    pub const fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Replaces the host copy of the secret. The device is not touched; use
    /// [`Ds2432::write_secret`] to install a new secret on the device.
    pub fn set_secret(&mut self, secret: Secret) {
        self.secret = secret;
    }

    /// Reads data memory starting at `address` into `buf`.
    ///
    /// The read stops at the end of the data memory.
    ///
    /// # Returns
    /// Number of bytes read, 0 if `address` is past the data memory.
    pub fn read<O: OneWire>(
        &self,
        bus: &mut O,
        address: u16,
        buf: &mut [u8],
    ) -> Ds2432Result<usize, O::BusError> {
        if address >= DATA_MEMORY_SIZE {
            return Ok(0);
        }
        let len = buf.len().min((DATA_MEMORY_SIZE - address) as usize);
        if len == 0 {
            return Ok(0);
        }
        commands::read_memory(bus, self.rom, address, &mut buf[..len])?;
        Ok(len)
    }

    /// Writes one 8-byte block at `address` through an authenticated copy.
    ///
    /// `address` must be block aligned and inside the data memory.
    ///
    /// # Errors
    /// Returns the error of the first step that fails. Nothing is written if
    /// the error occurs before the copy scratchpad command.
    pub fn write_block<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
        address: u16,
        data: &[u8; BLOCK_SIZE],
    ) -> Ds2432Result<(), O::BusError> {
        check_range(address, BLOCK_SIZE)?;
        let page_address = address & !(PAGE_SIZE as u16 - 1);
        let mut page = [0; PAGE_DATA_LEN];
        commands::read_memory(bus, self.rom, page_address, &mut page)?;

        commands::write_scratchpad(bus, self.rom, address, data)?;
        let scratchpad = commands::read_scratchpad(bus, self.rom)?;
        scratchpad.verify(address, Some(data))?;

        let message = mac::build_message(
            &self.secret,
            &scratchpad.data,
            address,
            &page,
            &self.serial(),
        );
        let mac = mac::transform(&message);
        commands::copy_scratchpad(bus, delay, self.rom, address, scratchpad.es, &mac)
    }

    /// Writes `data` starting at `address`, one block at a time.
    ///
    /// `address` must be block aligned, `data` a whole number of blocks, and
    /// the range must stay inside the data memory.
    ///
    /// # Errors
    /// Stops at the first block that fails. Blocks written before it stay
    /// committed.
    pub fn write<O: OneWire, D: DelayNs>(
        &self,
        bus: &mut O,
        delay: &mut D,
        address: u16,
        data: &[u8],
    ) -> Ds2432Result<(), O::BusError> {
        check_range(address, data.len())?;
        let mut block = [0; BLOCK_SIZE];
        for (address, chunk) in (address..)
            .step_by(BLOCK_SIZE)
            .zip(data.chunks_exact(BLOCK_SIZE))
        {
            block.copy_from_slice(chunk);
            self.write_block(bus, delay, address, &block)?;
        }
        Ok(())
    }

    /// Installs `secret` on the device with load first secret.
    ///
    /// The host copy is replaced only once the device accepted the secret.
    pub fn write_secret<O: OneWire, D: DelayNs>(
        &mut self,
        bus: &mut O,
        delay: &mut D,
        secret: Secret,
    ) -> Ds2432Result<(), O::BusError> {
        commands::write_scratchpad(bus, self.rom, SECRET_ADDRESS, secret.as_bytes())?;
        // the secret does not read back, only the target and E/S are checked
        let scratchpad = commands::read_scratchpad(bus, self.rom)?;
        scratchpad.verify(SECRET_ADDRESS, None)?;
        commands::load_first_secret(bus, delay, self.rom, scratchpad.address, scratchpad.es)?;
        bus.reset()?;
        self.secret = secret;
        log::debug!("secret loaded into {:016x}", self.rom);
        Ok(())
    }

    /// Reads the register page.
    pub fn read_register_page<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds2432Result<RegisterPage, O::BusError> {
        let mut page = RegisterPage::default();
        commands::read_memory(bus, self.rom, REGISTER_PAGE_ADDRESS, &mut page.0)?;
        bus.reset()?;
        Ok(page)
    }

    /// Reads the ROM code through the memory function readout.
    pub fn read_registration_number<O: OneWire>(
        &self,
        bus: &mut O,
    ) -> Ds2432Result<u64, O::BusError> {
        let mut rom = [0; 8];
        commands::read_memory(bus, self.rom, REGISTRATION_NUMBER_ADDRESS, &mut rom)?;
        Ok(u64::from_le_bytes(rom))
    }
}

fn check_range<E>(address: u16, len: usize) -> Ds2432Result<(), E> {
    let aligned = address as usize % BLOCK_SIZE == 0 && len % BLOCK_SIZE == 0;
    if !aligned || address as usize + len > DATA_MEMORY_SIZE as usize {
        log::error!("invalid write range: {} bytes at {:04x}", len, address);
        return Err(Ds2432Error::InvalidRange);
    }
    Ok(())
}
