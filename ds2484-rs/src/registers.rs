use crate::{Ds2484Error, Ds2484Result, traits::Interact};
use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use embedded_onewire::OneWireStatus;

pub(crate) const READ_PTR_CMD: u8 = 0xe1; // Set the read pointer
pub(crate) const DEVICE_STATUS_PTR: u8 = 0xf0; // Device status register
pub(crate) const DEVICE_RST_CMD: u8 = 0xf0; // Reset the device

/// A DS2484 I2C to 1-Wire bridge device.
///
/// Takes ownership of an I2C bus (implementing [`I2c`](embedded_hal::i2c::I2c) trait)
/// and a timer object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
pub struct Ds2484<I, D> {
    pub(crate) i2c: I,
    pub(crate) addr: u8,
    pub(crate) delay: D,
    pub(crate) retries: u8,
    pub(crate) reset: bool, // Device was reset and is not configured yet
    pub(crate) overdrive: bool,
    pub(crate) config: DeviceConfiguration,
}

/// Builder for creating a [`Ds2484`] instance with custom configuration.
pub struct Ds2484Builder {
    pub(crate) retries: u8,
    pub(crate) config: DeviceConfiguration,
}

impl Default for Ds2484Builder {
    fn default() -> Self {
        Ds2484Builder {
            retries: 100,
            config: DeviceConfiguration::new(),
        }
    }
}

impl Ds2484Builder {
    /// Sets the retry count for the device.
    ///
    /// The retry count is used to determine how long
    /// the host waits before operations on the 1-Wire
    /// or I2C bus time out.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the device configuration.
    ///
    /// The strong pull-up bit is ignored here; it is armed per byte through
    /// [`OneWire::strong_pullup`](embedded_onewire::OneWire::strong_pullup).
    pub fn with_config(mut self, config: DeviceConfiguration) -> Self {
        self.config = config.with_strong_pullup(false);
        self
    }

    /// Builds a new `Ds2484` instance with the specified configuration.
    pub fn build<I: I2c<SevenBitAddress>, D: DelayNs>(
        mut self,
        i2c: I,
        delay: D,
    ) -> Ds2484Result<Ds2484<I, D>, I::Error> {
        let mut dev = Ds2484 {
            i2c,
            addr: 0x18,
            delay,
            retries: self.retries,
            reset: false,
            overdrive: false,
            config: DeviceConfiguration::new(),
        };
        dev.bus_reset()?;
        self.config.write(&mut dev)?;
        dev.config = self.config;
        dev.overdrive = self.config.onewire_speed();
        Ok(dev)
    }
}

impl<I: I2c<SevenBitAddress>, D: DelayNs> Ds2484<I, D> {
    /// Get the status of the device.
    pub fn get_status(&mut self) -> Ds2484Result<DeviceStatus, I::Error> {
        let mut stat = DeviceStatus::default();
        stat.read(self)?;
        Ok(stat)
    }

    /// Reset the device.
    ///
    /// Performs a global reset of device state machine logic. Terminates any ongoing 1-Wire
    /// communication. The bridge refuses 1-Wire commands until its configuration is written again.
    pub fn bus_reset(&mut self) -> Ds2484Result<DeviceStatus, I::Error> {
        self.i2c.write(self.addr, &[DEVICE_RST_CMD])?;
        self.reset = true;
        let mut buf = [0; 1];
        for _ in 0..=self.retries {
            self.i2c.read(self.addr, &mut buf)?;
            let status = DeviceStatus::from_bits(buf[0]);
            if status.device_reset() {
                return Ok(status);
            }
            self.delay.delay_ms(1);
        }
        Err(Ds2484Error::RetriesExceeded)
    }

    /// Poll the status register until the 1-Wire line is idle.
    pub(crate) fn onewire_wait(&mut self) -> Ds2484Result<DeviceStatus, I::Error> {
        self.i2c
            .write(self.addr, &[READ_PTR_CMD, DEVICE_STATUS_PTR])?;
        let mut buf = [0; 1];
        for _ in 0..=self.retries {
            self.i2c.read(self.addr, &mut buf)?;
            let status = DeviceStatus::from_bits(buf[0]);
            if !status.onewire_busy() {
                return Ok(status);
            }
            self.delay.delay_ms(1);
        }
        Err(Ds2484Error::RetriesExceeded)
    }
}

/// Status register ([Table 3](https://www.analog.com/media/en/technical-documentation/data-sheets/ds2484.pdf)).
///
/// Read-only. Every 1-Wire command and the device reset position the read
/// pointer here, so the host can poll it with a bare I2C read.
#[bitfield(u8)]
pub struct DeviceStatus {
    /// 1WB: the 1-Wire line is busy with the last command.
    pub(crate) onewire_busy: bool,
    /// PPD: a presence pulse was seen during the last 1-Wire reset.
    present_pulse_detect: bool,
    /// SD: a short was seen during the last 1-Wire reset.
    pub(crate) short_detect: bool,
    /// LL: logic level of the 1-Wire line, sampled on every status read.
    pub logic_level: bool,
    /// RST: the bridge performed an internal reset and awaits a configuration write.
    pub device_reset: bool,
    /// SBR: single bit result.
    pub single_bit_result: bool,
    /// TSB: triplet second bit.
    pub triplet_second_bit: bool,
    /// DIR: branch direction taken by the last triplet.
    pub branch_dir_taken: bool,
}

impl OneWireStatus for DeviceStatus {
    fn presence(&self) -> bool {
        self.present_pulse_detect()
    }

    fn shortcircuit(&self) -> bool {
        self.short_detect()
    }

    fn logic_level(&self) -> Option<bool> {
        Some(DeviceStatus::logic_level(self))
    }
}

impl Interact for DeviceStatus {
    const WRITE_ADDR: u8 = 0x0;

    const READ_PTR: u8 = DEVICE_STATUS_PTR;

    fn read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds2484<I, D>,
    ) -> Result<(), Ds2484Error<I::Error>> {
        let mut buf = [0; 1];
        dev.i2c
            .write_read(dev.addr, &[READ_PTR_CMD, Self::READ_PTR], &mut buf)?;
        *self = Self::from_bits(buf[0]);
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        _dev: &mut Ds2484<I, D>,
    ) -> Result<(), Ds2484Error<I::Error>> {
        Ok(())
    }
}

#[bitfield(u8)]
/// # Device configuration register
///
/// Selects active pull-up (APU), 1-Wire power-down (PDN), strong pull-up
/// (SPU) and 1-Wire speed (1WS). SPU returns to 0 by itself once the strong
/// pull-up it armed has ended. Reads `00h` after a device reset.
pub struct DeviceConfiguration {
    /// APU: drive the line high through the low-impedance transistor instead
    /// of the weak pull-up resistor. Recommended for most buses.
    pub active_pullup: bool,
    /// PDN: remove power from the 1-Wire port, e.g. to force a power-on reset
    /// of the attached devices.
    pub power_down_1wire: bool,
    /// SPU: keep the line strongly pulled up after the next 1-Wire Write Byte,
    /// until the next 1-Wire command. Needed by EEPROMs while they copy the
    /// scratchpad or compute a SHA-1 MAC.
    pub strong_pullup: bool,
    /// 1WS: overdrive speed.
    pub onewire_speed: bool,
    #[bits(4)]
    __: u8,
}

/// The upper nibble of a configuration write carries the one's complement of the lower nibble.
const fn cfg_to_u8(cfg: u8) -> u8 {
    (cfg & 0x0f) | ((!cfg & 0x0f) << 4)
}

impl Interact for DeviceConfiguration {
    const WRITE_ADDR: u8 = 0xd2;
    const READ_PTR: u8 = 0xc3;

    fn read<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds2484<I, D>,
    ) -> Result<(), Ds2484Error<I::Error>> {
        let mut buf = [0; 1];
        dev.i2c
            .write_read(dev.addr, &[READ_PTR_CMD, Self::READ_PTR], &mut buf)?;
        *self = Self::from_bits(buf[0] & 0x0f);
        Ok(())
    }

    fn write<I: I2c<SevenBitAddress>, D: DelayNs>(
        &mut self,
        dev: &mut Ds2484<I, D>,
    ) -> Result<(), Ds2484Error<I::Error>> {
        dev.onewire_wait()?;
        let bits = self.into_bits() & 0x0f;
        let mut buf = [0; 1];
        dev.i2c
            .write_read(dev.addr, &[Self::WRITE_ADDR, cfg_to_u8(bits)], &mut buf)?;
        if buf[0] != bits {
            return Err(Ds2484Error::ConfigRejected {
                written: bits,
                read: buf[0],
            });
        }
        dev.reset = false;
        Ok(())
    }
}
