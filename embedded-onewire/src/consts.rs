//! Command constants for 1-Wire communication.

/// Command to read the ROM code of the only device on a single-drop bus.
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// The Overdrive-Match ROM command followed by a 64-bit
/// ROM sequence transmitted at overdrive speed addresses a
/// specific device on a multidrop bus and simultaneously puts
/// it in overdrive mode. Devices already in overdrive mode stay
/// there; every overdrive-capable device returns to standard
/// speed at the next reset pulse of at least 480μs.
pub const ONEWIRE_MATCH_ROM_CMD_OD: u8 = 0x69;

/// Skip ROM at overdrive speed. Everything following this
/// command has to happen at overdrive speed until a reset
/// pulse of at least 480μs returns the bus to standard speed.
pub const ONEWIRE_SKIP_ROM_CMD_OD: u8 = 0x3c;
