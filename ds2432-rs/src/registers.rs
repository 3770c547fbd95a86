/// Returns true if a protection or mode byte holds one of the activation codes.
#[inline]
pub const fn is_activated(code: u8) -> bool {
    code == 0xaa || code == 0x55
}

/// Contents of the register page (`0x88..0x90`).
///
/// | Offset | Address | Function |
/// |--------|---------|----------|
/// | 0 | `0x88` | write protect secret |
/// | 1 | `0x89` | write protect pages 0 to 3 |
/// | 2 | `0x8A` | user byte, self protecting |
/// | 3 | `0x8B` | factory byte |
/// | 4 | `0x8C` | EPROM mode for page 1 |
/// | 5 | `0x8D` | write protect page 0 |
/// | 6-7 | `0x8E..0x90` | manufacturer ID |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterPage(pub [u8; 8]);

impl RegisterPage {
    /// The secret can no longer be loaded.
    pub const fn secret_write_protected(&self) -> bool {
        is_activated(self.0[0])
    }

    /// All data pages are write protected.
    pub const fn pages_write_protected(&self) -> bool {
        is_activated(self.0[1])
    }

    /// Raw user byte.
    pub const fn user_byte(&self) -> u8 {
        self.0[2]
    }

    /// The user byte protects itself once it holds an activation code.
    pub const fn user_byte_write_protected(&self) -> bool {
        is_activated(self.0[2])
    }

    /// Factory byte, `0xAA` or `0x55` from the factory.
    pub const fn factory_byte(&self) -> u8 {
        self.0[3]
    }

    /// Page 1 behaves as EPROM: bits can only be cleared.
    pub const fn page1_eprom_mode(&self) -> bool {
        is_activated(self.0[4])
    }

    /// Page 0 is write protected.
    pub const fn page0_write_protected(&self) -> bool {
        is_activated(self.0[5])
    }

    /// Manufacturer ID, little endian.
    pub const fn manufacturer_id(&self) -> u16 {
        u16::from_le_bytes([self.0[6], self.0[7]])
    }

    /// Whether data page `page` (0 to 3) refuses writes.
    ///
    /// Pages past the data memory always report protected.
    pub const fn page_write_protected(&self, page: u8) -> bool {
        match page {
            0 => self.pages_write_protected() || self.page0_write_protected(),
            1..=3 => self.pages_write_protected(),
            _ => true,
        }
    }
}

impl From<[u8; 8]> for RegisterPage {
    fn from(value: [u8; 8]) -> Self {
        Self(value)
    }
}
