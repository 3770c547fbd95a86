//! MAC computation for the copy scratchpad command.
//!
//! The DS2432 authenticates writes with the SHA-1 compression function as
//! given in its datasheet: one 512-bit block, no length padding of its own,
//! and without the final addition of the initial state to the result. The
//! output is therefore not a FIPS 180 SHA-1 digest and must not be used as one.

use core::fmt;

/// Length of the message fed to [`transform`].
pub const MESSAGE_LEN: usize = 64;

/// Bytes of the addressed page that take part in the MAC.
pub const PAGE_DATA_LEN: usize = 28;

const INITIAL_STATE: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

const K1: u32 = 0x5a827999; // rounds  0-19: sqrt(2) * 2^30
const K2: u32 = 0x6ed9eba1; // rounds 20-39: sqrt(3) * 2^30
const K3: u32 = 0x8f1bbcdc; // rounds 40-59: sqrt(5) * 2^30
const K4: u32 = 0xca62c1d6; // rounds 60-79: sqrt(10) * 2^30

// message[52..64], taken from the datasheet
const PADDING: [u8; 12] = [
    0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xb8,
];

/// The 8-byte device secret.
///
/// The device never reads it back; the host keeps its own copy to compute MACs.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Secret([u8; 8]);

impl Secret {
    /// All-zero secret.
    pub const ZERO: Self = Self([0; 8]);

    /// Wraps raw secret bytes.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl From<[u8; 8]> for Secret {
    fn from(value: [u8; 8]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// A 160-bit MAC, as the five working variables of the compression function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mac {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub e: u32,
}

impl Mac {
    /// Wire order of the MAC: words `e`, `d`, `c`, `b`, `a`, each little endian.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0; 20];
        for (chunk, word) in out
            .chunks_exact_mut(4)
            .zip([self.e, self.d, self.c, self.b, self.a])
        {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

#[inline]
fn choice(x: u32, y: u32, z: u32) -> u32 {
    z ^ (x & (y ^ z))
}

#[inline]
fn parity(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline]
fn majority(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (z & (x ^ y))
}

/// Runs the truncated SHA-1 compression over one 64-byte message.
pub fn transform(message: &[u8; MESSAGE_LEN]) -> Mac {
    let mut w = [0u32; 80];
    for (word, chunk) in w.iter_mut().zip(message.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = INITIAL_STATE;
    for (round, &word) in w.iter().enumerate() {
        let (f, k) = match round {
            0..20 => (choice(b, c, d), K1),
            20..40 => (parity(b, c, d), K2),
            40..60 => (majority(b, c, d), K3),
            _ => (parity(b, c, d), K4),
        };
        let t = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = t;
    }
    // The initial state is not added back in.
    Mac { a, b, c, d, e }
}

/// Lays out the MAC input for a copy scratchpad of `scratchpad` to `memory_page`.
///
/// `memory_page` is the target address of the copy. `page_data` holds the
/// first 28 bytes of the 32-byte page containing it, and `serial` the 64-bit
/// ROM code, family code first; its CRC byte is not used.
///
/// | Bytes | Content |
/// |-------|---------|
/// | 0-3 | secret\[0..4\] |
/// | 4-31 | page data |
/// | 32-39 | scratchpad |
/// | 40 | `(memory_page & 0xf0) >> 5` |
/// | 41-47 | family code and serial number |
/// | 48-51 | secret\[4..8\] |
/// | 52-63 | constant padding |
pub fn build_message(
    secret: &Secret,
    scratchpad: &[u8; 8],
    memory_page: u16,
    page_data: &[u8; PAGE_DATA_LEN],
    serial: &[u8; 8],
) -> [u8; MESSAGE_LEN] {
    let mut message = [0; MESSAGE_LEN];
    message[0..4].copy_from_slice(&secret.0[..4]);
    message[4..32].copy_from_slice(page_data);
    message[32..40].copy_from_slice(scratchpad);
    // Upper nibble 0000 for copy scratchpad. The datasheet asks for T8:T5 in
    // the lower nibble; devices in the field expect this exact shift.
    message[40] = ((memory_page & 0xf0) >> 5) as u8;
    message[41..48].copy_from_slice(&serial[..7]);
    message[48..52].copy_from_slice(&secret.0[4..]);
    message[52..].copy_from_slice(&PADDING);
    message
}
