#[derive(Debug, PartialEq, Eq)]
/// DS2484 Hardware Errors
pub enum Ds2484Error<E> {
    /// I2C bus errors.
    I2c(E),
    /// Busy wait retries exceeded.
    RetriesExceeded,
    /// The configuration register did not read back what was written.
    ConfigRejected {
        /// Value written to the lower nibble.
        written: u8,
        /// Value read back.
        read: u8,
    },
}

impl<E> From<E> for Ds2484Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}
