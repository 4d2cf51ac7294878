use rand_core::{OsRng, RngCore};

/// Produces cryptographically random certificate serial numbers.
///
/// Serials are drawn as 159-bit positive integers: 20 random bytes with the
/// top bit cleared. One bit of the 160 is reserved so the value can never be
/// misread as negative in a signed big-integer encoding, per X.509
/// serial-number conventions.
#[derive(Debug, Default)]
pub struct SerialNumberSource;

impl SerialNumberSource {
    pub const SERIAL_BYTES: usize = 20;

    /// Draw a fresh random serial number.
    pub fn next_serial(&self) -> [u8; Self::SERIAL_BYTES] {
        let mut bytes = [0u8; Self::SERIAL_BYTES];
        OsRng.fill_bytes(&mut bytes);
        bytes[0] &= 0x7f;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_at_most_159_bits() {
        let source = SerialNumberSource;
        for _ in 0..64 {
            let serial = source.next_serial();
            assert_eq!(serial[0] & 0x80, 0);
        }
    }

    #[test]
    fn serials_are_distinct() {
        let source = SerialNumberSource;
        let a = source.next_serial();
        let b = source.next_serial();
        assert_ne!(a, b);
    }
}
