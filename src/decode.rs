//! Raw sample decoding.
//!
//! The sensor reports temperature as a big-endian 16-bit word. The upper 9 bits
//! carry the reading in half-degree steps, the lower 7 bits are fraction and
//! reserved bits.

/// Two bytes captured by one bus read, in wire order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample(pub [u8; 2]);

impl RawSample {
    pub const fn new(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    /// The raw 16-bit register value.
    pub const fn word(self) -> u16 {
        u16::from_be_bytes(self.0)
    }

    /// Temperature magnitude in whole degrees Celsius.
    ///
    /// Computes `(word >> 7) * 0.5`, truncated toward zero and then to 8 bits.
    /// Only readings at or above 0 °C are meaningful: the sensor encodes
    /// negative temperatures in two's complement, and those come out as
    /// 0 (for -0.5 °C) or as the wrapped 8-bit pattern of the negative value
    /// (e.g. -1 °C reads as 255). This is a known restriction of the
    /// above-freezing deployment, not something callers should rely on.
    pub const fn celsius(self) -> u8 {
        let half_degrees = (self.word() as i16) >> 7;
        (half_degrees / 2) as u8
    }
}

impl From<[u8; 2]> for RawSample {
    fn from(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_whole_degrees() {
        assert_eq!(RawSample::new([0x17, 0x00]).celsius(), 23);
        assert_eq!(RawSample::new([0x00, 0x00]).celsius(), 0);
        assert_eq!(RawSample::new([0x7D, 0x00]).celsius(), 125);
    }

    #[test]
    fn half_degree_bit_is_truncated() {
        // 23.5 °C: bit 7 of the low byte set
        assert_eq!(RawSample::new([0x17, 0x80]).celsius(), 23);
        // reserved low bits never contribute
        assert_eq!(RawSample::new([0x17, 0x7F]).celsius(), 23);
    }

    #[test]
    fn matches_reference_formula_over_non_negative_range() {
        for word in 0u16..=0x7FFF {
            let expected = (((word >> 7) as f32) * 0.5) as u8;
            let sample = RawSample::new(word.to_be_bytes());
            assert_eq!(sample.celsius(), expected, "word {word:#06x}");
        }
    }

    #[test]
    fn negative_readings_wrap() {
        // -0.5 °C truncates to zero
        assert_eq!(RawSample::new([0xFF, 0x80]).celsius(), 0);
        // -1 °C becomes the 8-bit pattern of -1
        assert_eq!(RawSample::new([0xFF, 0x00]).celsius(), 255);
    }

    #[test]
    fn word_is_big_endian() {
        assert_eq!(RawSample::from([0x12, 0x34]).word(), 0x1234);
    }
}
