use super::{DecodedPayload, Point};

/// QR Code version (1-40, Model 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(u8);

impl Version {
    /// Build a version, rejecting numbers outside 1-40
    pub fn new(number: u8) -> Option<Self> {
        (1..=40).contains(&number).then_some(Self(number))
    }

    /// Get the version number
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Get the size in modules (width = height)
    pub fn size(&self) -> usize {
        4 * self.0 as usize + 17
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// Level from the two format-information indicator bits (01=L, 00=M, 11=Q, 10=H)
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPattern {
    /// (i + j) % 2 == 0
    Pattern0 = 0,
    /// i % 2 == 0
    Pattern1 = 1,
    /// j % 3 == 0
    Pattern2 = 2,
    /// (i + j) % 3 == 0
    Pattern3 = 3,
    /// (i/2 + j/3) % 2 == 0
    Pattern4 = 4,
    /// (i*j)%2 + (i*j)%3 == 0
    Pattern5 = 5,
    /// ((i*j)%2 + (i*j)%3) % 2 == 0
    Pattern6 = 6,
    /// ((i+j)%2 + (i*j)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// Get mask pattern from its three reference bits
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MaskPattern::Pattern0,
            1 => MaskPattern::Pattern1,
            2 => MaskPattern::Pattern2,
            3 => MaskPattern::Pattern3,
            4 => MaskPattern::Pattern4,
            5 => MaskPattern::Pattern5,
            6 => MaskPattern::Pattern6,
            _ => MaskPattern::Pattern7,
        }
    }
}

/// A decoded QR symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Decoded text
    pub payload: DecodedPayload,
    /// Symbol version, when the decoder reports one
    pub version: Option<Version>,
    /// Error correction level, when the decoder reports one
    pub error_correction: Option<ECLevel>,
    /// Mask pattern, when the decoder reports one
    pub mask: Option<MaskPattern>,
    /// Corner points in frame coordinates
    pub corners: [Point; 4],
}

impl Symbol {
    /// A symbol carrying only its payload
    pub fn from_payload(payload: impl Into<DecodedPayload>) -> Self {
        Self {
            payload: payload.into(),
            version: None,
            error_correction: None,
            mask: None,
            corners: [Point::default(); 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_size() {
        assert_eq!(Version::new(1).map(|v| v.size()), Some(21));
        assert_eq!(Version::new(2).map(|v| v.size()), Some(25));
        assert_eq!(Version::new(40).map(|v| v.size()), Some(177));
        assert!(Version::new(0).is_none());
        assert!(Version::new(41).is_none());
    }

    #[test]
    fn test_ec_level_format_bits() {
        assert_eq!(ECLevel::from_format_bits(0b01), ECLevel::L);
        assert_eq!(ECLevel::from_format_bits(0b00), ECLevel::M);
        assert_eq!(ECLevel::from_format_bits(0b11), ECLevel::Q);
        assert_eq!(ECLevel::from_format_bits(0b10), ECLevel::H);
    }

    #[test]
    fn test_mask_pattern() {
        assert_eq!(MaskPattern::from_bits(0), MaskPattern::Pattern0);
        assert_eq!(MaskPattern::from_bits(7), MaskPattern::Pattern7);
        assert_eq!(MaskPattern::from_bits(0b1011), MaskPattern::Pattern3);
    }

    #[test]
    fn test_payload_only_symbol() {
        let symbol = Symbol::from_payload("hi");
        assert_eq!(symbol.payload.as_str(), "hi");
        assert!(symbol.version.is_none());
    }
}
