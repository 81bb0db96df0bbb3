//! MAC address type, validation and random generation.
//!
//! Text form is always six colon-separated groups of exactly two hex digits.
//! Parsing accepts either case; formatting is lowercase.
//!
//! # Example
//!
//! ```
//! use macshift::mac::{MacAddress, is_valid_format};
//!
//! assert!(is_valid_format("00:11:22:33:44:55"));
//! assert!(!is_valid_format("00:11:22:33:44"));
//!
//! let mac: MacAddress = "9A:8D:B9:EF:10:14".parse().unwrap();
//! assert_eq!(mac.to_string(), "9a:8d:b9:ef:10:14");
//!
//! let random = MacAddress::random();
//! assert!(random.is_unicast());
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use winnow::combinator::separated;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::{Error, Result};
use crate::parse::PResult;

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Multicast (group) bit of the first octet.
    const MULTICAST_BIT: u8 = 0x01;
    /// Locally administered bit of the first octet.
    const LOCAL_BIT: u8 = 0x02;

    /// Create a MAC address from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get the raw octets.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Generate a random unicast address using the thread-local RNG.
    pub fn random() -> Self {
        Self::random_with(&mut rand::rng())
    }

    /// Generate a random address from the given RNG.
    ///
    /// Eleven of the twelve hex digits are uniform over `0-9a-f`. The second
    /// digit of the first octet is uniform over `0,2,4,6,8,a,c,e`, which keeps
    /// the multicast bit clear.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut octets = [0u8; 6];
        rng.fill(&mut octets);
        octets[0] &= !Self::MULTICAST_BIT;
        Self(octets)
    }

    /// Check if this is a unicast address.
    pub fn is_unicast(&self) -> bool {
        self.0[0] & Self::MULTICAST_BIT == 0
    }

    /// Check if the locally administered bit is set.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & Self::LOCAL_BIT != 0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl From<MacAddress> for [u8; 6] {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let octets = mac_octets
            .parse(s)
            .map_err(|_| Error::InvalidMac(s.to_string()))?;
        let octets: [u8; 6] = octets
            .try_into()
            .map_err(|_| Error::InvalidMac(s.to_string()))?;
        Ok(Self(octets))
    }
}

/// Generate a random unicast address.
pub fn generate_random_address() -> MacAddress {
    MacAddress::random()
}

/// Check that `candidate` is six colon-separated groups of two hex digits.
///
/// This is purely syntactic. Vendor prefixes and multicast or broadcast bits
/// are not inspected.
pub fn is_valid_format(candidate: &str) -> bool {
    mac_octets.parse(candidate).is_ok()
}

/// One octet: exactly two hex digits.
fn octet(input: &mut &str) -> PResult<u8> {
    take_while(2, |c: char| c.is_ascii_hexdigit())
        .try_map(|digits| u8::from_str_radix(digits, 16))
        .parse_next(input)
}

/// Six octets separated by colons.
pub(crate) fn mac_octets(input: &mut &str) -> PResult<Vec<u8>> {
    separated(6, octet, ':').parse_next(input)
}

/// A MAC address token embedded in a larger line.
pub(crate) fn mac_address(input: &mut &str) -> PResult<MacAddress> {
    let octets = mac_octets.parse_next(input)?;
    let mut raw = [0u8; 6];
    raw.copy_from_slice(&octets);
    Ok(MacAddress(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const UNICAST_DIGITS: &str = "02468ace";

    #[test]
    fn test_valid_format_examples() {
        assert!(is_valid_format("00:11:22:33:44:55"));
        assert!(is_valid_format("AA:bb:Cc:dD:ee:FF"));
        assert!(!is_valid_format("00:11:22:33:44"));
        assert!(!is_valid_format("00:11:22:33:44:5"));
        assert!(!is_valid_format("gg:11:22:33:44:55"));
    }

    #[test]
    fn test_invalid_format_edges() {
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("00:11:22:33:44:55:66"));
        assert!(!is_valid_format("00:11:22:33:44:555"));
        assert!(!is_valid_format("00-11-22-33-44-55"));
        assert!(!is_valid_format("00:11:22:33:44:55 "));
        assert!(!is_valid_format("0:11:22:33:44:55"));
        assert!(!is_valid_format("001122334455"));
    }

    #[test]
    fn test_parse_and_display_lowercase() {
        let mac: MacAddress = "9A:8D:B9:EF:10:14".parse().unwrap();
        assert_eq!(mac.octets(), [0x9a, 0x8d, 0xb9, 0xef, 0x10, 0x14]);
        assert_eq!(mac.to_string(), "9a:8d:b9:ef:10:14");
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        let err = "00:11:22:33:44".parse::<MacAddress>().unwrap_err();
        assert!(matches!(err, Error::InvalidMac(ref s) if s == "00:11:22:33:44"));
    }

    #[test]
    fn test_generated_addresses_are_valid_unicast() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let mac = MacAddress::random_with(&mut rng);
            let text = mac.to_string();
            assert!(is_valid_format(&text), "{text}");
            assert!(mac.is_unicast());

            let second_digit = text.chars().nth(1).unwrap();
            assert!(UNICAST_DIGITS.contains(second_digit), "{text}");
        }
    }

    #[test]
    fn test_generated_second_digit_covers_even_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..2000 {
            let text = MacAddress::random_with(&mut rng).to_string();
            seen.insert(text.chars().nth(1).unwrap());
        }
        assert_eq!(seen.into_iter().collect::<String>(), UNICAST_DIGITS);
    }

    #[test]
    fn test_generated_addresses_differ() {
        let a = generate_random_address();
        let b = generate_random_address();
        let c = generate_random_address();
        assert!(a != b || b != c);
    }

    #[test]
    fn test_bits() {
        let mac = MacAddress::new([0x02, 0, 0, 0, 0, 1]);
        assert!(mac.is_unicast());
        assert!(mac.is_locally_administered());

        let mac = MacAddress::new([0x01, 0x00, 0x5e, 0, 0, 1]);
        assert!(!mac.is_unicast());
        assert!(!mac.is_locally_administered());
    }
}
