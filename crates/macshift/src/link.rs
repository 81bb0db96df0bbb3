//! Interface records as reported by the OS.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::mac::MacAddress;

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = 16;

/// Administrative state of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkState {
    /// Interface is up.
    Up,
    /// Interface is down.
    #[default]
    Down,
}

impl LinkState {
    /// Keyword used by `ip link set` and `ifconfig`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network interface and its hardware address, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Interface name.
    pub name: String,
    /// Current hardware address. `None` for loopback, tunnels and the like.
    pub address: Option<MacAddress>,
    /// Administrative state.
    pub state: LinkState,
}

impl Link {
    /// Create a link record.
    pub fn new(name: impl Into<String>, address: Option<MacAddress>, state: LinkState) -> Self {
        Self {
            name: name.into(),
            address,
            state,
        }
    }

    /// Get the interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the interface is up.
    pub fn is_up(&self) -> bool {
        self.state == LinkState::Up
    }

    /// Get the hardware address or fail with [`Error::AddressNotReported`].
    pub fn require_address(&self) -> Result<MacAddress> {
        self.address.ok_or_else(|| Error::AddressNotReported {
            name: self.name.clone(),
        })
    }
}

/// Map of interface name to hardware address.
pub type AddressMap = BTreeMap<String, MacAddress>;

/// Keep only links that report a hardware address.
pub fn address_map<'a>(links: impl IntoIterator<Item = &'a Link>) -> AddressMap {
    links
        .into_iter()
        .filter_map(|link| link.address.map(|mac| (link.name.clone(), mac)))
        .collect()
}

/// Validate an interface name before it reaches a command line.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInterfaceName("empty name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(Error::InvalidInterfaceName(format!(
            "{} is too long (max {} chars)",
            name,
            IFNAMSIZ - 1
        )));
    }

    if name.starts_with('-') {
        return Err(Error::InvalidInterfaceName(format!(
            "{} looks like an option",
            name
        )));
    }

    if name.contains('/') || name.contains('\0') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInterfaceName(format!(
            "{:?} contains invalid characters",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("eth0").is_ok());
        assert!(validate_name("wlp3s0").is_ok());
        assert!(validate_name("veth0@if2").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("a_very_long_interface_name").is_err());
        assert!(validate_name("eth 0").is_err());
        assert!(validate_name("eth/0").is_err());
        assert!(validate_name("-a").is_err());
    }

    #[test]
    fn test_address_map_skips_links_without_address() {
        let mac: MacAddress = "52:54:00:12:34:56".parse().unwrap();
        let links = vec![
            Link::new("eth0", Some(mac), LinkState::Up),
            Link::new("lo", None, LinkState::Up),
            Link::new("tun0", None, LinkState::Down),
        ];

        let map = address_map(&links);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("eth0"), Some(&mac));
    }

    #[test]
    fn test_require_address() {
        let link = Link::new("tun0", None, LinkState::Up);
        let err = link.require_address().unwrap_err();
        assert!(matches!(err, Error::AddressNotReported { ref name } if name == "tun0"));
    }
}
