//! In-memory link surface.
//!
//! Behaves like a host whose drivers only accept a new hardware address while
//! the link is down. Every mutating call is recorded so tests can assert on
//! exactly what would have been run.
//!
//! # Example
//!
//! ```ignore
//! use macshift::surface::FakeSurface;
//!
//! let surface = FakeSurface::new()
//!     .with_link("eth0", Some("52:54:00:12:34:56"))
//!     .with_link("tun0", None);
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use crate::command::CommandOutput;
use crate::error::{Error, Result};
use crate::link::{Link, LinkState};
use crate::mac::MacAddress;

use super::LinkSurface;

/// A mutating call made against a [`FakeSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    /// `set_link_state(name, state)`.
    SetState(String, LinkState),
    /// `set_link_address(name, mac)`.
    SetAddress(String, MacAddress),
}

/// Links held in memory.
#[derive(Debug, Default)]
pub struct FakeSurface {
    links: RefCell<Vec<Link>>,
    calls: RefCell<Vec<FakeCall>>,
    frozen: BTreeSet<String>,
    unlaunchable: BTreeSet<String>,
    stalled: BTreeSet<String>,
    broken_probe: bool,
}

impl FakeSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an up link with an optional hardware address.
    ///
    /// # Panics
    ///
    /// Panics if `mac` is not a valid address.
    pub fn with_link(self, name: &str, mac: Option<&str>) -> Self {
        let address = mac.map(|m| m.parse().expect("valid MAC in fixture"));
        self.links
            .borrow_mut()
            .push(Link::new(name, address, LinkState::Up));
        self
    }

    /// Accept address changes on `name` but never apply them.
    pub fn freeze_address(mut self, name: &str) -> Self {
        self.frozen.insert(name.to_string());
        self
    }

    /// Make address writes on `name` time out. State changes still work.
    pub fn stall_address(mut self, name: &str) -> Self {
        self.stalled.insert(name.to_string());
        self
    }

    /// Make every mutating command for `name` fail to launch.
    pub fn unlaunchable(mut self, name: &str) -> Self {
        self.unlaunchable.insert(name.to_string());
        self
    }

    /// Make the listing fail.
    pub fn broken_probe(mut self) -> Self {
        self.broken_probe = true;
        self
    }

    /// Get the current record for `name`.
    pub fn link(&self, name: &str) -> Option<Link> {
        self.links.borrow().iter().find(|l| l.name == name).cloned()
    }

    /// Every mutating call made so far.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: FakeCall, name: &str, args: &[&str]) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.unlaunchable.contains(name) {
            return Err(Error::CommandLaunch {
                command: format!("fake {}", args.join(" ")),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(())
    }
}

impl LinkSurface for FakeSurface {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_links(&self) -> Result<Vec<Link>> {
        if self.broken_probe {
            return Err(Error::probe("fake listing unavailable"));
        }
        Ok(self.links.borrow().clone())
    }

    async fn get_link_by_name(&self, name: &str) -> Result<Link> {
        self.link(name).ok_or_else(|| Error::InterfaceNotFound {
            name: name.to_string(),
        })
    }

    async fn set_link_state(&self, name: &str, state: LinkState) -> Result<CommandOutput> {
        let args = [name, state.as_str()];
        self.record(FakeCall::SetState(name.to_string(), state), name, &args)?;

        let mut links = self.links.borrow_mut();
        let Some(link) = links.iter_mut().find(|l| l.name == name) else {
            return Ok(CommandOutput::failed("fake", &args, 1, "Device not found"));
        };
        link.state = state;
        Ok(CommandOutput::ok("fake", &args, ""))
    }

    async fn set_link_address(&self, name: &str, mac: MacAddress) -> Result<CommandOutput> {
        let mac_text = mac.to_string();
        let args = [name, "address", mac_text.as_str()];
        self.record(FakeCall::SetAddress(name.to_string(), mac), name, &args)?;
        if self.stalled.contains(name) {
            return Err(Error::CommandTimeout {
                command: format!("fake {}", args.join(" ")),
                timeout: Duration::from_secs(1),
            });
        }

        let mut links = self.links.borrow_mut();
        let Some(link) = links.iter_mut().find(|l| l.name == name) else {
            return Ok(CommandOutput::failed("fake", &args, 1, "Device not found"));
        };
        if link.is_up() {
            return Ok(CommandOutput::failed(
                "fake",
                &args,
                2,
                "Device or resource busy",
            ));
        }
        if !self.frozen.contains(name) {
            link.address = Some(mac);
        }
        Ok(CommandOutput::ok("fake", &args, ""))
    }
}
