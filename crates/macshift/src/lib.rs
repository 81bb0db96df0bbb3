//! View and rewrite network interface hardware (MAC) addresses.
//!
//! This crate lists interfaces and their hardware addresses, validates or
//! generates replacement addresses, and applies them by cycling a link down,
//! writing the address and bringing it back up, then reading the address back
//! to verify the change. The host is driven through an external tool (`ip` or
//! `ifconfig`) behind the [`LinkSurface`](surface::LinkSurface) trait.
//!
//! # Features
//!
//! - `output` - JSON/text output formatting
//! - `fake` - in-memory [`FakeSurface`](surface::FakeSurface) for tests
//!
//! # Example
//!
//! ```ignore
//! use macshift::{ChangeRequest, Config, Controller, SystemSurface};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> macshift::Result<()> {
//!     let controller = Controller::new(SystemSurface::from_config(&Config::default())?);
//!
//!     // Random address for every interface
//!     for result in controller.change_address(&ChangeRequest::new(None, None)).await? {
//!         println!("{}: {:?}", result.interface, result.outcome);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Changes are not persistent: a reboot or driver reload restores the
//! factory address.

pub mod change;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod link;
pub mod mac;
pub mod privilege;
pub mod surface;

mod parse;

#[cfg(feature = "output")]
pub mod output;

pub use change::{AddressChoice, ChangeOutcome, ChangeRequest, ChangeResult, ChangeStage, Target};
pub use config::{Backend, Config};
pub use controller::Controller;
pub use error::{Error, Result};
pub use link::{AddressMap, Link, LinkState};
pub use mac::{MacAddress, generate_random_address, is_valid_format};
pub use surface::{LinkSurface, SystemSurface};
