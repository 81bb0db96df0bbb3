//! Interface control surfaces.
//!
//! A [`LinkSurface`] is everything the controller needs from the host: list
//! links, look one up, change its administrative state and set its hardware
//! address. Host state is only ever touched through one of these, so tests can
//! substitute an in-memory surface.
//!
//! # Surfaces
//!
//! - [`IpRoute2`] - iproute2 `ip link`
//! - [`Ifconfig`] - net-tools `ifconfig`
//! - [`SystemSurface`] - whichever of the two a [`Config`] selects
//! - `FakeSurface` - in-memory links (`fake` feature)

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::command::{CommandOutput, CommandRunner};
use crate::config::{Backend, Config};
use crate::error::{Error, Result};
use crate::link::{Link, LinkState};
use crate::mac::MacAddress;

#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod ifconfig;
pub mod iproute2;

#[cfg(any(test, feature = "fake"))]
pub use fake::FakeSurface;
pub use ifconfig::Ifconfig;
pub use iproute2::IpRoute2;

/// Directories searched after `PATH`; `ip` and `ifconfig` often live in sbin.
const SBIN_DIRS: &[&str] = &["/usr/sbin", "/sbin", "/usr/bin", "/bin"];

/// The four host capabilities the controller relies on.
pub trait LinkSurface {
    /// Short name of the surface, for logs.
    fn name(&self) -> &str;

    /// List every link, with or without a hardware address.
    ///
    /// Fails with [`Error::Probe`] if the listing cannot be obtained or parsed.
    fn get_links(&self) -> impl Future<Output = Result<Vec<Link>>>;

    /// Look up a single link.
    ///
    /// Fails with [`Error::InterfaceNotFound`] if it does not exist.
    fn get_link_by_name(&self, name: &str) -> impl Future<Output = Result<Link>>;

    /// Bring a link up or down.
    fn set_link_state(
        &self,
        name: &str,
        state: LinkState,
    ) -> impl Future<Output = Result<CommandOutput>>;

    /// Set a link's hardware address.
    fn set_link_address(
        &self,
        name: &str,
        mac: MacAddress,
    ) -> impl Future<Output = Result<CommandOutput>>;
}

/// The surface selected at runtime from a [`Config`].
#[derive(Debug, Clone)]
pub enum SystemSurface {
    /// iproute2 `ip`.
    IpRoute2(IpRoute2),
    /// `ifconfig`.
    Ifconfig(Ifconfig),
}

impl SystemSurface {
    /// Build the surface named by `config`, resolving `Backend::Auto` by
    /// looking for `ip` first and `ifconfig` second.
    pub fn from_config(config: &Config) -> Result<Self> {
        let runner = CommandRunner::new(config.command_timeout);

        let backend = match config.backend {
            Backend::Auto => {
                if find_program("ip").is_some() {
                    Backend::IpRoute2
                } else if find_program("ifconfig").is_some() {
                    Backend::Ifconfig
                } else {
                    return Err(Error::probe("neither `ip` nor `ifconfig` was found"));
                }
            }
            other => other,
        };

        let surface = match backend {
            Backend::IpRoute2 => Self::IpRoute2(IpRoute2::new(runner, program_path("ip"))),
            Backend::Ifconfig | Backend::Auto => {
                Self::Ifconfig(Ifconfig::new(runner, program_path("ifconfig")))
            }
        };
        tracing::debug!(surface = surface.name(), "selected interface control surface");

        Ok(surface)
    }
}

impl LinkSurface for SystemSurface {
    fn name(&self) -> &str {
        match self {
            Self::IpRoute2(s) => s.name(),
            Self::Ifconfig(s) => s.name(),
        }
    }

    async fn get_links(&self) -> Result<Vec<Link>> {
        match self {
            Self::IpRoute2(s) => s.get_links().await,
            Self::Ifconfig(s) => s.get_links().await,
        }
    }

    async fn get_link_by_name(&self, name: &str) -> Result<Link> {
        match self {
            Self::IpRoute2(s) => s.get_link_by_name(name).await,
            Self::Ifconfig(s) => s.get_link_by_name(name).await,
        }
    }

    async fn set_link_state(&self, name: &str, state: LinkState) -> Result<CommandOutput> {
        match self {
            Self::IpRoute2(s) => s.set_link_state(name, state).await,
            Self::Ifconfig(s) => s.set_link_state(name, state).await,
        }
    }

    async fn set_link_address(&self, name: &str, mac: MacAddress) -> Result<CommandOutput> {
        match self {
            Self::IpRoute2(s) => s.set_link_address(name, mac).await,
            Self::Ifconfig(s) => s.set_link_address(name, mac).await,
        }
    }
}

/// Locate `program` on `PATH` or in the usual sbin directories.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path)
        .chain(SBIN_DIRS.iter().map(PathBuf::from))
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn program_path(program: &str) -> String {
    find_program(program)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Turn a failed single-interface query into the matching error.
pub(crate) fn classify_show_failure(name: &str, out: &CommandOutput) -> Error {
    let stderr = out.stderr.to_ascii_lowercase();
    if stderr.contains("does not exist")
        || stderr.contains("device not found")
        || stderr.contains("no such device")
    {
        Error::InterfaceNotFound {
            name: name.to_string(),
        }
    } else {
        Error::probe(format!(
            "`{}` failed: {}",
            out.command_line(),
            out.failure_summary()
        ))
    }
}

/// Pick `name` out of a parsed single-interface listing.
pub(crate) fn find_link(links: Vec<Link>, name: &str) -> Result<Link> {
    links
        .into_iter()
        .find(|link| link.name == name)
        .ok_or_else(|| Error::InterfaceNotFound {
            name: name.to_string(),
        })
}
