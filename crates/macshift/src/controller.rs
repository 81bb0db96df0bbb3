//! Interface controller: enumeration, verification and change orchestration.
//!
//! Each target interface goes through
//! `Selected -> Down -> AddressSet -> Up -> Verified`, one interface at a
//! time. Nothing here retries; every interface gets exactly one attempt per
//! call.
//!
//! # Example
//!
//! ```ignore
//! use macshift::{ChangeRequest, Config, Controller, SystemSurface};
//!
//! let surface = SystemSurface::from_config(&Config::default())?;
//! let controller = Controller::new(surface);
//!
//! for (name, mac) in controller.list_interfaces().await? {
//!     println!("{name}: {mac}");
//! }
//!
//! let results = controller
//!     .change_address(&ChangeRequest::explicit("eth0", "9a:8d:b9:ef:10:14".parse()?))
//!     .await?;
//! ```

use std::future::Future;

use tracing::{debug, info, warn};

use crate::change::{
    AddressChoice, ChangeOutcome, ChangeRequest, ChangeResult, ChangeStage, Target,
};
use crate::command::CommandOutput;
use crate::error::{Error, Result};
use crate::link::{AddressMap, Link, LinkState, address_map, validate_name};
use crate::mac::MacAddress;
use crate::surface::LinkSurface;

/// Drives a [`LinkSurface`].
#[derive(Debug)]
pub struct Controller<S> {
    surface: S,
}

impl<S: LinkSurface> Controller<S> {
    /// Create a controller over `surface`.
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Get the underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// List every link, including those without a hardware address.
    pub async fn get_links(&self) -> Result<Vec<Link>> {
        self.surface.get_links().await.map_err(Error::into_probe)
    }

    /// Map every interface that reports a hardware address to that address.
    pub async fn list_interfaces(&self) -> Result<AddressMap> {
        let links = self.get_links().await?;
        Ok(address_map(&links))
    }

    /// Look up a single link by name.
    pub async fn get_link(&self, name: &str) -> Result<Link> {
        validate_name(name)?;
        self.surface.get_link_by_name(name).await
    }

    /// Read the current hardware address of `name`.
    pub async fn get_address(&self, name: &str) -> Result<MacAddress> {
        self.get_link(name).await?.require_address()
    }

    /// Apply `request` and collect one result per target interface.
    ///
    /// Fails only if the targets cannot be resolved: a listing failure, or
    /// an explicitly named interface that does not exist. Per-interface
    /// failures are reported in the results.
    pub async fn change_address(&self, request: &ChangeRequest) -> Result<Vec<ChangeResult>> {
        let mut results = Vec::new();
        self.change_address_each(request, |result| results.push(result.clone()))
            .await?;
        Ok(results)
    }

    /// Like [`change_address`](Self::change_address), but hands each result
    /// to `on_result` as soon as its interface is done.
    pub async fn change_address_each<F>(
        &self,
        request: &ChangeRequest,
        mut on_result: F,
    ) -> Result<()>
    where
        F: FnMut(&ChangeResult),
    {
        let targets = self.resolve(&request.target).await?;
        debug!(count = targets.len(), "resolved change targets");

        for link in &targets {
            let result = self.change_link(link, request.address).await;
            on_result(&result);
        }

        Ok(())
    }

    async fn resolve(&self, target: &Target) -> Result<Vec<Link>> {
        match target {
            Target::All => {
                let links = self.get_links().await?;
                Ok(links.into_iter().filter(|l| l.address.is_some()).collect())
            }
            Target::Named(name) => Ok(vec![self.get_link(name).await?]),
        }
    }

    /// Run the full state machine for one link.
    pub async fn change_link(&self, link: &Link, choice: AddressChoice) -> ChangeResult {
        let name = link.name.as_str();
        let requested = match choice {
            AddressChoice::Explicit(mac) => mac,
            AddressChoice::Random => random_unlike(link.address),
        };
        let mut result = ChangeResult::new(name, requested, link.address);
        info!(
            interface = name,
            %requested,
            stage = %ChangeStage::Selected,
            "changing hardware address"
        );

        if let Err(e) = self
            .step(
                &mut result,
                ChangeStage::Down,
                self.surface.set_link_state(name, LinkState::Down),
            )
            .await
        {
            return fail(result, ChangeStage::Down, e);
        }

        if let Err(e) = self
            .step(
                &mut result,
                ChangeStage::AddressSet,
                self.surface.set_link_address(name, requested),
            )
            .await
        {
            self.restore_up(&mut result).await;
            return fail(result, ChangeStage::AddressSet, e);
        }

        if let Err(e) = self
            .step(
                &mut result,
                ChangeStage::Up,
                self.surface.set_link_state(name, LinkState::Up),
            )
            .await
        {
            return fail(result, ChangeStage::Up, e);
        }

        match self.get_address(name).await {
            Ok(observed) => {
                result.observed = Some(observed);
                result.outcome = if observed == requested {
                    ChangeOutcome::Success
                } else {
                    ChangeOutcome::Mismatch
                };
            }
            Err(e) => return fail(result, ChangeStage::Verified, e),
        }

        info!(
            interface = name,
            stage = %ChangeStage::Verified,
            success = result.is_success(),
            observed = ?result.observed.map(|m| m.to_string()),
            "change finished"
        );
        result
    }

    /// Await one external step and record its output.
    async fn step(
        &self,
        result: &mut ChangeResult,
        stage: ChangeStage,
        command: impl Future<Output = Result<CommandOutput>>,
    ) -> Result<()> {
        let out = command.await?;
        if out.success() {
            debug!(interface = %result.interface, %stage, "step done");
        } else {
            warn!(
                interface = %result.interface,
                %stage,
                command = %out.command_line(),
                "step exited unsuccessfully: {}",
                out.failure_summary()
            );
        }
        result.commands.push(out);
        Ok(())
    }

    /// Best-effort attempt to leave the link up after a failed address write.
    async fn restore_up(&self, result: &mut ChangeResult) {
        let restored = self
            .surface
            .set_link_state(&result.interface, LinkState::Up)
            .await;
        match restored {
            Ok(out) => result.commands.push(out),
            Err(e) => warn!(interface = %result.interface, "could not bring link back up: {}", e),
        }
    }
}

fn fail(mut result: ChangeResult, stage: ChangeStage, err: Error) -> ChangeResult {
    if err.is_timeout() {
        warn!(interface = %result.interface, %stage, "step timed out: {}", err);
    } else if err.is_permission_denied() {
        warn!(interface = %result.interface, %stage, "step refused, run as root: {}", err);
        result.refused = true;
    } else {
        warn!(interface = %result.interface, %stage, "change failed: {}", err);
    }
    result.outcome = ChangeOutcome::Failed {
        stage,
        reason: err.to_string(),
    };
    result
}

/// A random address that differs from `current`.
fn random_unlike(current: Option<MacAddress>) -> MacAddress {
    loop {
        let mac = MacAddress::random();
        if Some(mac) != current {
            return mac;
        }
    }
}
