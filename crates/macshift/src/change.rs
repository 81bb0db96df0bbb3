//! Change requests and their per-interface results.

use std::fmt;

use crate::command::CommandOutput;
use crate::mac::MacAddress;

/// Which interfaces a change applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every interface that reports a hardware address.
    All,
    /// One named interface.
    Named(String),
}

/// Where the new address comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressChoice {
    /// Use this address for every target.
    Explicit(MacAddress),
    /// Generate a fresh address for each target.
    Random,
}

/// A target paired with an address choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// Interfaces to change.
    pub target: Target,
    /// Address to apply.
    pub address: AddressChoice,
}

impl ChangeRequest {
    /// Build a request from optional CLI-style inputs. A missing interface
    /// means all interfaces; a missing address means random.
    pub fn new(interface: Option<String>, mac: Option<MacAddress>) -> Self {
        Self {
            target: interface.map_or(Target::All, Target::Named),
            address: mac.map_or(AddressChoice::Random, AddressChoice::Explicit),
        }
    }

    /// Change one interface to a specific address.
    pub fn explicit(interface: impl Into<String>, mac: MacAddress) -> Self {
        Self {
            target: Target::Named(interface.into()),
            address: AddressChoice::Explicit(mac),
        }
    }
}

/// Steps of a single interface change, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeStage {
    /// Target resolved, nothing touched yet.
    Selected,
    /// Link brought down.
    Down,
    /// Hardware address written.
    AddressSet,
    /// Link brought back up.
    Up,
    /// Address read back and compared.
    Verified,
}

impl ChangeStage {
    /// Lowercase stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Down => "down",
            Self::AddressSet => "address-set",
            Self::Up => "up",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for ChangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single interface change ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The interface now reports the requested address.
    Success,
    /// Every step ran but the interface reports a different address.
    Mismatch,
    /// A step could not be carried out.
    Failed {
        /// Stage at which the change stopped.
        stage: ChangeStage,
        /// Why it stopped.
        reason: String,
    },
}

/// Result of changing one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeResult {
    /// Interface name.
    pub interface: String,
    /// Address that was requested.
    pub requested: MacAddress,
    /// Address before the change.
    pub previous: Option<MacAddress>,
    /// Address read back after the change.
    pub observed: Option<MacAddress>,
    /// Outcome.
    pub outcome: ChangeOutcome,
    /// Every command run for this interface, in order.
    pub commands: Vec<CommandOutput>,
    /// A step could not be launched for lack of privileges.
    pub refused: bool,
}

impl ChangeResult {
    pub(crate) fn new(interface: &str, requested: MacAddress, previous: Option<MacAddress>) -> Self {
        Self {
            interface: interface.to_string(),
            requested,
            previous,
            observed: None,
            // Overwritten once verification runs
            outcome: ChangeOutcome::Failed {
                stage: ChangeStage::Selected,
                reason: "not attempted".to_string(),
            },
            commands: Vec::new(),
            refused: false,
        }
    }

    /// Check if the interface now has the requested address.
    pub fn is_success(&self) -> bool {
        self.outcome == ChangeOutcome::Success
    }

    /// Check if the change was refused for lack of privileges.
    pub fn was_refused(&self) -> bool {
        self.refused || self.commands.iter().any(CommandOutput::is_permission_denied)
    }

    /// The first command that exited unsuccessfully, if any.
    pub fn first_failed_command(&self) -> Option<&CommandOutput> {
        self.commands.iter().find(|c| !c.success())
    }
}
