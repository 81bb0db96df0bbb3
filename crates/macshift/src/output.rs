//! Text and JSON output for links and change results.
//!
//! Text output is one status line per event, tagged by [`Severity`] and
//! colored when [`OutputOptions::color`] is set.

use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::change::{ChangeOutcome, ChangeResult};
use crate::error::Result;
use crate::link::Link;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable status lines.
    #[default]
    Text,
    /// JSON document.
    Json,
}

/// Output options.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Color status lines.
    pub color: bool,
    /// Pretty print JSON.
    pub pretty: bool,
}

/// Category of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Advisory or progress message.
    Info,
    /// Something worked.
    Success,
    /// Something failed.
    Error,
}

impl Severity {
    fn tag(&self) -> &'static str {
        match self {
            Self::Info => "[*]",
            Self::Success => "[+]",
            Self::Error => "[-]",
        }
    }

    fn color(&self) -> Color {
        match self {
            Self::Info => Color::Yellow,
            Self::Success => Color::Green,
            Self::Error => Color::Red,
        }
    }
}

/// Write one tagged status line.
///
/// Lines are colored only when `opts.color` is set. Whether `colored` then
/// emits escapes follows its global override, which the binary sets from
/// the same flag.
pub fn write_status<W: Write>(
    w: &mut W,
    opts: &OutputOptions,
    severity: Severity,
    message: &str,
) -> io::Result<()> {
    let line = format!("{} {}", severity.tag(), message);
    if opts.color {
        writeln!(w, "{}", line.color(severity.color()))
    } else {
        writeln!(w, "{}", line)
    }
}

/// Something that can be printed as text or converted to JSON.
pub trait Printable {
    /// Write the text form.
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> io::Result<()>;

    /// Build the JSON form.
    fn to_json(&self) -> serde_json::Value;
}

impl Printable for Link {
    fn print_text<W: Write>(&self, w: &mut W, _opts: &OutputOptions) -> io::Result<()> {
        let address = self
            .address
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(w, "{:<16} {:<17} {}", self.name, address, self.state)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ifname": self.name,
            "address": self.address.map(|m| m.to_string()),
            "state": self.state.as_str(),
        })
    }
}

impl Printable for ChangeResult {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> io::Result<()> {
        match &self.outcome {
            ChangeOutcome::Success => write_status(
                w,
                opts,
                Severity::Success,
                &format!(
                    "{}: MAC address was successfully changed to {}",
                    self.interface, self.requested
                ),
            ),
            ChangeOutcome::Mismatch => {
                let observed = self
                    .observed
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "nothing".to_string());
                let mut message = format!(
                    "{}: MAC address was not changed (requested {}, interface reports {})",
                    self.interface, self.requested, observed
                );
                if let Some(cmd) = self.first_failed_command() {
                    message.push_str(&format!(
                        "; `{}`: {}",
                        cmd.command_line(),
                        cmd.failure_summary()
                    ));
                }
                write_status(w, opts, Severity::Error, &message)
            }
            ChangeOutcome::Failed { stage, reason } => write_status(
                w,
                opts,
                Severity::Error,
                &format!("{}: change failed at {}: {}", self.interface, stage, reason),
            ),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "ifname": self.interface,
            "requested": self.requested.to_string(),
            "previous": self.previous.map(|m| m.to_string()),
            "observed": self.observed.map(|m| m.to_string()),
            "success": self.is_success(),
            "refused": self.was_refused(),
        });

        match &self.outcome {
            ChangeOutcome::Success => obj["outcome"] = serde_json::json!("success"),
            ChangeOutcome::Mismatch => obj["outcome"] = serde_json::json!("mismatch"),
            ChangeOutcome::Failed { stage, reason } => {
                obj["outcome"] = serde_json::json!("failed");
                obj["stage"] = serde_json::json!(stage.as_str());
                obj["reason"] = serde_json::json!(reason);
            }
        }

        obj["commands"] = self
            .commands
            .iter()
            .map(|c| {
                serde_json::json!({
                    "command": c.command_line(),
                    "status": c.status,
                    "stderr": c.stderr.trim(),
                })
            })
            .collect();

        obj
    }
}

/// Print a list of items in the requested format.
pub fn print_all<T: Printable, W: Write>(
    w: &mut W,
    items: &[T],
    format: OutputFormat,
    opts: &OutputOptions,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for item in items {
                item.print_text(w, opts)?;
            }
        }
        OutputFormat::Json => {
            let value = serde_json::Value::Array(items.iter().map(Printable::to_json).collect());
            if opts.pretty {
                serde_json::to_writer_pretty(&mut *w, &value)?;
            } else {
                serde_json::to_writer(&mut *w, &value)?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}
