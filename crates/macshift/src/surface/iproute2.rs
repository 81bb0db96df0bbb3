//! iproute2 `ip` surface.
//!
//! Listings use the one-record-per-line `-o` format:
//!
//! ```text
//! 2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP ...\    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
//! ```
//!
//! Only `link/ether` counts as a hardware address; loopback and tunnel
//! link types are reported without one.

use winnow::ascii::digit1;
use winnow::combinator::delimited;
use winnow::prelude::*;
use winnow::token::take_till;

use crate::command::{CommandOutput, CommandRunner, Runner};
use crate::error::{Error, Result};
use crate::link::{Link, LinkState, validate_name};
use crate::mac::{MacAddress, mac_address};
use crate::parse::{PResult, flags_contain_up, words};

use super::{LinkSurface, classify_show_failure, find_link};

/// Interface control through `ip link`.
#[derive(Debug, Clone)]
pub struct IpRoute2<R = CommandRunner> {
    runner: R,
    program: String,
}

impl<R: Runner> IpRoute2<R> {
    /// Create a surface running `program` through `runner`.
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    async fn link(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("link");
        full.extend_from_slice(args);
        self.runner.run(&self.program, &full).await
    }
}

impl<R: Runner> LinkSurface for IpRoute2<R> {
    fn name(&self) -> &str {
        "ip"
    }

    async fn get_links(&self) -> Result<Vec<Link>> {
        let out = self
            .runner
            .run(&self.program, &["-o", "link", "show"])
            .await
            .map_err(Error::into_probe)?;
        if !out.success() {
            return Err(Error::probe(format!(
                "`{}` failed: {}",
                out.command_line(),
                out.failure_summary()
            )));
        }
        parse_links(&out.stdout)
    }

    async fn get_link_by_name(&self, name: &str) -> Result<Link> {
        validate_name(name)?;
        let out = self
            .runner
            .run(&self.program, &["-o", "link", "show", "dev", name])
            .await?;
        if !out.success() {
            return Err(classify_show_failure(name, &out));
        }
        find_link(parse_links(&out.stdout)?, name)
    }

    async fn set_link_state(&self, name: &str, state: LinkState) -> Result<CommandOutput> {
        validate_name(name)?;
        self.link(&["set", "dev", name, state.as_str()]).await
    }

    async fn set_link_address(&self, name: &str, mac: MacAddress) -> Result<CommandOutput> {
        validate_name(name)?;
        let mac = mac.to_string();
        self.link(&["set", "dev", name, "address", mac.as_str()]).await
    }
}

/// Parse `ip -o link show` output into link records.
pub fn parse_links(text: &str) -> Result<Vec<Link>> {
    if text.trim().is_empty() {
        return Err(Error::probe("ip produced no output"));
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<Link> {
    let mut rest = line;
    let (name, flags) = link_header
        .parse_next(&mut rest)
        .map_err(|_| Error::probe(format!("unexpected ip output: {:?}", line)))?;

    // "veth0@if2" names the peer after the '@'
    let name = name.split_once('@').map_or(name, |(name, _)| name);

    let words = words(rest);
    let address = words
        .windows(2)
        .filter(|pair| pair[0] == "link/ether")
        .find_map(|pair| mac_address.parse(pair[1]).ok());

    let state = if flags_contain_up(flags) {
        LinkState::Up
    } else {
        LinkState::Down
    };

    Ok(Link::new(name, address, state))
}

/// `<index>: <name>: <FLAGS>`
fn link_header<'i>(input: &mut &'i str) -> PResult<(&'i str, &'i str)> {
    (
        digit1,
        ": ",
        take_till(1.., ':'),
        ": ",
        delimited('<', take_till(0.., '>'), '>'),
    )
        .map(|(_, _, name, _, flags)| (name, flags))
        .parse_next(input)
}
