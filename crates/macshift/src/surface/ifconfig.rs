//! net-tools `ifconfig` surface.
//!
//! Understands two listing layouts:
//!
//! ```text
//! eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
//!         inet 10.0.0.5  netmask 255.255.255.0  broadcast 10.0.0.255
//!         ether 52:54:00:12:34:56  txqueuelen 1000  (Ethernet)
//!
//! eth0      Link encap:Ethernet  HWaddr 52:54:00:12:34:56
//!           UP BROADCAST RUNNING MULTICAST  MTU:1500  Metric:1
//! ```
//!
//! A record starts on an unindented line and continues over indented lines.
//! The hardware address is the word after `ether` or `HWaddr`.

use winnow::combinator::{delimited, opt, preceded};
use winnow::prelude::*;
use winnow::token::{take_till, take_until};

use crate::command::{CommandOutput, CommandRunner, Runner};
use crate::error::{Error, Result};
use crate::link::{Link, LinkState, validate_name};
use crate::mac::{MacAddress, mac_address};
use crate::parse::{PResult, flags_contain_up, words};

use super::{LinkSurface, classify_show_failure, find_link};

/// Interface control through `ifconfig`.
#[derive(Debug, Clone)]
pub struct Ifconfig<R = CommandRunner> {
    runner: R,
    program: String,
}

impl<R: Runner> Ifconfig<R> {
    /// Create a surface running `program` through `runner`.
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    async fn list(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.program, args).await
    }
}

impl<R: Runner> LinkSurface for Ifconfig<R> {
    fn name(&self) -> &str {
        "ifconfig"
    }

    async fn get_links(&self) -> Result<Vec<Link>> {
        let out = self.list(&["-a"]).await.map_err(Error::into_probe)?;
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
        let out = self.list(&[name]).await?;
        if !out.success() {
            return Err(classify_show_failure(name, &out));
        }
        find_link(parse_links(&out.stdout)?, name)
    }

    async fn set_link_state(&self, name: &str, state: LinkState) -> Result<CommandOutput> {
        validate_name(name)?;
        self.runner
            .run(&self.program, &[name, state.as_str()])
            .await
    }

    async fn set_link_address(&self, name: &str, mac: MacAddress) -> Result<CommandOutput> {
        validate_name(name)?;
        let mac = mac.to_string();
        self.runner
            .run(&self.program, &[name, "hw", "ether", mac.as_str()])
            .await
    }
}

/// Parse `ifconfig` listing output into link records.
pub fn parse_links(text: &str) -> Result<Vec<Link>> {
    if text.trim().is_empty() {
        return Err(Error::probe("ifconfig produced no output"));
    }

    let mut links = Vec::new();
    for block in records(text)? {
        let link = parse_record(&block)?;
        // "eth0:1" is an address alias of eth0, not a separate link
        if link.name.contains(':') {
            continue;
        }
        links.push(link);
    }
    Ok(links)
}

/// Group lines into records: an unindented header plus indented continuations.
fn records(text: &str) -> Result<Vec<Vec<&str>>> {
    let mut records: Vec<Vec<&str>> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            match records.last_mut() {
                Some(record) => record.push(line),
                None => {
                    return Err(Error::probe(format!(
                        "unexpected ifconfig output: {:?}",
                        line.trim()
                    )));
                }
            }
        } else {
            records.push(vec![line]);
        }
    }

    Ok(records)
}

fn parse_record(lines: &[&str]) -> Result<Link> {
    let header = lines[0];
    let (name, flags) = record_header
        .parse_next(&mut &*header)
        .map_err(|_| Error::probe(format!("unexpected ifconfig header: {:?}", header)))?;
    // "eth0:" in the modern layout, bare "eth0" in the legacy one
    let name = name.strip_suffix(':').unwrap_or(name);

    let up = match flags {
        Some(flags) => flags_contain_up(flags),
        // Legacy layout lists flags as bare words
        None => lines.iter().any(|line| words(line).contains(&"UP")),
    };

    let address = lines.iter().find_map(|line| hardware_address(line));

    Ok(Link::new(
        name,
        address,
        if up { LinkState::Up } else { LinkState::Down },
    ))
}

/// Interface name and, when present, the `<...>` flag list.
fn record_header<'i>(input: &mut &'i str) -> PResult<(&'i str, Option<&'i str>)> {
    (
        take_till(1.., char::is_whitespace),
        opt(preceded(
            take_until(0.., '<'),
            delimited('<', take_till(0.., '>'), '>'),
        )),
    )
        .parse_next(input)
}

/// Find `ether <mac>` or `HWaddr <mac>` on a line.
fn hardware_address(line: &str) -> Option<MacAddress> {
    let words = words(line);
    words
        .windows(2)
        .filter(|pair| pair[0] == "ether" || pair[0] == "HWaddr")
        .find_map(|pair| mac_address.parse(pair[1]).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::scripted::ScriptedRunner;

    const MODERN: &str = "\
eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
        inet 10.0.0.5  netmask 255.255.255.0  broadcast 10.0.0.255
        inet6 fe80::5054:ff:fe12:3456  prefixlen 64  scopeid 0x20<link>
        ether 52:54:00:12:34:56  txqueuelen 1000  (Ethernet)
        RX packets 1203  bytes 1448910 (1.3 MiB)

lo: flags=73<UP,LOOPBACK,RUNNING>  mtu 65536
        inet 127.0.0.1  netmask 255.0.0.0
        loop  txqueuelen 1000  (Local Loopback)

wlan0: flags=4098<BROADCAST,MULTICAST>  mtu 1500
        ether a4:83:e7:0b:1c:2d  txqueuelen 1000  (Ethernet)

tun0: flags=4305<UP,POINTOPOINT,RUNNING,NOARP,MULTICAST>  mtu 1500
        inet 10.8.0.2  netmask 255.255.255.0  destination 10.8.0.2
        unspec 00-00-00-00-00-00-00-00-00-00-00-00-00-00-00-00  txqueuelen 500  (UNSPEC)
";

    const LEGACY: &str = "\
eth0      Link encap:Ethernet  HWaddr 00:1A:2B:3C:4D:5E
          inet addr:192.168.1.10  Bcast:192.168.1.255  Mask:255.255.255.0
          UP BROADCAST RUNNING MULTICAST  MTU:1500  Metric:1

lo        Link encap:Local Loopback
          inet addr:127.0.0.1  Mask:255.0.0.0
          UP LOOPBACK RUNNING  MTU:65536  Metric:1
";

    const ALIASED: &str = "\
eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
        inet 10.0.0.5  netmask 255.255.255.0  broadcast 10.0.0.255
        ether 52:54:00:12:34:56  txqueuelen 1000  (Ethernet)

eth0:1: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
        inet 10.0.0.9  netmask 255.255.255.0  broadcast 10.0.0.255
        ether 52:54:00:12:34:56  txqueuelen 1000  (Ethernet)
";

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_modern_layout() {
        let links = parse_links(MODERN).unwrap();
        let names: Vec<_> = links.iter().map(|l| l.name()).collect();
        assert_eq!(names, ["eth0", "lo", "wlan0", "tun0"]);

        assert_eq!(links[0].address, Some(mac("52:54:00:12:34:56")));
        assert!(links[0].is_up());
        assert_eq!(links[1].address, None);
        assert_eq!(links[2].address, Some(mac("a4:83:e7:0b:1c:2d")));
        assert!(!links[2].is_up());
        assert_eq!(links[3].address, None);
    }

    #[test]
    fn test_parse_legacy_layout() {
        let links = parse_links(LEGACY).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name(), "eth0");
        assert_eq!(links[0].address, Some(mac("00:1a:2b:3c:4d:5e")));
        assert!(links[0].is_up());
        assert_eq!(links[1].name(), "lo");
        assert_eq!(links[1].address, None);
    }

    #[test]
    fn test_aliases_are_not_links() {
        let links = parse_links(ALIASED).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name(), "eth0");
        assert_eq!(links[0].address, Some(mac("52:54:00:12:34:56")));
    }

    #[test]
    fn test_ethernet_word_is_not_an_address() {
        let text = "eth1: flags=4098<BROADCAST,MULTICAST>  mtu 1500\n        ether  txqueuelen 1000  (Ethernet)\n";
        let links = parse_links(text).unwrap();
        assert_eq!(links[0].address, None);
    }

    #[test]
    fn test_empty_output_is_probe_error() {
        assert!(matches!(parse_links(""), Err(Error::Probe { .. })));
        assert!(matches!(parse_links("  \n\n"), Err(Error::Probe { .. })));
    }

    #[test]
    fn test_orphan_continuation_is_probe_error() {
        let err = parse_links("        ether 52:54:00:12:34:56\n").unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_get_link_by_name_not_found() {
        let runner = ScriptedRunner::new().fail(
            "ifconfig eth9",
            1,
            "eth9: error fetching interface information: Device not found",
        );
        let surface = Ifconfig::new(runner, "ifconfig");
        let err = surface.get_link_by_name("eth9").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_listing_launch_failure_is_probe_error() {
        let runner = ScriptedRunner::new().missing("ifconfig -a");
        let surface = Ifconfig::new(runner, "ifconfig");
        let err = surface.get_links().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_set_address_command() {
        let runner = ScriptedRunner::new().ok("ifconfig eth0 hw ether 9a:8d:b9:ef:10:14", "");
        let surface = Ifconfig::new(runner, "ifconfig");
        let out = surface
            .set_link_address("eth0", mac("9a:8d:b9:ef:10:14"))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.command_line(), "ifconfig eth0 hw ether 9a:8d:b9:ef:10:14");
    }

    #[tokio::test]
    async fn test_set_state_command() {
        let runner = ScriptedRunner::new().ok("ifconfig eth0 down", "");
        let surface = Ifconfig::new(runner, "ifconfig");
        let out = surface
            .set_link_state("eth0", LinkState::Down)
            .await
            .unwrap();
        assert_eq!(out.command_line(), "ifconfig eth0 down");
    }
}
