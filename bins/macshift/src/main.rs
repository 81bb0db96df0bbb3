//! macshift command - view and change network interface MAC addresses.

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use macshift::output::{OutputFormat, OutputOptions, Printable, Severity, print_all, write_status};
use macshift::{
    AddressChoice, Backend, ChangeRequest, ChangeResult, Config, Controller, MacAddress,
    SystemSurface, Target, is_valid_format, privilege,
};

/// Exit status when `--strict` is set and an interface change failed.
const EXIT_CHANGE_FAILED: i32 = 2;

#[derive(Parser)]
#[command(name = "macshift", version, about = "Change network interface MAC addresses")]
struct Cli {
    /// Interface to change. All interfaces when omitted.
    #[arg(short, long, value_name = "NAME")]
    interface: Option<String>,

    /// New MAC address (xx:xx:xx:xx:xx:xx). Random per interface when omitted.
    #[arg(short, long, value_name = "ADDRESS", value_parser = parse_mac)]
    mac: Option<MacAddress>,

    /// List interfaces and their addresses without changing anything.
    /// Only the named interface with `--interface`.
    #[arg(short, long, conflicts_with = "mac")]
    list: bool,

    /// Interface control tool: auto, ip or ifconfig.
    #[arg(short, long, default_value = "auto")]
    backend: Backend,

    /// Timeout for each external command, in seconds.
    #[arg(short, long, value_name = "SECS", default_value_t = 10)]
    timeout: u64,

    /// Output JSON.
    #[arg(short, long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short, long)]
    pretty: bool,

    /// Exit with status 2 if any interface change failed.
    #[arg(long)]
    strict: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Show debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mac(s: &str) -> Result<MacAddress, String> {
    if !is_valid_format(s) {
        return Err(format!(
            "'{}' is not six colon-separated pairs of hex digits (e.g. 00:11:22:33:44:55)",
            s
        ));
    }
    s.parse().map_err(|e: macshift::Error| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        color: !cli.no_color && !cli.json && atty::is(atty::Stream::Stdout),
        pretty: cli.pretty,
    };
    colored::control::set_override(opts.color);

    let config = Config::new()
        .with_backend(cli.backend)
        .with_command_timeout(Duration::from_secs(cli.timeout));

    match run(&cli, &config, format, &opts).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(
    cli: &Cli,
    config: &Config,
    format: OutputFormat,
    opts: &OutputOptions,
) -> anyhow::Result<i32> {
    let controller = Controller::new(SystemSurface::from_config(config)?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list {
        let links = match &cli.interface {
            Some(name) => vec![controller.get_link(name).await?],
            None => controller.get_links().await?,
        };
        print_all(&mut out, &links, format, opts)?;
        return Ok(0);
    }

    let request = ChangeRequest::new(cli.interface.clone(), cli.mac);
    for line in advisories(&request) {
        advise(&mut out, format, opts, Severity::Info, line)?;
    }

    let mut results: Vec<ChangeResult> = Vec::new();
    let mut write_err: Option<io::Error> = None;
    controller
        .change_address_each(&request, |result| {
            if format == OutputFormat::Text
                && let Err(e) = result.print_text(&mut out, opts)
            {
                write_err.get_or_insert(e);
            }
            results.push(result.clone());
        })
        .await?;

    if let Some(e) = write_err {
        return Err(e.into());
    }

    if format == OutputFormat::Json {
        print_all(&mut out, &results, format, opts)?;
    } else if results.is_empty() {
        write_status(
            &mut out,
            opts,
            Severity::Info,
            "no interface reports a hardware address; nothing to change",
        )?;
    }
    if results.iter().any(ChangeResult::was_refused) {
        advise(
            &mut out,
            format,
            opts,
            Severity::Error,
            "Some changes were refused for lack of privileges, rerun as root",
        )?;
    }
    out.flush()?;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "some interface changes failed");
        if cli.strict {
            return Ok(EXIT_CHANGE_FAILED);
        }
    }

    Ok(0)
}

/// Write an advisory line: stdout in text mode, stderr in JSON mode so the
/// JSON document stays clean.
fn advise<W: Write>(
    out: &mut W,
    format: OutputFormat,
    opts: &OutputOptions,
    severity: Severity,
    line: &str,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_status(out, opts, severity, line),
        OutputFormat::Json => {
            write_status(&mut io::stderr().lock(), &OutputOptions::default(), severity, line)
        }
    }
}

/// Advisory lines for fallbacks and missing privileges.
fn advisories(request: &ChangeRequest) -> Vec<&'static str> {
    let mut lines = Vec::new();

    if request.target == Target::All {
        lines.push("No interface specified, changing every interface that has a MAC address");
    }
    if request.address == AddressChoice::Random {
        lines.push("No MAC address specified, generating a random address per interface");
    }
    if !privilege::is_root() {
        lines.push("Not running as root, the change will likely be refused");
    }

    lines
}
