use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use artnode_core::protocols::artnet;
use artnode_core::{
    ARTNET_PORT, ChannelFrame, DMX_MAX_SLOTS, Node, NodeConfig, NodeEvent, Outcome, Session,
    UdpTransport,
};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{Level, debug, warn};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("ARTNODE_BUILD_COMMIT"),
    ", built ",
    env!("ARTNODE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "artnode")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Art-Net node: receive DMX with merge lock, answer discovery, send frames.",
    long_about = None,
    after_help = "Examples:\n  artnode listen --address 192.168.1.40 --subnet-mask 255.255.255.0 --universe 0x01\n  artnode send --to 192.168.1.40 --levels 255,128,0\n  artnode decode datagram.bin --universe 1"
)]
struct Cli {
    /// Log protocol decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a node on UDP and print one JSON line per channel update.
    Listen(ListenArgs),
    /// Send ArtDmx frames to a node.
    Send(SendArgs),
    /// Classify a raw Art-Net datagram stored in a file.
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct ListenArgs {
    /// JSON node configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local address to bind
    #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    bind: Ipv4Addr,

    /// UDP port to bind and reply on (default 6454)
    #[arg(long)]
    port: Option<u16>,

    /// Address reported in discovery replies
    #[arg(long)]
    address: Option<Ipv4Addr>,

    /// Reply to the directed broadcast of --address/--subnet-mask
    #[arg(long, conflicts_with = "broadcast")]
    subnet_mask: Option<Ipv4Addr>,

    /// Reply to this broadcast address instead of the poller
    #[arg(long)]
    broadcast: Option<Ipv4Addr>,

    /// Universe byte (subnet in the high nibble), decimal or 0x-hex
    #[arg(long, value_parser = parse_u8, conflicts_with_all = ["subnet", "net_universe"])]
    universe: Option<u8>,

    /// Subnet nibble (0-15)
    #[arg(long, requires = "net_universe", value_parser = clap::value_parser!(u8).range(0..16))]
    subnet: Option<u8>,

    /// Universe nibble within the subnet (0-15)
    #[arg(long, requires = "subnet", value_parser = clap::value_parser!(u8).range(0..16))]
    net_universe: Option<u8>,

    /// Short name reported in discovery replies
    #[arg(long)]
    short_name: Option<String>,

    /// Long name reported in discovery replies
    #[arg(long)]
    long_name: Option<String>,

    /// Exit after this many channel updates
    #[arg(long)]
    count: Option<u64>,

    /// Fail when no datagram arrives within this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Destination node address
    #[arg(long)]
    to: Ipv4Addr,

    /// Destination UDP port
    #[arg(long, default_value_t = ARTNET_PORT)]
    port: u16,

    /// Universe byte (subnet in the high nibble), decimal or 0x-hex
    #[arg(long, value_parser = parse_u8, default_value = "0")]
    universe: u8,

    /// Comma-separated levels for slots 1..N
    #[arg(long, value_delimiter = ',', required = true)]
    levels: Vec<u8>,

    /// Number of frames to send
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Delay between frames in milliseconds
    #[arg(long, default_value_t = 25)]
    interval_ms: u64,

    /// Local address to send from
    #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    bind: Ipv4Addr,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// File (or glob matching one file) holding one UDP payload
    input: PathBuf,

    /// Universe the node is listening on, decimal or 0x-hex
    #[arg(long, value_parser = parse_u8, default_value = "0")]
    universe: u8,

    /// Sender address to attribute the datagram to
    #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    sender: Ipv4Addr,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Listen(args) => cmd_listen(args),
        Commands::Send(args) => cmd_send(args),
        Commands::Decode(args) => cmd_decode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

/// One JSON line per channel update.
#[derive(Debug, Serialize)]
struct LevelsReport {
    received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
    universe: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u8>,
    slot_count: u16,
    levels: Vec<u8>,
}

impl LevelsReport {
    fn new(frame: &ChannelFrame, sender: Option<Ipv4Addr>) -> Self {
        Self {
            received_at: now_rfc3339(),
            sender: sender.map(|ip| ip.to_string()),
            universe: frame.universe,
            sequence: frame.sequence_number(),
            slot_count: frame.slot_count,
            levels: frame.levels().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DecodeReport {
    NotProtocol,
    DataFrame {
        sender: String,
        universe: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        sequence: Option<u8>,
        slot_count: u16,
        levels: Vec<u8>,
    },
    Poll,
    Address {
        short_name: String,
        long_name: String,
        universe_select: u8,
        subnet_select: u8,
        command: u8,
    },
    Other {
        opcode: u16,
    },
}

impl From<Outcome> for DecodeReport {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::NotProtocol => DecodeReport::NotProtocol,
            Outcome::DataFrame(dmx) => DecodeReport::DataFrame {
                sender: dmx.sender.to_string(),
                universe: dmx.frame.universe,
                sequence: dmx.frame.sequence_number(),
                slot_count: dmx.frame.slot_count,
                levels: dmx.frame.levels().to_vec(),
            },
            Outcome::Poll => DecodeReport::Poll,
            Outcome::Address(address) => DecodeReport::Address {
                short_name: address.short_name,
                long_name: address.long_name,
                universe_select: address.universe_select,
                subnet_select: address.subnet_select,
                command: address.command.code(),
            },
            Outcome::Other(opcode) => DecodeReport::Other { opcode },
        }
    }
}

fn cmd_listen(args: ListenArgs) -> Result<(), CliError> {
    let config = resolve_node_config(&args)?;
    let session = config.session().map_err(|err| {
        CliError::new(
            format!("invalid node configuration: {err}"),
            Some("check --config and the name/broadcast flags".to_string()),
        )
    })?;
    if session.local_address().is_unspecified() {
        warn!("no --address given; discovery replies will report 0.0.0.0");
    }

    let bind = SocketAddrV4::new(args.bind, config.port);
    let transport = UdpTransport::bind(bind).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("is another Art-Net application using the port? try --port".to_string()),
        )
    })?;
    transport
        .set_read_timeout(args.timeout_ms.map(Duration::from_millis))
        .context("Failed to configure socket timeout")?;
    debug!(%bind, universe = session.universe(), "listening");

    let mut node = Node::new(session, transport).with_port(config.port);
    let mut updates = 0u64;
    while args.count.is_none_or(|count| updates < count) {
        let event = node.poll().context("Failed to receive datagram")?;
        if event.levels_changed() {
            let sender = match event {
                NodeEvent::Dmx { sender } => Some(sender),
                _ => None,
            };
            let report = LevelsReport::new(node.session().frame(), sender);
            println!("{}", serialize_json(&report, args.pretty)?);
            updates += 1;
        } else if event == NodeEvent::Idle {
            if let Some(timeout) = args.timeout_ms {
                return Err(CliError::new(
                    format!("no Art-Net datagram within {timeout} ms"),
                    Some("check the sender's destination address and universe".to_string()),
                ));
            }
        }
    }
    Ok(())
}

fn resolve_node_config(args: &ListenArgs) -> Result<NodeConfig, CliError> {
    let mut config = match args.config.as_ref() {
        Some(path) => NodeConfig::from_json_file(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("see `artnode listen --help` for the config fields".to_string()),
            )
        })?,
        None => NodeConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(address) = args.address {
        config.address = address;
    } else if config.address.is_unspecified() && !args.bind.is_unspecified() {
        config.address = args.bind;
    }
    if let Some(mask) = args.subnet_mask {
        config.subnet_mask = Some(mask);
        config.broadcast = None;
    }
    if let Some(broadcast) = args.broadcast {
        config.broadcast = Some(broadcast);
        config.subnet_mask = None;
    }
    if let Some(universe) = args.universe {
        config.universe = universe;
    }
    if let (Some(subnet), Some(universe)) = (args.subnet, args.net_universe) {
        config.universe = (subnet << 4) | universe;
    }
    if let Some(name) = args.short_name.as_ref() {
        config.short_name.clone_from(name);
    }
    if let Some(name) = args.long_name.as_ref() {
        config.long_name.clone_from(name);
    }
    Ok(config)
}

fn cmd_send(args: SendArgs) -> Result<(), CliError> {
    if args.levels.len() > DMX_MAX_SLOTS {
        return Err(CliError::new(
            format!("{} levels given, a universe holds {}", args.levels.len(), DMX_MAX_SLOTS),
            Some("split the levels across universes".to_string()),
        ));
    }
    if args.repeat == 0 {
        return Err(CliError::new(
            "--repeat must be at least 1",
            Some("omit --repeat to send a single frame".to_string()),
        ));
    }

    let mut session = Session::new(args.bind);
    session.set_universe(args.universe);
    session
        .set_slot_count(args.levels.len() as u16)
        .context("Failed to size frame")?;
    for (slot, level) in (1u16..).zip(args.levels.iter()) {
        session.set_slot(slot, *level).context("Failed to set level")?;
    }

    let transport = UdpTransport::bind(SocketAddrV4::new(args.bind, 0))
        .context("Failed to open sending socket")?;
    let mut node = Node::new(session, transport).with_port(args.port);
    for frame in 0..args.repeat {
        if frame > 0 {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
        node.send_dmx(args.to)
            .with_context(|| format!("Failed to send to {}:{}", args.to, args.port))?;
    }

    if !args.quiet {
        eprintln!(
            "OK: sent {} frame(s) -> {}:{}",
            args.repeat, args.to, args.port
        );
    }
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved = resolve_input_path(&args.input)?;
    validate_input_file(&resolved)?;
    let payload = fs::read(&resolved)
        .with_context(|| format!("Failed to read input file: {}", resolved.display()))?;

    let outcome = artnet::classify(&payload, args.sender, args.universe);
    let report = DecodeReport::from(outcome);
    println!("{}", serialize_json(&report, args.pretty)?);
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn parse_u8(raw: &str) -> Result<u8, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    parsed.map_err(|err| format!("expected 0-255 or 0x00-0xff: {err}"))
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a file containing one raw UDP payload".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a file containing one raw UDP payload".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        n => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if n > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({n} matches); matches: {listed}{more}"),
                Some("pass a single datagram file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
