use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

mod capture;
mod output;
mod packet;
mod rules;

#[derive(Parser)]
#[command(name = "snimatch-filter")]
#[command(about = "Match live TLS traffic whose SNI hostname matches glob rules")]
struct Cli {
    /// Network interface to capture on (e.g., eth0, wlan0).
    /// If omitted, lists available interfaces and exits.
    #[arg(short, long)]
    interface: Option<String>,

    /// BPF filter expression
    #[arg(short, long, default_value = "tcp port 443")]
    filter: String,

    /// Enable promiscuous mode (capture all traffic on the segment)
    #[arg(short, long, default_value_t = false)]
    promisc: bool,

    /// Snap length — max bytes captured per packet
    #[arg(short, long, default_value_t = 1600)]
    snaplen: i32,

    /// Path to a JSON rules file (an array of {name, pattern, invert})
    #[arg(short, long, conflicts_with = "pattern")]
    rules: Option<std::path::PathBuf>,

    /// Ad-hoc glob pattern to match against the SNI hostname
    #[arg(short = 'P', long)]
    pattern: Option<String>,

    /// Invert the ad-hoc pattern (match hostnames that do NOT match it)
    #[arg(short = 'n', long, default_value_t = false, requires = "pattern")]
    invert: bool,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Only print segments on which at least one rule matched
    #[arg(long, default_value_t = false)]
    matches_only: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let iface = match cli.interface {
        Some(name) => name,
        None => {
            capture::list_interfaces()?;
            return Ok(());
        }
    };

    let format = output::OutputFormat::parse(&cli.output)?;

    let rules = if let Some(path) = &cli.rules {
        rules::load_rules(path)?
    } else if let Some(pattern) = &cli.pattern {
        rules::compile(vec![rules::RuleSpec {
            name: "cli".to_string(),
            pattern: pattern.clone(),
            invert: cli.invert,
            protocol: "tcp".to_string(),
        }])?
    } else {
        bail!("Either --rules or --pattern is required");
    };

    info!("Loaded {} rule(s)", rules.len());
    info!("Capturing on interface: {}", iface);
    info!("BPF filter: {}", cli.filter);
    info!("Press Ctrl+C to stop\n");

    capture::run_capture(
        &iface,
        &cli.filter,
        cli.promisc,
        cli.snaplen,
        &rules,
        format,
        cli.matches_only,
    )
}
