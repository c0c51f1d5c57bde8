use anyhow::{bail, Context, Result};
use pcap::{Capture, Device};
use tracing::{debug, error};

use snimatch_core::{extract_sni, ParseError};

use crate::output::{self, MatchEvent, OutputFormat};
use crate::packet;
use crate::rules::NamedRule;

/// List all available network interfaces.
pub fn list_interfaces() -> Result<()> {
    let devices =
        Device::list().context("Failed to list network devices. Do you have permission?")?;

    if devices.is_empty() {
        println!("No network interfaces found.");
        println!("Hint: run with sudo or set CAP_NET_RAW capability.");
        return Ok(());
    }

    println!("Available interfaces:");
    for dev in &devices {
        let desc = dev.desc.as_deref().unwrap_or("");
        let addrs: Vec<String> = dev.addresses.iter().map(|a| format!("{}", a.addr)).collect();
        let addr_str = if addrs.is_empty() {
            "(no addresses)".to_string()
        } else {
            addrs.join(", ")
        };
        println!("  {:<16} {} [{}]", dev.name, desc, addr_str);
    }

    println!("\nUsage: snimatch-filter -i <interface> -P <pattern>");
    Ok(())
}

/// Open a capture on the given interface and evaluate every TCP segment
/// against the loaded rules.
///
/// Each segment is classified on its own: there is no flow state and no
/// cross-segment reassembly, so a ClientHello split across segments is
/// simply not matched.
pub fn run_capture(
    iface: &str,
    bpf_filter: &str,
    promisc: bool,
    snaplen: i32,
    rules: &[NamedRule],
    format: OutputFormat,
    matches_only: bool,
) -> Result<()> {
    let mut cap = Capture::from_device(iface)
        .with_context(|| {
            format!(
                "Failed to open interface '{}'.\n\
                 Hint: run with sudo or: sudo setcap cap_net_raw+ep <binary>",
                iface
            )
        })?
        .promisc(promisc)
        .snaplen(snaplen)
        .timeout(1000) // 1s read timeout so Ctrl+C works
        .open()
        .with_context(|| {
            format!(
                "Failed to activate capture on '{}'. Permission denied?\n\
                 Hint: sudo setcap cap_net_raw+ep <binary>",
                iface
            )
        })?;

    cap.filter(bpf_filter, true)
        .with_context(|| format!("Invalid BPF filter: '{}'", bpf_filter))?;

    debug!("Capture active, BPF filter applied: {}", bpf_filter);

    loop {
        match cap.next_packet() {
            Ok(captured) => match packet::parse_segment(captured.data) {
                Ok(Some(seg)) => {
                    evaluate_segment(&seg, rules, format, matches_only);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Frame parse error: {}", e);
                }
            },
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                error!("Capture error: {}", e);
                bail!("Capture terminated: {}", e);
            }
        }
    }
}

/// Run one segment through SNI extraction and every rule, then emit a
/// match event. Unclassifiable segments are logged and dropped; the
/// parse outcome never depends on the rules.
fn evaluate_segment(
    seg: &packet::SegmentInfo,
    rules: &[NamedRule],
    format: OutputFormat,
    matches_only: bool,
) {
    match extract_sni(&seg.tcp_payload) {
        Ok(hostname) => {
            let matched: Vec<&str> = rules
                .iter()
                .filter(|r| r.rule.evaluate(&hostname))
                .map(|r| r.name.as_str())
                .collect();

            if matches_only && matched.is_empty() {
                return;
            }
            output::print_event(
                &MatchEvent {
                    flow: &seg.flow,
                    hostname: &hostname,
                    rules: matched,
                },
                format,
            );
        }
        // Ordinary non-handshake traffic on the filtered port; not worth
        // logging even at debug level.
        Err(ParseError::NotHandshake | ParseError::NotClientHello) => {}
        Err(err) => {
            debug!("Unclassifiable segment ({}): {}", seg.flow, err);
        }
    }
}
