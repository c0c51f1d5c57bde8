use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::packet::FlowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

/// The classification outcome for one captured segment.
pub struct MatchEvent<'a> {
    pub flow: &'a FlowKey,
    pub hostname: &'a str,
    /// Names of the rules that matched this hostname.
    pub rules: Vec<&'a str>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    src_ip: String,
    src_port: u16,
    dst_ip: String,
    dst_port: u16,
    hostname: &'a str,
    matched: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rules: &'a Vec<&'a str>,
}

pub fn print_event(event: &MatchEvent<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Text => print_text(event),
        OutputFormat::Json => print_json(event),
    }
}

fn print_text(event: &MatchEvent<'_>) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if event.rules.is_empty() {
        println!(
            "{} {} sni={} no-match",
            timestamp, event.flow, event.hostname
        );
    } else {
        println!(
            "{} {} sni={} MATCH [{}]",
            timestamp,
            event.flow,
            event.hostname,
            event.rules.join(", ")
        );
    }
}

fn print_json(event: &MatchEvent<'_>) {
    let record = JsonRecord {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        src_ip: event.flow.src_ip.to_string(),
        src_port: event.flow.src_port,
        dst_ip: event.flow.dst_ip.to_string(),
        dst_port: event.flow.dst_port,
        hostname: event.hostname,
        matched: !event.rules.is_empty(),
        rules: &event.rules,
    };

    println!("{}", serde_json::to_string(&record).unwrap());
}
