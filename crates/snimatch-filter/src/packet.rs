use std::net::IpAddr;

use anyhow::{bail, Result};
use etherparse::{NetSlice, SlicedPacket, TransportSlice};

/// Identifies a unidirectional TCP flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl std::fmt::Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port
        )
    }
}

/// One captured TCP segment, ready for SNI classification.
pub struct SegmentInfo {
    pub flow: FlowKey,
    pub tcp_payload: Vec<u8>,
}

/// Parse a raw captured frame (from the Ethernet header) and extract the
/// flow key and TCP payload. No TLS-level inspection happens here.
///
/// Returns:
/// - `Ok(Some(info))` if the frame contains a TCP segment with payload
/// - `Ok(None)` if the segment carries no payload (SYN, ACK, FIN, etc.)
/// - `Err` if frame parsing fails (not TCP, no IP header, etc.)
///
/// Both IP families are accepted; the transport below must be TCP.
pub fn parse_segment(raw: &[u8]) -> Result<Option<SegmentInfo>> {
    let sliced = SlicedPacket::from_ethernet(raw)?;

    let (src_ip, dst_ip) = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let hdr = ipv4.header();
            (
                IpAddr::V4(hdr.source_addr()),
                IpAddr::V4(hdr.destination_addr()),
            )
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let hdr = ipv6.header();
            (
                IpAddr::V6(hdr.source_addr()),
                IpAddr::V6(hdr.destination_addr()),
            )
        }
        _ => bail!("No IP header found"),
    };

    let (src_port, dst_port, tcp_payload) = match &sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => {
            (tcp.source_port(), tcp.destination_port(), tcp.payload())
        }
        _ => bail!("Not a TCP segment"),
    };

    if tcp_payload.is_empty() {
        return Ok(None);
    }

    Ok(Some(SegmentInfo {
        flow: FlowKey {
            src_ip,
            src_port,
            dst_ip,
            dst_port,
        },
        tcp_payload: tcp_payload.to_vec(),
    }))
}
