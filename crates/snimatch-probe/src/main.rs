use std::env;
use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing::{info, warn};

use snimatch_core::{extract_sni, SniRule};

/// Loopback test harness: accepts TLS connection attempts, runs the
/// buffered ClientHello through the same matcher the filter uses, and
/// prints the verdict. Lets you exercise a pattern without capture
/// privileges: `snimatch-probe '*.example.com' 8443`, then
/// `curl -k --resolve sub.example.com:8443:127.0.0.1 https://sub.example.com:8443`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let pattern = env::args().nth(1).unwrap_or_else(|| "*".to_string());
    let port: u16 = env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8443);

    let rule = SniRule::new(pattern, false);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let listener = TcpListener::bind(addr).await?;

    info!("snimatch probe listening on {}", addr);
    info!("Pattern: {}", rule.pattern());
    info!("Test with: curl -k https://localhost:{}", port);
    info!("Press Ctrl+C to stop\n");

    loop {
        let (mut stream, peer) = listener.accept().await?;
        let rule = rule.clone();

        tokio::spawn(async move {
            // Read TLS record header (5 bytes): content_type(1) + version(2) + length(2)
            let mut header = [0u8; 5];
            if let Err(e) = stream.read_exact(&mut header).await {
                warn!("[{}] failed to read TLS header: {}", peer, e);
                return;
            }

            if header[0] != 0x16 {
                warn!("[{}] not a TLS handshake (got 0x{:02x})", peer, header[0]);
                return;
            }

            let record_len = u16::from_be_bytes([header[3], header[4]]) as usize;
            if record_len > 16384 {
                warn!("[{}] record too large: {} bytes", peer, record_len);
                return;
            }

            // Read the full record body
            let mut body = vec![0u8; record_len];
            if let Err(e) = stream.read_exact(&mut body).await {
                warn!("[{}] failed to read record body: {}", peer, e);
                return;
            }

            // Header + body, the way a single captured segment would look
            let mut segment = Vec::with_capacity(5 + record_len);
            segment.extend_from_slice(&header);
            segment.extend_from_slice(&body);

            let verdict = rule.matches_packet(&segment);
            match extract_sni(&segment) {
                Ok(hostname) => {
                    println!(
                        "{} sni={} pattern={} -> {}",
                        peer,
                        hostname,
                        rule.pattern(),
                        if verdict { "MATCH" } else { "no match" }
                    );
                }
                Err(e) => {
                    println!("{} unclassifiable ({}) -> no match", peer, e);
                }
            }

            // Connection drops here — client will see a TLS error, that's expected
        });
    }
}
