//! Byte-level TLS ClientHello inspection and SNI hostname matching.
//!
//! Given the TCP payload of one captured segment, this crate decides
//! whether it starts a TLS handshake, extracts the Server Name Indication
//! hostname from the ClientHello if present, and compares it against a
//! shell-style glob pattern with optional inversion. Anything that fails
//! to parse is a definitive "no match"; there is no error channel at the
//! matching boundary.
//!
//! The crate performs no I/O and keeps no state between calls; a compiled
//! [`SniRule`] is immutable and may be shared across threads freely.

pub mod clienthello;
pub mod cursor;
pub mod glob;
pub mod rule;

pub use clienthello::{extract_sni, ParseError};
pub use glob::glob_match;
pub use rule::{match_tls_sni, SniRule};
