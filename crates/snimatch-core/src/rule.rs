use tracing::trace;

use crate::clienthello::extract_sni;
use crate::glob::glob_match;

/// One installed match rule: a glob over the SNI hostname plus an invert
/// flag.
///
/// Built once at rule-install time and immutable afterwards, so a single
/// rule can serve any number of concurrent match calls without
/// synchronization.
#[derive(Debug, Clone)]
pub struct SniRule {
    pattern: String,
    invert: bool,
}

impl SniRule {
    pub fn new(pattern: impl Into<String>, invert: bool) -> Self {
        Self {
            pattern: pattern.into(),
            invert,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    /// Glob comparison plus invert, for callers that already hold an
    /// extracted hostname.
    pub fn evaluate(&self, hostname: &str) -> bool {
        glob_match(&self.pattern, hostname) != self.invert
    }

    /// Full decision for one TCP segment: classify, extract, compare.
    ///
    /// A segment that does not parse as a ClientHello carrying an SNI
    /// hostname never matches, regardless of `invert`: the flag only
    /// flips the glob comparison, not the parse outcome.
    pub fn matches_packet(&self, payload: &[u8]) -> bool {
        match extract_sni(payload) {
            Ok(hostname) => {
                let verdict = self.evaluate(&hostname);
                trace!(
                    %hostname,
                    pattern = %self.pattern,
                    invert = self.invert,
                    verdict,
                    "rule evaluated"
                );
                verdict
            }
            Err(err) => {
                trace!(%err, "segment not classifiable, no match");
                false
            }
        }
    }
}

/// Match one captured TCP segment against a glob pattern.
///
/// One-shot convenience wrapper; long-lived rules should construct an
/// [`SniRule`] once and reuse it across packets.
pub fn match_tls_sni(payload: &[u8], pattern: &str, invert: bool) -> bool {
    SniRule::new(pattern, invert).matches_packet(payload)
}
