//! Shell-style glob matching for hostnames.
//!
//! Supports `*` (any run of characters, including none), `?` (exactly one
//! character), `[...]` character classes with ranges and `!` negation, and
//! `\` to escape the next pattern character. Matching is byte-wise,
//! case-sensitive, and anchored at both ends: a pattern matches the whole
//! hostname or not at all. An unterminated class falls back to matching
//! `[` literally.

/// Match `text` against `pattern`.
///
/// Backtracking is limited to the most recent `*`: on a mismatch the
/// matcher resumes one text byte further along, so the scan is bounded by
/// the text length and always terminates.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat = pattern.as_bytes();
    let text = text.as_bytes();
    let mut p = 0;
    let mut t = 0;
    let mut back_pat: Option<usize> = None;
    let mut back_text = 0;

    loop {
        let c = text.get(t).copied();
        t += 1;
        let d = pat.get(p).copied();
        p += 1;

        let matched_here = match d {
            Some(b'?') => c.is_some(),
            Some(b'*') => {
                if p == pat.len() {
                    // Trailing star swallows the rest of the text.
                    return true;
                }
                back_pat = Some(p);
                t -= 1;
                back_text = t;
                true
            }
            Some(b'[') => match class_match(pat, p, c) {
                Some((next, hit)) => {
                    if hit {
                        p = next;
                    }
                    hit
                }
                // Unterminated class: `[` matches itself.
                None => c == Some(b'['),
            },
            Some(b'\\') => {
                let lit = pat.get(p).copied();
                p += 1;
                if c.is_none() && lit.is_none() {
                    return true;
                }
                c == lit
            }
            Some(lit) => c == Some(lit),
            None => {
                if c.is_none() {
                    return true;
                }
                false
            }
        };

        if !matched_here {
            if c.is_none() {
                return false;
            }
            let Some(bp) = back_pat else {
                return false;
            };
            // Try again from the last star, one text byte later.
            p = bp;
            back_text += 1;
            t = back_text;
        }
    }
}

/// Evaluate a `[...]` class starting at `start` (just past the `[`)
/// against the candidate byte `c`.
///
/// Returns `Some((offset past the closing bracket, matched))`, or `None`
/// when the class has no terminating `]`.
fn class_match(pat: &[u8], start: usize, c: Option<u8>) -> Option<(usize, bool)> {
    let inverted = pat.get(start).copied() == Some(b'!');
    let mut pos = start + usize::from(inverted);
    let mut matched = false;

    let mut a = pat.get(pos).copied();
    pos += 1;
    loop {
        let lo = a?;
        let mut hi = lo;
        if pat.get(pos).copied() == Some(b'-') && pat.get(pos + 1).copied() != Some(b']') {
            hi = pat.get(pos + 1).copied()?;
            pos += 2;
        }
        if let Some(cc) = c {
            matched |= lo <= cc && cc <= hi;
        }
        a = pat.get(pos).copied();
        pos += 1;
        if a == Some(b']') {
            return Some((pos, matched != inverted));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match_is_anchored() {
        assert!(glob_match("example.com", "example.com"));
        assert!(!glob_match("example.com", "sub.example.com"));
        assert!(!glob_match("example.com", "example.com.evil.io"));
        assert!(!glob_match("example.com", "example.co"));
    }

    #[test]
    fn star_matches_any_run() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything.at.all"));
        assert!(glob_match("*.example.com", "sub.example.com"));
        assert!(glob_match("*.example.com", "a.b.example.com"));
        assert!(!glob_match("*.example.com", "example.com"));
        assert!(glob_match("test.*", "test.io"));
        assert!(glob_match("ad*", "ads.tracker.net"));
    }

    #[test]
    fn star_mid_pattern_backtracks() {
        assert!(glob_match("a*c", "abc"));
        assert!(glob_match("a*c", "ac"));
        assert!(glob_match("a*c", "abcbc"));
        assert!(!glob_match("a*c", "abd"));
        assert!(glob_match("*.cdn.*", "img.cdn.example.net"));
    }

    #[test]
    fn question_mark_matches_exactly_one() {
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
        assert!(!glob_match("a?", "a"));
        assert!(glob_match("??", "ab"));
    }

    #[test]
    fn character_classes() {
        assert!(glob_match("host[123].example.com", "host2.example.com"));
        assert!(!glob_match("host[123].example.com", "host4.example.com"));
        assert!(glob_match("host[0-9].example.com", "host7.example.com"));
        assert!(!glob_match("host[!0-9].example.com", "host7.example.com"));
        assert!(glob_match("host[!0-9].example.com", "hostx.example.com"));
    }

    #[test]
    fn class_with_literal_bracket_members() {
        // A leading ] is a member, not a terminator.
        assert!(glob_match("[]]", "]"));
        // A trailing - is a member, not a range.
        assert!(glob_match("[a-]", "-"));
        assert!(glob_match("[a-]", "a"));
        assert!(!glob_match("[a-]", "b"));
    }

    #[test]
    fn unterminated_class_is_literal() {
        assert!(glob_match("[", "["));
        assert!(!glob_match("[", "x"));
        assert!(glob_match("a[b", "a[b"));
    }

    #[test]
    fn escape_takes_next_byte_literally() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
        assert!(glob_match("\\?", "?"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!glob_match("example.com", "Example.com"));
        assert!(!glob_match("*.COM", "example.com"));
    }

    #[test]
    fn empty_pattern_matches_only_empty_text() {
        assert!(glob_match("", ""));
        assert!(!glob_match("", "a"));
    }
}
