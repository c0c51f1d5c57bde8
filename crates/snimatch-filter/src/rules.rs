use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use snimatch_core::SniRule;

/// One rule as written in a rules file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub name: String,
    /// Glob over the SNI hostname: `*`, `?`, `[...]`, anchored.
    pub pattern: String,
    /// Match hostnames that do NOT match the pattern.
    #[serde(default)]
    pub invert: bool,
    /// Transport the rule attaches to. Only TCP carries TLS handshakes
    /// this matcher can classify, so anything else is rejected at load
    /// time, before any packet is ever inspected.
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// A named rule compiled for matching.
pub struct NamedRule {
    pub name: String,
    pub rule: SniRule,
}

/// Load a JSON rules file (an array of rule specs) and compile it.
pub fn load_rules(path: &Path) -> Result<Vec<NamedRule>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file '{}'", path.display()))?;
    let specs: Vec<RuleSpec> = serde_json::from_str(&data)
        .with_context(|| format!("Invalid rules file '{}'", path.display()))?;
    compile(specs)
}

/// Validate rule specs and compile each into an immutable [`SniRule`].
/// Each rule is built exactly once here and reused unchanged for every
/// subsequent segment.
pub fn compile(specs: Vec<RuleSpec>) -> Result<Vec<NamedRule>> {
    if specs.is_empty() {
        bail!("No rules given");
    }

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(specs.len());
    for spec in specs {
        if !spec.protocol.eq_ignore_ascii_case("tcp") {
            bail!(
                "Rule '{}' can be used only with protocol tcp (got '{}')",
                spec.name,
                spec.protocol
            );
        }
        if !seen.insert(spec.name.clone()) {
            bail!("Duplicate rule name '{}'", spec.name);
        }
        rules.push(NamedRule {
            name: spec.name,
            rule: SniRule::new(spec.pattern, spec.invert),
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<NamedRule>> {
        compile(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn minimal_rule_compiles_with_defaults() {
        let rules = parse(r#"[{"name": "ads", "pattern": "*.doubleclick.net"}]"#).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "ads");
        assert_eq!(rules[0].rule.pattern(), "*.doubleclick.net");
        assert!(!rules[0].rule.invert());
    }

    #[test]
    fn invert_and_protocol_are_honored() {
        let rules = parse(
            r#"[{"name": "allow", "pattern": "*.corp.example", "invert": true, "protocol": "TCP"}]"#,
        )
        .unwrap();
        assert!(rules[0].rule.invert());
    }

    #[test]
    fn non_tcp_protocol_is_rejected() {
        let err = parse(r#"[{"name": "bad", "pattern": "*", "protocol": "udp"}]"#).unwrap_err();
        assert!(err.to_string().contains("protocol tcp"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse(
            r#"[{"name": "a", "pattern": "x"}, {"name": "a", "pattern": "y"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn empty_rule_list_is_rejected() {
        assert!(parse("[]").is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let specs: Result<Vec<RuleSpec>, _> =
            serde_json::from_str(r#"[{"name": "a", "pattern": "x", "port": 443}]"#);
        assert!(specs.is_err());
    }
}
