//! Rule compilation.
//!
//! # Responsibilities
//! - Scan a rule for `{name}` placeholders (left to right)
//! - Turn a rule plus per-parameter requirements into an anchored regex
//! - Keep the parameter-name order aligned with the capture-group order
//!
//! # Design Decisions
//! - Literal rule text is escaped; only placeholders become sub-patterns
//! - Requirements are inserted verbatim inside a capture group
//! - Placeholders without a requirement capture `[-.\w]+` (never `/`)
//! - The same scanner drives URL generation, so match and generate agree

use std::ops::Range;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

/// Sub-pattern used for placeholders without a requirement.
pub const DEFAULT_REQUIREMENT: &str = r"[-.\w]+";

/// Upper bound for a compiled route regex.
const MAX_REGEX_SIZE: usize = 1 << 20;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder grammar is a valid regex")
});

/// A `{name}` occurrence inside a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Parameter name between the braces.
    pub name: &'a str,
    /// Byte range of the whole `{name}` token in the rule.
    pub range: Range<usize>,
}

/// Iterate over the placeholders of `rule` in left-to-right order.
pub fn placeholders(rule: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER.captures_iter(rule).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Placeholder {
            name: name.as_str(),
            range: whole.range(),
        })
    })
}

/// Build the unanchored pattern source for a rule.
pub fn pattern_source(rule: &str, requirements: &IndexMap<String, String>) -> String {
    let mut source = String::with_capacity(rule.len() * 2);
    let mut last = 0;

    for placeholder in placeholders(rule) {
        source.push_str(&regex::escape(&rule[last..placeholder.range.start]));

        let sub = requirements
            .get(placeholder.name)
            .map(String::as_str)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REQUIREMENT);
        source.push('(');
        source.push_str(sub);
        source.push(')');

        last = placeholder.range.end;
    }
    source.push_str(&regex::escape(&rule[last..]));

    source
}

/// A rule compiled into an anchored matcher.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compile `rule` with the given requirements.
    pub fn compile(
        rule: &str,
        requirements: &IndexMap<String, String>,
    ) -> Result<Self, regex::Error> {
        let anchored = format!("^{}$", pattern_source(rule, requirements));
        let regex = RegexBuilder::new(&anchored)
            .size_limit(MAX_REGEX_SIZE)
            .build()?;
        let param_names = placeholders(rule).map(|p| p.name.to_string()).collect();

        Ok(Self { regex, param_names })
    }

    /// The anchored regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in rule order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_match(&self, token: &str) -> bool {
        self.regex.is_match(token)
    }

    /// Every capture group of a full-token match, in group order.
    ///
    /// Groups that did not participate yield an empty string. Requirements
    /// containing their own groups make this longer than `param_names`.
    pub fn captures(&self, token: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(token)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}
