//! ---
//! cetk_section: "07-document-intake"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Document field extraction rules and text loading."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Numeric extraction rules.
//!
//! A [`RuleChain`] tries its rules in order and stops at the first one that
//! yields a value. Each rule looks only at the first match of its pattern.

use regex::Regex;

pub trait ExtractionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, text: &str) -> Option<f64>;
}

/// First capture group of the first match, parsed as a number.
#[derive(Debug, Clone)]
pub struct FirstNumber {
    name: &'static str,
    pattern: Regex,
}

impl FirstNumber {
    /// Patterns are compile-time literals; an invalid one is a programming error.
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("extraction pattern must compile"),
        }
    }
}

impl ExtractionRule for FirstNumber {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text)?;
        captures.get(1)?.as_str().parse().ok()
    }
}

/// Midpoint of the two capture groups of the first match, as in `250-300`.
#[derive(Debug, Clone)]
pub struct RangeMidpoint {
    name: &'static str,
    pattern: Regex,
}

impl RangeMidpoint {
    pub fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("extraction pattern must compile"),
        }
    }
}

impl ExtractionRule for RangeMidpoint {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text)?;
        let low: f64 = captures.get(1)?.as_str().parse().ok()?;
        let high: f64 = captures.get(2)?.as_str().parse().ok()?;
        Some((low + high) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub value: f64,
}

#[derive(Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl ExtractionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn first_match(&self, text: &str) -> Option<RuleMatch> {
        self.rules.iter().find_map(|rule| {
            rule.apply(text).map(|value| RuleMatch {
                rule: rule.name(),
                value,
            })
        })
    }
}

impl std::fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rule_with_a_value_wins() {
        let chain = RuleChain::new()
            .with(FirstNumber::new("labelled", r"[Ff]low[:\s]*(\d+\.?\d*)\s*m3/s"))
            .with(FirstNumber::new("bare", r"(\d+\.?\d*)\s*m3/s"));

        let hit = chain.first_match("peak 40 m3/s, flow: 12.5 m3/s").unwrap();
        assert_eq!(hit, RuleMatch { rule: "labelled", value: 12.5 });

        let hit = chain.first_match("peak 40 m3/s").unwrap();
        assert_eq!(hit.rule, "bare");
        assert!(chain.first_match("nothing here").is_none());
    }

    #[test]
    fn range_takes_the_midpoint() {
        let rule = RangeMidpoint::new("range", r"(\d+)\s*[-–]\s*(\d+)\s*°C");
        assert_eq!(rule.apply("reservoir at 250–300 °C"), Some(275.0));
        assert_eq!(rule.apply("reservoir at 250 °C"), None);
    }
}
