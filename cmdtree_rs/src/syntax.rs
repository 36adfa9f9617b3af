//! Human-readable command syntax.
//!
//! Parse failures carry the chain of nodes reached so far as a
//! [`SyntaxChain`]. Rendering it is left to a [`SyntaxFormatter`] so callers
//! can localize or restyle the "correct syntax is: ..." message.

use std::fmt;

use serde::Serialize;

/// One rendered flag inside a flag group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagSyntax {
    pub name: String,
    /// Placeholder for the flag's value, `None` for presence flags.
    pub value: Option<String>,
}

/// One node of a rendered command chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SyntaxPart {
    Literal(String),
    Required(String),
    Optional(String),
    Flags(Vec<FlagSyntax>),
    /// A fork: several children could follow, each already rendered.
    Alternatives(Vec<String>),
}

/// Ordered chain of syntax parts from the command root downwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyntaxChain {
    parts: Vec<SyntaxPart>,
}

impl SyntaxChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: SyntaxPart) {
        self.parts.push(part);
    }

    pub fn with(mut self, part: SyntaxPart) -> Self {
        self.push(part);
        self
    }

    pub fn parts(&self) -> &[SyntaxPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl From<Vec<SyntaxPart>> for SyntaxChain {
    fn from(parts: Vec<SyntaxPart>) -> Self {
        Self { parts }
    }
}

impl fmt::Display for SyntaxChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&StandardSyntaxFormatter.format(self))
    }
}

/// Renders a [`SyntaxChain`] into a display string.
pub trait SyntaxFormatter: Send + Sync {
    fn format(&self, chain: &SyntaxChain) -> String;
}

/// `literal <required> [optional] [--flag] [--flag <value>] (a|b)`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSyntaxFormatter;

impl StandardSyntaxFormatter {
    /// Render a single part on its own, as used inside [`SyntaxPart::Alternatives`].
    pub fn part(part: &SyntaxPart) -> String {
        match part {
            SyntaxPart::Literal(name) => name.clone(),
            SyntaxPart::Required(name) => format!("<{name}>"),
            SyntaxPart::Optional(name) => format!("[{name}]"),
            SyntaxPart::Flags(flags) => flags
                .iter()
                .map(|flag| match &flag.value {
                    Some(value) => format!("[--{} <{}>]", flag.name, value),
                    None => format!("[--{}]", flag.name),
                })
                .collect::<Vec<_>>()
                .join(" "),
            SyntaxPart::Alternatives(options) => format!("({})", options.join("|")),
        }
    }
}

impl SyntaxFormatter for StandardSyntaxFormatter {
    fn format(&self, chain: &SyntaxChain) -> String {
        chain
            .parts()
            .iter()
            .map(Self::part)
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_format() {
        let chain = SyntaxChain::from(vec![
            SyntaxPart::Literal("kick".into()),
            SyntaxPart::Required("player".into()),
            SyntaxPart::Optional("reason".into()),
            SyntaxPart::Flags(vec![
                FlagSyntax {
                    name: "silent".into(),
                    value: None,
                },
                FlagSyntax {
                    name: "delay".into(),
                    value: Some("seconds".into()),
                },
            ]),
        ]);
        assert_eq!(
            chain.to_string(),
            "kick <player> [reason] [--silent] [--delay <seconds>]"
        );
    }

    #[test]
    fn test_alternatives_and_empty_flags() {
        let chain = SyntaxChain::new()
            .with(SyntaxPart::Literal("config".into()))
            .with(SyntaxPart::Flags(Vec::new()))
            .with(SyntaxPart::Alternatives(vec!["get".into(), "set".into()]));
        assert_eq!(StandardSyntaxFormatter.format(&chain), "config (get|set)");
    }
}
