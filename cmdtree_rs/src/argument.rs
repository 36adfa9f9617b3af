//! Argument descriptors: what one node of a command chain is.

use std::fmt;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::parser::{ArgumentParser, FlagParser, InputShape, LiteralParser, SuggestionProvider};
use crate::permission::Permission;
use crate::sender::CommandSender;
use crate::syntax::SyntaxPart;

/// Literal node or dynamic (parser-backed) node.
pub enum ArgumentKind<S> {
    Literal(LiteralParser),
    Dynamic(Arc<dyn ArgumentParser<S>>),
}

impl<S> Clone for ArgumentKind<S> {
    fn clone(&self) -> Self {
        match self {
            ArgumentKind::Literal(literal) => ArgumentKind::Literal(literal.clone()),
            ArgumentKind::Dynamic(parser) => ArgumentKind::Dynamic(Arc::clone(parser)),
        }
    }
}

/// A named, typed slot in a command chain.
pub struct Argument<S> {
    name: String,
    kind: ArgumentKind<S>,
    required: bool,
    default: Option<String>,
    permission: Option<Permission<S>>,
    suggestions: Option<SuggestionProvider<S>>,
    description: Option<String>,
}

impl<S: CommandSender> Argument<S> {
    /// A literal named `name`; the name is also its only spelling until
    /// aliases are added.
    pub fn literal(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), ArgumentKind::Literal(LiteralParser::new(name)), true)
    }

    pub fn required(name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        Self::new(name, ArgumentKind::Dynamic(Arc::new(parser)), true)
    }

    pub fn optional(name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        Self::new(name, ArgumentKind::Dynamic(Arc::new(parser)), false)
    }

    /// An optional trailing flag group.
    pub fn flags(name: impl Into<String>, parser: FlagParser<S>) -> Self {
        Self::optional(name, parser)
    }

    fn new(name: impl Into<String>, kind: ArgumentKind<S>, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
            default: None,
            permission: None,
            suggestions: None,
            description: None,
        }
    }

    /// Add an alias. Ignored for dynamic arguments.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let ArgumentKind::Literal(literal) = &mut self.kind {
            literal.add_alias(alias);
        }
        self
    }

    /// Raw input parsed in place of a missing value. Makes the argument optional.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        if !self.is_literal() {
            self.default = Some(default.into());
            self.required = false;
        }
        self
    }

    pub fn with_permission(mut self, permission: impl Into<Permission<S>>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Replace the parser's completions for this argument.
    pub fn with_suggestions<F>(mut self, provider: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggestions = Some(Arc::new(provider));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<S> Argument<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ArgumentKind<S> {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ArgumentKind::Literal(_))
    }

    pub fn literal_parser(&self) -> Option<&LiteralParser> {
        match &self.kind {
            ArgumentKind::Literal(literal) => Some(literal),
            ArgumentKind::Dynamic(_) => None,
        }
    }

    pub(crate) fn literal_parser_mut(&mut self) -> Option<&mut LiteralParser> {
        match &mut self.kind {
            ArgumentKind::Literal(literal) => Some(literal),
            ArgumentKind::Dynamic(_) => None,
        }
    }

    /// The parser behind a dynamic argument.
    pub fn parser(&self) -> Option<&dyn ArgumentParser<S>> {
        match &self.kind {
            ArgumentKind::Dynamic(parser) => Some(parser.as_ref()),
            ArgumentKind::Literal(_) => None,
        }
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn permission(&self) -> Option<&Permission<S>> {
        self.permission.as_ref()
    }

    pub fn suggestion_provider(&self) -> Option<&SuggestionProvider<S>> {
        self.suggestions.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn consumes_remaining(&self) -> bool {
        self.parser().is_some_and(|parser| parser.consumes_remaining())
    }

    pub fn shape(&self) -> InputShape {
        match &self.kind {
            ArgumentKind::Literal(literal) => ArgumentParser::<S>::shape(literal),
            ArgumentKind::Dynamic(parser) => parser.shape(),
        }
    }

    pub fn syntax_part(&self) -> SyntaxPart {
        match &self.kind {
            ArgumentKind::Literal(literal) => SyntaxPart::Literal(literal.name().to_string()),
            ArgumentKind::Dynamic(parser) => match parser.flag_syntax() {
                Some(flags) => SyntaxPart::Flags(flags),
                None if self.required => SyntaxPart::Required(self.name.clone()),
                None => SyntaxPart::Optional(self.name.clone()),
            },
        }
    }

    /// Whether `other` describes the same dynamic slot, so a second command
    /// may share the node instead of forking beside it.
    ///
    /// Parsers and suggestion providers are compared by identity: two chains
    /// share a slot only when built from the same argument (for example a
    /// cloned [`CommandBuilder`](crate::CommandBuilder) template).
    pub(crate) fn same_slot(&self, other: &Argument<S>) -> bool {
        let same_parser = match (&self.kind, &other.kind) {
            (ArgumentKind::Dynamic(a), ArgumentKind::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        let same_permission = match (&self.permission, &other.permission) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_requirement(b),
            _ => false,
        };
        let same_suggestions = match (&self.suggestions, &other.suggestions) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_parser
            && same_permission
            && same_suggestions
            && self.name == other.name
            && self.required == other.required
            && self.default == other.default
    }
}

impl<S> Clone for Argument<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            required: self.required,
            default: self.default.clone(),
            permission: self.permission.clone(),
            suggestions: self.suggestions.clone(),
            description: self.description.clone(),
        }
    }
}

impl<S> fmt::Debug for Argument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("literal", &self.is_literal())
            .field("required", &self.required)
            .field("default", &self.default)
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Flag, IntegerParser, StringParser};
    use crate::sender::BasicSender;

    #[test]
    fn test_syntax_parts() {
        let give: Argument<BasicSender> = Argument::literal("give").alias("g");
        assert_eq!(give.syntax_part(), SyntaxPart::Literal("give".into()));
        assert_eq!(
            give.literal_parser().map(|l| l.aliases().to_vec()),
            Some(vec!["g".to_string()])
        );

        let amount = Argument::<BasicSender>::required("amount", IntegerParser::range(1, 64));
        assert_eq!(amount.syntax_part(), SyntaxPart::Required("amount".into()));

        let target =
            Argument::<BasicSender>::required("target", StringParser::single()).with_default("me");
        assert!(!target.is_required());
        assert_eq!(target.default_value(), Some("me"));
        assert_eq!(target.syntax_part(), SyntaxPart::Optional("target".into()));

        let flags = Argument::flags(
            "flags",
            FlagParser::<BasicSender>::new().flag(Flag::presence("silent")),
        );
        assert!(matches!(flags.syntax_part(), SyntaxPart::Flags(ref f) if f.len() == 1));
        assert!(flags.consumes_remaining());
    }

    #[test]
    fn test_same_slot() {
        let a = Argument::<BasicSender>::required("amount", IntegerParser::range(1, 64));
        let rebuilt = Argument::<BasicSender>::required("amount", IntegerParser::range(1, 64));
        let optional = Argument::<BasicSender>::optional("amount", IntegerParser::range(1, 64));
        assert!(a.same_slot(&a.clone()));
        assert!(!a.same_slot(&rebuilt));
        assert!(!a.same_slot(&optional));
        assert!(!a.same_slot(&a.clone().with_permission("admin")));
        assert!(!a.same_slot(&a.clone().with_suggestions(|_, _| Vec::new())));
        assert!(!Argument::<BasicSender>::literal("x").same_slot(&Argument::literal("x")));
    }
}
