//! Parsing: descending the tree with a token stream.
//!
//! At each node the current token is first looked up among the literal
//! children. A literal match is final. Otherwise the dynamic children run in
//! tree order and the first parser that succeeds decides the branch; a failed
//! parser never consumes input, and the remaining siblings are not retried
//! once one has succeeded.
//!
//! When the tokens run out before a handler is reached, optional arguments
//! are followed (binding their defaults) toward the nearest terminal node.

use std::fmt;

use strsim::levenshtein;
use tracing::{error, trace};

use crate::argument::Argument;
use crate::command::Handler;
use crate::context::CommandContext;
use crate::error::ParseError;
use crate::input::{TokenCursor, tokenize};
use crate::parser::guarded_parse;
use crate::sender::CommandSender;
use crate::syntax::{SyntaxChain, SyntaxPart};
use crate::value::Value;

use super::{CommandNode, CommandTree};

/// Knobs for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum edit distance for the "did you mean" hint; `0` disables it.
    pub did_you_mean_distance: usize,
    /// Prune branches the sender may not see. With `false` every branch is
    /// walked and the first missing permission is recorded on the result.
    pub check_permissions: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            did_you_mean_distance: 2,
            check_permissions: true,
        }
    }
}

/// A successfully parsed command, ready to run.
pub struct Invocation<'s, S> {
    context: CommandContext<'s, S>,
    handler: Handler<S>,
    syntax: SyntaxChain,
    denied: Option<String>,
}

impl<'s, S> Invocation<'s, S> {
    pub fn context(&self) -> &CommandContext<'s, S> {
        &self.context
    }

    pub fn into_context(self) -> CommandContext<'s, S> {
        self.context
    }

    pub fn handler(&self) -> &Handler<S> {
        &self.handler
    }

    /// The matched path, including optional arguments filled from defaults.
    pub fn syntax(&self) -> &SyntaxChain {
        &self.syntax
    }

    /// First permission the sender lacks along the path. Only ever set when
    /// parsing with permission checks disabled.
    pub fn denied_permission(&self) -> Option<&str> {
        self.denied.as_deref()
    }

    /// Run the handler against the bound context.
    pub fn execute(&self) -> anyhow::Result<()> {
        (self.handler)(&self.context)
    }
}

impl<S> fmt::Debug for Invocation<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("syntax", &self.syntax.to_string())
            .field("context", &self.context)
            .field("denied", &self.denied)
            .finish_non_exhaustive()
    }
}

impl<S: CommandSender> CommandTree<S> {
    /// Resolve `tokens` to exactly one command and bind its arguments into
    /// `context`.
    pub fn parse<'s>(
        &self,
        mut context: CommandContext<'s, S>,
        tokens: &[String],
        options: &ParseOptions,
    ) -> Result<Invocation<'s, S>, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::NoInputProvided {
                argument: None,
                chain: SyntaxChain::new(),
            });
        }

        let mut walk = Walk::new(context.sender(), options);
        let mut cursor = TokenCursor::new(tokens);
        let mut node = &self.root;
        while let Some(token) = cursor.peek() {
            node = walk.step(node, token, &mut context, &mut cursor)?;
        }
        let handler = walk.complete(node, &mut context)?;

        Ok(Invocation {
            context,
            handler,
            syntax: walk.chain,
            denied: walk.denied,
        })
    }
}

/// State of one descent: the path walked so far and what it cost.
pub(super) struct Walk<'a, S> {
    sender: &'a S,
    check_permissions: bool,
    did_you_mean_distance: usize,
    pub(super) chain: SyntaxChain,
    pub(super) denied: Option<String>,
}

impl<'a, S: CommandSender> Walk<'a, S> {
    pub(super) fn new(sender: &'a S, options: &ParseOptions) -> Self {
        Self {
            sender,
            check_permissions: options.check_permissions,
            did_you_mean_distance: options.did_you_mean_distance,
            chain: SyntaxChain::new(),
            denied: None,
        }
    }

    pub(super) fn candidates<'n>(&self, node: &'n CommandNode<S>) -> Vec<&'n CommandNode<S>> {
        node.children
            .iter()
            .filter(|child| !self.check_permissions || child.permits(self.sender))
            .collect()
    }

    fn enter(&mut self, child: &CommandNode<S>) {
        if self.denied.is_none() {
            self.denied = child.denied_permission(self.sender);
        }
        if let Some(part) = child.syntax_part() {
            self.chain.push(part);
        }
    }

    /// Consume input for one level and return the child descended into.
    pub(super) fn step<'n>(
        &mut self,
        node: &'n CommandNode<S>,
        token: &str,
        ctx: &mut CommandContext<'_, S>,
        cursor: &mut TokenCursor<'_>,
    ) -> Result<&'n CommandNode<S>, ParseError> {
        let children = self.candidates(node);

        let literals: Vec<&CommandNode<S>> = children
            .iter()
            .copied()
            .filter(|child| child.matches_literal(token))
            .collect();
        match literals.as_slice() {
            [] => {}
            [child] => {
                cursor.advance();
                ctx.store(child.name(), Value::Text(child.name().to_string()));
                self.enter(child);
                trace!(token, node = child.name(), "matched literal");
                return Ok(*child);
            }
            many => {
                error!(
                    token,
                    matches = many.len(),
                    "more than one literal sibling matched; the tree is inconsistent"
                );
                return Err(ParseError::AmbiguousAtRuntime {
                    input: token.to_string(),
                    chain: self.chain.clone(),
                });
            }
        }

        let dynamics: Vec<&CommandNode<S>> = children
            .iter()
            .copied()
            .filter(|child| !child.is_literal())
            .collect();
        if dynamics.is_empty() {
            if children.is_empty() && node.argument.is_some() {
                return Err(ParseError::InvalidSyntax {
                    chain: self.chain.clone(),
                });
            }
            return Err(ParseError::UnrecognizedInput {
                input: token.to_string(),
                suggestion: self.did_you_mean(token, &children),
                chain: self.expected(node),
            });
        }

        let mut first_failure = None;
        for child in dynamics {
            let Some(parser) = child.argument.as_ref().and_then(Argument::parser) else {
                continue;
            };
            let start = cursor.position();
            match guarded_parse(parser, ctx, cursor) {
                Ok(value) => {
                    trace!(token, node = child.name(), %value, "matched argument");
                    ctx.store(child.name(), value);
                    self.enter(child);
                    return Ok(child);
                }
                Err(err) => {
                    cursor.rewind(start);
                    trace!(token, node = child.name(), %err, "argument rejected input");
                    if first_failure.is_none() {
                        first_failure = Some((child, err));
                    }
                }
            }
        }

        let Some((child, source)) = first_failure else {
            return Err(ParseError::InvalidSyntax {
                chain: self.chain.clone(),
            });
        };
        let mut chain = self.chain.clone();
        if let Some(part) = child.syntax_part() {
            chain.push(part);
        }
        let chain = self.continue_from(chain, child);
        let argument = child.name().to_string();
        Err(if source.is_no_input() {
            ParseError::NoInputProvided {
                argument: Some(argument),
                chain,
            }
        } else {
            ParseError::ArgumentParseFailure {
                argument,
                source,
                chain,
            }
        })
    }

    /// Input is exhausted: walk optional arguments toward a handler.
    fn complete(
        &mut self,
        mut node: &CommandNode<S>,
        ctx: &mut CommandContext<'_, S>,
    ) -> Result<Handler<S>, ParseError> {
        loop {
            if let Some(handler) = &node.handler {
                return Ok(handler.clone());
            }
            let children = self.candidates(node);
            let optional = children.iter().copied().find(|child| {
                child
                    .argument
                    .as_ref()
                    .is_some_and(|arg| !arg.is_literal() && !arg.is_required())
            });

            let Some(child) = optional else {
                let chain = self.expected(node);
                return Err(match children.iter().find(|child| !child.is_literal()) {
                    Some(required) => ParseError::NoInputProvided {
                        argument: Some(required.name().to_string()),
                        chain,
                    },
                    None => ParseError::InvalidSyntax { chain },
                });
            };

            if let Some(argument) = child.argument.as_ref() {
                if let Some(default) = argument.default_value() {
                    self.bind_default(argument, default, ctx)?;
                }
            }
            self.enter(child);
            trace!(node = child.name(), "followed optional argument");
            node = child;
        }
    }

    fn bind_default(
        &self,
        argument: &Argument<S>,
        default: &str,
        ctx: &mut CommandContext<'_, S>,
    ) -> Result<(), ParseError> {
        let Some(parser) = argument.parser() else {
            return Ok(());
        };
        let tokens = tokenize(default);
        let mut cursor = TokenCursor::new(&tokens);
        let value = guarded_parse(parser, ctx, &mut cursor).map_err(|source| {
            ParseError::ArgumentParseFailure {
                argument: argument.name().to_string(),
                source,
                chain: self.chain.clone().with(argument.syntax_part()),
            }
        })?;
        ctx.store(argument.name(), value);
        Ok(())
    }

    /// The walked chain plus the continuation the sender could type next.
    ///
    /// Single children are followed until a handler is reached (optional
    /// arguments after it are still shown); a fork renders as alternatives.
    pub(super) fn expected(&self, node: &CommandNode<S>) -> SyntaxChain {
        self.continue_from(self.chain.clone(), node)
    }

    fn continue_from(&self, mut chain: SyntaxChain, node: &CommandNode<S>) -> SyntaxChain {
        let mut current = node;
        loop {
            let children = self.candidates(current);
            match children.as_slice() {
                [only]
                    if !current.is_terminal()
                        || !only.argument.as_ref().is_some_and(Argument::is_required) =>
                {
                    if let Some(part) = only.syntax_part() {
                        chain.push(part);
                    }
                    current = *only;
                }
                [_, _, ..] if !current.is_terminal() => {
                    chain.push(SyntaxPart::Alternatives(
                        children.iter().map(|child| child.rendered()).collect(),
                    ));
                    break;
                }
                _ => break,
            }
        }
        chain
    }

    fn did_you_mean(&self, token: &str, children: &[&CommandNode<S>]) -> Option<String> {
        if self.did_you_mean_distance == 0 {
            return None;
        }
        let token = token.to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for literal in children
            .iter()
            .filter_map(|child| child.argument.as_ref().and_then(Argument::literal_parser))
        {
            for spelling in literal.spellings() {
                let distance = levenshtein(&token, &spelling.to_lowercase());
                if distance <= self.did_you_mean_distance
                    && best.is_none_or(|(_, best_distance)| distance < best_distance)
                {
                    best = Some((spelling, distance));
                }
            }
        }
        best.map(|(spelling, _)| spelling.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
