//! Flag groups: `--name`, `-n`, combined `-abc`, and `--name <value>`.
//!
//! A flag group is a single trailing argument that consumes the rest of the
//! input. Each recognized flag is recorded on the context through
//! [`CommandContext::set_flag`]; the group itself binds the list of flag
//! names that were given, in input order.
//!
//! During completion a value flag at the very end of the input is not an
//! error: the group marks it as pending so the value can be completed.

use std::fmt;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::permission::Permission;
use crate::sender::CommandSender;
use crate::syntax::FlagSyntax;
use crate::value::Value;

use super::{ArgumentParser, InputShape, guarded_parse, guarded_suggestions};

/// A single flag inside a [`FlagParser`].
pub struct Flag<S> {
    name: String,
    aliases: Vec<char>,
    value: Option<Arc<dyn ArgumentParser<S>>>,
    description: Option<String>,
    permission: Option<Permission<S>>,
}

impl<S: CommandSender> Flag<S> {
    /// A flag that is either present or absent.
    pub fn presence(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            value: None,
            description: None,
            permission: None,
        }
    }

    /// A flag followed by one value parsed with `parser`.
    pub fn with_value(name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        Self {
            value: Some(Arc::new(parser)),
            ..Self::presence(name)
        }
    }

    /// Short spelling, usable as `-x` or inside a combined `-xyz`.
    pub fn alias(mut self, alias: char) -> Self {
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Senders lacking `permission` see this flag as unknown.
    pub fn permission(mut self, permission: impl Into<Permission<S>>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[char] {
        &self.aliases
    }

    pub fn takes_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn visible_to(&self, sender: &S) -> bool {
        self.permission.as_ref().is_none_or(|p| p.allows(sender))
    }
}

impl<S> Clone for Flag<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            value: self.value.clone(),
            description: self.description.clone(),
            permission: self.permission.clone(),
        }
    }
}

impl<S> fmt::Debug for Flag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("takes_value", &self.value.is_some())
            .finish_non_exhaustive()
    }
}

/// Parses any number of trailing flags.
pub struct FlagParser<S> {
    flags: Vec<Flag<S>>,
}

impl<S: CommandSender> FlagParser<S> {
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    pub fn flag(mut self, flag: Flag<S>) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(&self) -> &[Flag<S>] {
        &self.flags
    }

    fn by_name(&self, name: &str) -> Option<&Flag<S>> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    fn by_alias(&self, alias: char) -> Option<&Flag<S>> {
        self.flags.iter().find(|flag| flag.aliases.contains(&alias))
    }

    /// Resolve one flag token into the flags it names.
    fn resolve(&self, token: &str, sender: &S) -> Result<Vec<&Flag<S>>, ArgumentError> {
        let unknown = || ArgumentError::UnknownFlag {
            flag: token.to_string(),
        };

        let found: Vec<&Flag<S>> = if let Some(name) = token.strip_prefix("--") {
            vec![self.by_name(name).ok_or_else(unknown)?]
        } else {
            let letters = &token[1..];
            let flags = letters
                .chars()
                .map(|alias| self.by_alias(alias).ok_or_else(unknown))
                .collect::<Result<Vec<_>, _>>()?;
            // Only the last flag of a combined group may take a value.
            if flags.len() > 1 && flags[..flags.len() - 1].iter().any(|f| f.takes_value()) {
                return Err(unknown());
            }
            flags
        };

        if found.iter().any(|flag| !flag.visible_to(sender)) {
            return Err(unknown());
        }
        Ok(found)
    }
}

impl<S: CommandSender> Default for FlagParser<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for FlagParser<S> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
        }
    }
}

impl<S> fmt::Debug for FlagParser<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.flags).finish()
    }
}

/// `-x`, `--name` and `-xyz` are flags; `-5` and a bare `-` are not.
pub fn is_flag_token(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-')
        && match chars.next() {
            Some('-') => token.len() > 2,
            Some(c) => !c.is_ascii_digit(),
            None => false,
        }
}

impl<S: CommandSender> ArgumentParser<S> for FlagParser<S> {
    fn parse(
        &self,
        ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError> {
        let first = input.peek().ok_or(ArgumentError::NoInput)?;
        if !is_flag_token(first) {
            return Err(ArgumentError::ExpectedFlag {
                input: first.to_string(),
            });
        }

        ctx.set_pending_flag(None);
        let mut given: Vec<String> = Vec::new();

        while let Some(token) = input.peek() {
            if !is_flag_token(token) {
                return Err(ArgumentError::ExpectedFlag {
                    input: token.to_string(),
                });
            }
            let flags = self.resolve(token, ctx.sender())?;
            input.advance();

            for flag in flags {
                if given.iter().any(|name| name == &flag.name) {
                    return Err(ArgumentError::DuplicateFlag {
                        flag: flag.name.clone(),
                    });
                }
                given.push(flag.name.clone());

                let Some(parser) = &flag.value else {
                    ctx.set_flag(flag.name.clone(), true);
                    continue;
                };
                if input.is_empty() {
                    if ctx.is_suggestions() {
                        ctx.set_pending_flag(Some(flag.name.clone()));
                        return Ok(list(given));
                    }
                    return Err(ArgumentError::MissingFlagValue {
                        flag: flag.name.clone(),
                    });
                }
                let value = guarded_parse(parser.as_ref(), ctx, input)?;
                ctx.set_flag(flag.name.clone(), value);
            }
        }

        Ok(list(given))
    }

    fn suggestions(&self, ctx: &CommandContext<'_, S>, input: &str) -> Vec<String> {
        if let Some(pending) = ctx.pending_flag() {
            return match self.by_name(pending).and_then(|flag| flag.value.as_ref()) {
                Some(parser) => guarded_suggestions(|| parser.suggestions(ctx, input)),
                None => Vec::new(),
            };
        }
        if !input.is_empty() && !input.starts_with('-') {
            return Vec::new();
        }
        self.flags
            .iter()
            .filter(|flag| !ctx.has_flag(&flag.name) && flag.visible_to(ctx.sender()))
            .map(|flag| format!("--{}", flag.name))
            .filter(|spelling| spelling.starts_with(input))
            .collect()
    }

    fn is_context_free(&self) -> bool {
        self.flags
            .iter()
            .filter_map(|flag| flag.value.as_ref())
            .all(|parser| parser.is_context_free())
    }

    fn shape(&self) -> InputShape {
        InputShape::Flags
    }

    fn consumes_remaining(&self) -> bool {
        true
    }

    fn flag_syntax(&self) -> Option<Vec<FlagSyntax>> {
        Some(
            self.flags
                .iter()
                .map(|flag| FlagSyntax {
                    name: flag.name.clone(),
                    value: flag.value.as_ref().map(|_| flag.name.clone()),
                })
                .collect(),
        )
    }
}

fn list(names: Vec<String>) -> Value {
    Value::List(names.into_iter().map(Value::Text).collect())
}
