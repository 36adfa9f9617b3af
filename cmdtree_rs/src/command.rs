//! Commands: an argument chain plus the handler run when it matches.

use std::fmt;
use std::sync::Arc;

use crate::argument::Argument;
use crate::context::CommandContext;
use crate::parser::{ArgumentParser, FlagParser};
use crate::permission::Permission;
use crate::sender::CommandSender;
use crate::syntax::SyntaxChain;

/// Executable behaviour attached to the terminal node of a command.
pub type Handler<S> = Arc<dyn Fn(&CommandContext<'_, S>) -> anyhow::Result<()> + Send + Sync>;

/// A registered command: root literal first, then its arguments in order.
pub struct Command<S> {
    chain: Vec<Argument<S>>,
    handler: Handler<S>,
    permission: Option<Permission<S>>,
    description: Option<String>,
}

impl<S: CommandSender> Command<S> {
    /// Start a command rooted at the literal `name`.
    pub fn builder(name: impl Into<String>) -> CommandBuilder<S> {
        CommandBuilder {
            chain: vec![Argument::literal(name)],
            permission: None,
            description: None,
        }
    }

    /// Assemble a command from a prebuilt chain.
    pub fn from_parts<F>(chain: Vec<Argument<S>>, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_, S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            chain,
            handler: Arc::new(handler),
            permission: None,
            description: None,
        }
    }
}

impl<S> Command<S> {
    pub fn chain(&self) -> &[Argument<S>] {
        &self.chain
    }

    pub fn handler(&self) -> &Handler<S> {
        &self.handler
    }

    pub fn permission(&self) -> Option<&Permission<S>> {
        self.permission.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn syntax(&self) -> SyntaxChain {
        self.chain.iter().map(Argument::syntax_part).collect::<Vec<_>>().into()
    }

    pub(crate) fn into_parts(self) -> CommandParts<S> {
        CommandParts {
            chain: self.chain,
            handler: self.handler,
            permission: self.permission,
            description: self.description,
        }
    }
}

/// A command taken apart for insertion.
pub(crate) struct CommandParts<S> {
    pub(crate) chain: Vec<Argument<S>>,
    pub(crate) handler: Handler<S>,
    pub(crate) permission: Option<Permission<S>>,
    pub(crate) description: Option<String>,
}

impl<S> Clone for Command<S> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            handler: Arc::clone(&self.handler),
            permission: self.permission.clone(),
            description: self.description.clone(),
        }
    }
}

impl<S> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("syntax", &self.syntax().to_string())
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

/// Fluent, immutable builder: every step returns a new builder, so a shared
/// prefix can be cloned and extended into several commands.
///
/// ```
/// use cmdtree::{BasicSender, Command, parser::IntegerParser};
///
/// let give = Command::<BasicSender>::builder("give")
///     .alias("g")
///     .required("amount", IntegerParser::range(1, 64))
///     .permission("game.give")
///     .handler(|ctx| {
///         let amount: i64 = ctx.get("amount").unwrap_or_default();
///         println!("giving {amount}");
///         Ok(())
///     });
/// assert_eq!(give.syntax().to_string(), "give <amount>");
/// ```
pub struct CommandBuilder<S> {
    chain: Vec<Argument<S>>,
    permission: Option<Permission<S>>,
    description: Option<String>,
}

impl<S: CommandSender> CommandBuilder<S> {
    /// Alias the most recently added literal.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(literal) = self
            .chain
            .iter_mut()
            .rev()
            .find_map(Argument::literal_parser_mut)
        {
            literal.add_alias(alias);
        }
        self
    }

    /// Append a sub-command literal.
    pub fn literal(self, name: impl Into<String>) -> Self {
        self.argument(Argument::literal(name))
    }

    pub fn argument(mut self, argument: Argument<S>) -> Self {
        self.chain.push(argument);
        self
    }

    pub fn required(self, name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        self.argument(Argument::required(name, parser))
    }

    pub fn optional(self, name: impl Into<String>, parser: impl ArgumentParser<S> + 'static) -> Self {
        self.argument(Argument::optional(name, parser))
    }

    /// Append a trailing flag group bound as `flags`.
    pub fn flags(self, parser: FlagParser<S>) -> Self {
        self.argument(Argument::flags("flags", parser))
    }

    /// Permission required to see and run the command.
    pub fn permission(mut self, permission: impl Into<Permission<S>>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn syntax(&self) -> SyntaxChain {
        self.chain.iter().map(Argument::syntax_part).collect::<Vec<_>>().into()
    }

    /// Finish the command with its handler.
    pub fn handler<F>(self, handler: F) -> Command<S>
    where
        F: Fn(&CommandContext<'_, S>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Command {
            chain: self.chain,
            handler: Arc::new(handler),
            permission: self.permission,
            description: self.description,
        }
    }
}

impl<S> Clone for CommandBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            permission: self.permission.clone(),
            description: self.description.clone(),
        }
    }
}
