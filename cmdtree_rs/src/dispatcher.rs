//! The external-facing dispatcher: registration, parse, execute, suggest.
//!
//! The dispatcher owns one [`CommandTree`] behind `RwLock<Arc<_>>`.
//! Registration clones the current tree, inserts into the clone and swaps it
//! in, so readers always hold a consistent snapshot and never wait on a
//! half-linked node. Parse and suggest calls only take the read lock long
//! enough to clone the `Arc`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::command::Command;
use crate::config::DispatcherConfig;
use crate::context::CommandContext;
use crate::error::{DispatchError, RegistrationError};
use crate::input::{tokenize, tokenize_partial};
use crate::sender::CommandSender;
use crate::syntax::{StandardSyntaxFormatter, SyntaxChain, SyntaxFormatter};
use crate::tree::{CommandTree, HelpEntry, Invocation, ParseOptions};

/// Replaces the configured suggestion post-processing. Receives the partial
/// token and the raw suggestions in tree order.
pub type SuggestionProcessor = Arc<dyn Fn(&str, Vec<String>) -> Vec<String> + Send + Sync>;

pub struct CommandDispatcher<S> {
    tree: RwLock<Arc<CommandTree<S>>>,
    config: DispatcherConfig,
    processor: Option<SuggestionProcessor>,
    formatter: Arc<dyn SyntaxFormatter>,
}

impl<S: CommandSender> CommandDispatcher<S> {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            tree: RwLock::new(Arc::new(CommandTree::new())),
            config,
            processor: None,
            formatter: Arc::new(StandardSyntaxFormatter),
        }
    }

    pub fn with_suggestion_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&str, Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.processor = Some(Arc::new(processor));
        self
    }

    pub fn with_formatter(mut self, formatter: impl SyntaxFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register one command. On error the tree is unchanged.
    pub fn register(&self, command: Command<S>) -> Result<(), RegistrationError> {
        self.register_all([command])
    }

    /// Register several commands as one unit: either all are linked in or,
    /// on the first error, none are.
    pub fn register_all(
        &self,
        commands: impl IntoIterator<Item = Command<S>>,
    ) -> Result<(), RegistrationError> {
        let mut guard = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = CommandTree::clone(&guard);
        for command in commands {
            next.insert(command)?;
        }
        *guard = Arc::new(next);
        Ok(())
    }

    /// The current tree. Later registrations do not affect a held snapshot.
    pub fn snapshot(&self) -> Arc<CommandTree<S>> {
        let guard = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Parse a raw command line without running it.
    pub fn parse<'s>(&self, sender: &'s S, input: &str) -> Result<Invocation<'s, S>, DispatchError> {
        self.parse_tokens(sender, &tokenize(input))
    }

    pub fn parse_tokens<'s>(
        &self,
        sender: &'s S,
        tokens: &[String],
    ) -> Result<Invocation<'s, S>, DispatchError> {
        let tree = self.snapshot();
        let options = self.config.parse_options();

        let err = match tree.parse(CommandContext::new(sender), tokens, &options) {
            Ok(invocation) => {
                debug!(syntax = %invocation.syntax(), "parsed command");
                return Ok(invocation);
            }
            Err(err) => err,
        };

        if self.config.permissions.report_denied && err.may_hide_permission() {
            let unchecked = ParseOptions {
                check_permissions: false,
                ..options
            };
            if let Ok(invocation) = tree.parse(CommandContext::new(sender), tokens, &unchecked) {
                if let Some(permission) = invocation.denied_permission() {
                    debug!(%permission, "input matches a command the sender may not run");
                    return Err(DispatchError::PermissionDenied {
                        permission: permission.to_string(),
                    });
                }
            }
        }

        debug!(kind = err.kind(), error = %err, "parse failed");
        Err(err.into())
    }

    /// Parse `input` and run the matched handler.
    pub fn execute(&self, sender: &S, input: &str) -> Result<(), DispatchError> {
        let invocation = self.parse(sender, input)?;
        match invocation.execute() {
            Ok(()) => {
                debug!(syntax = %invocation.syntax(), "command executed");
                Ok(())
            }
            Err(err) => {
                debug!(syntax = %invocation.syntax(), error = %err, "command handler failed");
                Err(DispatchError::Execution(err))
            }
        }
    }

    /// Completions for the last token of a partially typed line.
    pub fn suggest(&self, sender: &S, input: &str) -> Vec<String> {
        self.suggest_tokens(sender, &tokenize_partial(input))
    }

    pub fn suggest_tokens(&self, sender: &S, tokens: &[String]) -> Vec<String> {
        let partial = tokens.last().map(String::as_str).unwrap_or_default();
        let raw = self.snapshot().suggest(
            CommandContext::for_suggestions(sender),
            tokens,
            &self.config.suggest_options(),
        );
        match &self.processor {
            Some(processor) => processor(partial, raw),
            None => self.config.suggestions.process(partial, raw),
        }
    }

    /// Commands `sender` may run, optionally filtered by a syntax prefix.
    pub fn help(&self, sender: &S, query: &str) -> Vec<HelpEntry> {
        self.snapshot().help_entries(sender, query)
    }

    /// Render a chain with the configured formatter.
    pub fn render(&self, chain: &SyntaxChain) -> String {
        self.formatter.format(chain)
    }
}

impl<S: CommandSender> Default for CommandDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for CommandDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("config", &self.config)
            .field("custom_processor", &self.processor.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    use crate::error::ParseError;
    use crate::parser::{IntegerParser, StringParser};
    use crate::sender::BasicSender;
    use crate::syntax::SyntaxPart;

    fn dispatcher(config: DispatcherConfig) -> CommandDispatcher<BasicSender> {
        let dispatcher = CommandDispatcher::with_config(config);
        dispatcher
            .register(
                Command::builder("give")
                    .required("amount", IntegerParser::range(1, 64))
                    .handler(|_| Ok(())),
            )
            .expect("give");
        dispatcher
            .register(
                Command::builder("ban")
                    .required("player", StringParser::single())
                    .permission("admin.ban")
                    .handler(|_| Ok(())),
            )
            .expect("ban");
        dispatcher
    }

    #[test]
    fn test_execute_runs_handler() {
        let total = Arc::new(AtomicI64::new(0));
        let seen = Arc::clone(&total);
        let dispatcher = CommandDispatcher::<BasicSender>::new();
        dispatcher
            .register(
                Command::builder("add")
                    .required("n", IntegerParser::new())
                    .handler(move |ctx| {
                        seen.fetch_add(ctx.get_or("n", 0_i64), Ordering::SeqCst);
                        Ok(())
                    }),
            )
            .expect("add");

        let sender = BasicSender::console();
        dispatcher.execute(&sender, "add 5").expect("runs");
        dispatcher.execute(&sender, "add  7 ").expect("runs");
        assert_eq!(total.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_handler_error_is_execution_error() {
        let dispatcher = CommandDispatcher::<BasicSender>::new();
        dispatcher
            .register(Command::builder("fail").handler(|_| anyhow::bail!("nope")))
            .expect("fail");
        let err = dispatcher
            .execute(&BasicSender::console(), "fail")
            .unwrap_err();
        assert!(matches!(err, DispatchError::Execution(_)));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_denied_is_hidden_by_default() {
        let dispatcher = dispatcher(DispatcherConfig::default());
        let guest = BasicSender::new("guest");
        let err = dispatcher.parse(&guest, "ban bob").unwrap_err();
        assert!(matches!(
            err.as_parse(),
            Some(ParseError::UnrecognizedInput { .. })
        ));
    }

    #[test]
    fn test_report_denied_opt_in() {
        let mut config = DispatcherConfig::default();
        config.permissions.report_denied = true;
        let dispatcher = dispatcher(config);
        let guest = BasicSender::new("guest");

        match dispatcher.parse(&guest, "ban bob").unwrap_err() {
            DispatchError::PermissionDenied { permission } => assert_eq!(permission, "admin.ban"),
            other => panic!("unexpected error: {other}"),
        }
        // Genuinely unknown input stays unknown.
        assert!(dispatcher.parse(&guest, "unban bob").unwrap_err().as_parse().is_some());
    }

    #[test]
    fn test_failed_batch_registration_is_atomic() {
        let dispatcher = dispatcher(DispatcherConfig::default());
        let before = dispatcher.snapshot().command_count();
        let result = dispatcher.register_all([
            Command::builder("heal").handler(|_| Ok(())),
            Command::builder("give")
                .required("amount", IntegerParser::range(1, 64))
                .handler(|_| Ok(())),
        ]);
        assert!(matches!(
            result,
            Err(RegistrationError::AmbiguousRegistration { .. })
        ));
        assert_eq!(dispatcher.snapshot().command_count(), before);

        let result = dispatcher.register_all([
            Command::builder("heal").handler(|_| Ok(())),
            Command::builder("heal").handler(|_| Ok(())),
        ]);
        assert!(matches!(result, Err(RegistrationError::DuplicateCommand { .. })));
        assert_eq!(dispatcher.snapshot().command_count(), before);
    }

    #[test]
    fn test_snapshot_is_stable_across_registration() {
        let dispatcher = dispatcher(DispatcherConfig::default());
        let held = dispatcher.snapshot();
        dispatcher
            .register(Command::builder("heal").handler(|_| Ok(())))
            .expect("heal");
        assert_eq!(held.command_count(), 2);
        assert_eq!(dispatcher.snapshot().command_count(), 3);
    }

    #[test]
    fn test_suggestions_are_processed() {
        let dispatcher = dispatcher(DispatcherConfig::default());
        let console = BasicSender::console();
        assert_eq!(dispatcher.suggest(&console, "give 6"), vec!["6", "60", "61", "62", "63", "64"]);
        assert_eq!(dispatcher.suggest(&console, ""), vec!["give", "ban"]);

        let custom = dispatcher.with_suggestion_processor(|partial, raw| {
            raw.into_iter().map(|s| format!("{partial}:{s}")).collect()
        });
        assert_eq!(custom.suggest(&console, "b"), vec!["b:ban"]);
    }

    #[test]
    fn test_custom_formatter() {
        struct Upper;
        impl SyntaxFormatter for Upper {
            fn format(&self, chain: &SyntaxChain) -> String {
                StandardSyntaxFormatter.format(chain).to_uppercase()
            }
        }
        let dispatcher = CommandDispatcher::<BasicSender>::new().with_formatter(Upper);
        let chain = SyntaxChain::new().with(SyntaxPart::Literal("give".into()));
        assert_eq!(dispatcher.render(&chain), "GIVE");
    }
}
