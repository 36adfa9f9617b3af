//! Completion: the parse descent run over every token but the last.
//!
//! The prefix must parse; if it does not, there is nothing sensible to
//! complete and the result is empty. From the node the prefix reaches, the
//! permitted literal children whose spelling starts with the partial token
//! come first, followed by the suggestions of the permitted dynamic children.
//! A node that swallows trailing input (greedy strings, flag groups), or a
//! compound argument still missing parts, instead completes the partial token
//! itself.

use tracing::trace;

use crate::argument::Argument;
use crate::context::CommandContext;
use crate::input::TokenCursor;
use crate::parser::guarded_suggestions;
use crate::sender::CommandSender;

use super::parse::{ParseOptions, Walk};
use super::{CommandNode, CommandTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Offer literal aliases alongside primary names.
    pub include_aliases: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            include_aliases: true,
        }
    }
}

impl<S: CommandSender> CommandTree<S> {
    /// Candidates for the last token of `tokens`, in tree order, without
    /// duplicates. Never fails: broken providers contribute nothing.
    pub fn suggest(
        &self,
        mut context: CommandContext<'_, S>,
        tokens: &[String],
        options: &SuggestOptions,
    ) -> Vec<String> {
        let (partial, prefix) = match tokens.split_last() {
            Some((last, prefix)) => (last.as_str(), prefix),
            None => ("", tokens),
        };

        let parse_options = ParseOptions {
            did_you_mean_distance: 0,
            check_permissions: true,
        };
        let mut walk = Walk::new(context.sender(), &parse_options);
        let mut cursor = TokenCursor::new(prefix);
        let mut node = &self.root;
        while let Some(token) = cursor.peek() {
            match walk.step(node, token, &mut context, &mut cursor) {
                Ok(next) => node = next,
                Err(err) => {
                    trace!(%err, "prefix does not parse; nothing to suggest");
                    return Vec::new();
                }
            }
        }

        let mut suggestions = Vec::new();
        let unfinished = context.pending_part().is_some();
        if unfinished || node.argument.as_ref().is_some_and(Argument::consumes_remaining) {
            suggestions.extend(dynamic_suggestions(node, &context, partial));
        } else {
            let children = walk.candidates(node);
            for literal in children
                .iter()
                .filter_map(|child| child.argument.as_ref().and_then(Argument::literal_parser))
            {
                suggestions.extend(literal.completions(partial, options.include_aliases));
            }
            for child in children.iter().filter(|child| !child.is_literal()) {
                suggestions.extend(dynamic_suggestions(child, &context, partial));
            }
        }

        dedupe(suggestions)
    }
}

fn dynamic_suggestions<S>(
    node: &CommandNode<S>,
    context: &CommandContext<'_, S>,
    partial: &str,
) -> Vec<String> {
    let Some(argument) = node.argument.as_ref() else {
        return Vec::new();
    };
    if let Some(provider) = argument.suggestion_provider() {
        return guarded_suggestions(|| provider(context, partial));
    }
    match argument.parser() {
        Some(parser) => guarded_suggestions(|| parser.suggestions(context, partial)),
        None => Vec::new(),
    }
}

fn dedupe(suggestions: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    suggestions
        .into_iter()
        .filter(|suggestion| seen.insert(suggestion.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::command::Command;
    use crate::input::tokenize_partial;
    use crate::parser::{
        ChoiceParser, CompoundParser, Flag, FlagParser, IntegerParser, StringParser,
    };
    use crate::sender::BasicSender;

    fn tree() -> CommandTree<BasicSender> {
        let mut tree = CommandTree::new();
        tree.insert(
            Command::builder("give")
                .required("amount", IntegerParser::range(1, 64))
                .handler(|_| Ok(())),
        )
        .expect("give");
        tree.insert(Command::builder("gamemode").alias("gm").handler(|_| Ok(())))
            .expect("gamemode");
        tree.insert(
            Command::builder("kick")
                .required("player", StringParser::single().with_completions(["alex", "bob"]))
                .flags(
                    FlagParser::new()
                        .flag(Flag::presence("silent").alias('s'))
                        .flag(Flag::with_value("reason", ChoiceParser::new(["afk", "spam"]))),
                )
                .permission("admin.kick")
                .handler(|_| Ok(())),
        )
        .expect("kick");
        tree.insert(
            Command::builder("warp")
                .argument(
                    Argument::required("place", StringParser::single())
                        .with_suggestions(|_, _| panic!("registry offline")),
                )
                .handler(|_| Ok(())),
        )
        .expect("warp");
        tree
    }

    fn suggest(tree: &CommandTree<BasicSender>, sender: &BasicSender, line: &str) -> Vec<String> {
        tree.suggest(
            CommandContext::for_suggestions(sender),
            &tokenize_partial(line),
            &SuggestOptions::default(),
        )
    }

    #[test]
    fn test_root_literals_with_aliases() {
        let tree = tree();
        let guest = BasicSender::new("guest");
        assert_eq!(suggest(&tree, &guest, "g"), vec!["give", "gamemode", "gm"]);
        assert_eq!(
            tree.suggest(
                CommandContext::for_suggestions(&guest),
                &tokenize_partial("g"),
                &SuggestOptions {
                    include_aliases: false
                },
            ),
            vec!["give", "gamemode"]
        );
    }

    #[test]
    fn test_dynamic_only_node_offers_parser_hints() {
        let tree = tree();
        let guest = BasicSender::new("guest");
        let hints = suggest(&tree, &guest, "give ");
        assert_eq!(hints.len(), 9);
        assert_eq!(hints.first().map(String::as_str), Some("1"));
        assert!(suggest(&tree, &guest, "nope ").is_empty());
    }

    #[test]
    fn test_permission_hides_suggestions() {
        let tree = tree();
        let guest = BasicSender::new("guest");
        let admin = BasicSender::new("admin").grant("admin.kick");

        assert!(suggest(&tree, &guest, "k").is_empty());
        assert_eq!(suggest(&tree, &admin, "k"), vec!["kick"]);
        assert!(suggest(&tree, &guest, "kick ").is_empty());
        assert_eq!(suggest(&tree, &admin, "kick "), vec!["alex", "bob"]);
    }

    #[test]
    fn test_flag_completion() {
        let tree = tree();
        let admin = BasicSender::new("admin").grant("admin.kick");
        assert_eq!(
            suggest(&tree, &admin, "kick bob "),
            vec!["--silent", "--reason"]
        );
        assert_eq!(suggest(&tree, &admin, "kick bob -s --"), vec!["--reason"]);
        assert_eq!(
            suggest(&tree, &admin, "kick bob --reason "),
            vec!["afk", "spam"]
        );
    }

    #[test]
    fn test_panicking_provider_contributes_nothing() {
        let tree = tree();
        let guest = BasicSender::new("guest");
        assert!(suggest(&tree, &guest, "warp ").is_empty());
    }

    #[test]
    fn test_partly_typed_compound_completes_next_part() {
        let mut tree = CommandTree::<BasicSender>::new();
        tree.insert(
            Command::builder("pos")
                .required(
                    "at",
                    CompoundParser::new()
                        .part("x", IntegerParser::range(0, 9))
                        .part("face", ChoiceParser::new(["north", "south"])),
                )
                .literal("mark")
                .handler(|_| Ok(())),
        )
        .expect("pos");
        let guest = BasicSender::new("guest");

        assert_eq!(suggest(&tree, &guest, "pos ").len(), 10);
        assert_eq!(suggest(&tree, &guest, "pos 1 "), vec!["north", "south"]);
        assert_eq!(suggest(&tree, &guest, "pos 1 s"), vec!["south"]);
        assert_eq!(suggest(&tree, &guest, "pos 1 south "), vec!["mark"]);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let tree = tree();
        let admin = BasicSender::new("admin").grant("admin.kick");
        let first = suggest(&tree, &admin, "kick bob -");
        let second = suggest(&tree, &admin, "kick bob -");
        assert_eq!(first, second);
        assert_eq!(tree.command_count(), 4);
    }
}
