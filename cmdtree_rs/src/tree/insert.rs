//! Registration: merging a command chain into the tree.
//!
//! Insertion runs in two phases. Planning walks the existing nodes read-only,
//! finds the longest shared prefix and checks every conflict the new chain
//! could introduce. Only a chain that passes is then linked in, so a failed
//! registration leaves the tree exactly as it was.

use std::collections::BTreeSet;

use tracing::debug;

use crate::argument::Argument;
use crate::command::Command;
use crate::error::RegistrationError;
use crate::sender::CommandSender;

use super::{CommandNode, CommandTree};

impl<S: CommandSender> CommandTree<S> {
    /// Link `command` into the tree.
    ///
    /// Fails when two literal siblings would share a spelling, when two
    /// dynamic siblings could accept the same input, when a required argument
    /// follows an optional one, or when the exact command already exists.
    pub fn insert(&mut self, command: Command<S>) -> Result<(), RegistrationError> {
        let syntax = command.syntax().to_string();
        let parts = command.into_parts();

        validate_chain(&parts.chain)?;
        let shared = plan(&self.root, &parts.chain)?;

        // Input may end anywhere after the last required argument. Each of
        // those positions must not already lead to a handler.
        let required = parts
            .chain
            .iter()
            .rposition(Argument::is_required)
            .map_or(0, |index| index + 1);
        for depth in required.max(1)..=shared.len() {
            if reaches_handler(self.node_at(&shared[..depth])) {
                return Err(RegistrationError::DuplicateCommand { syntax });
            }
        }

        let permission = parts.permission.as_ref();
        let mut arguments = parts.chain.into_iter();
        let mut node = &mut self.root;

        for &index in &shared {
            let Some(argument) = arguments.next() else {
                break;
            };
            node = &mut node.children[index];
            node.access.grant(permission);
            merge_aliases(node, &argument);
        }

        let mut created = 0usize;
        for argument in arguments {
            let mut child = CommandNode::new(argument);
            child.access.grant(permission);
            let position = if child.is_literal() {
                node.children
                    .iter()
                    .position(|sibling| !sibling.is_literal())
                    .unwrap_or(node.children.len())
            } else {
                node.children.len()
            };
            node.children.insert(position, child);
            node = &mut node.children[position];
            created += 1;
        }

        node.handler = Some(parts.handler);
        node.description = parts.description;

        debug!(%syntax, shared = shared.len(), created, "registered command");
        Ok(())
    }

    fn node_at(&self, path: &[usize]) -> &CommandNode<S> {
        path.iter()
            .fold(&self.root, |node, &index| &node.children[index])
    }
}

fn validate_chain<S>(chain: &[Argument<S>]) -> Result<(), RegistrationError> {
    let Some(first) = chain.first() else {
        return Err(RegistrationError::EmptyChain);
    };
    if !first.is_literal() {
        return Err(RegistrationError::RootNotLiteral {
            name: first.name().to_string(),
        });
    }

    let mut names = BTreeSet::new();
    let mut seen_optional = false;
    for (index, argument) in chain.iter().enumerate() {
        if !names.insert(argument.name()) {
            return Err(RegistrationError::DuplicateArgumentName {
                name: argument.name().to_string(),
            });
        }
        if argument.is_required() {
            if seen_optional {
                return Err(RegistrationError::MisorderedOptional {
                    argument: argument.name().to_string(),
                });
            }
        } else {
            seen_optional = true;
        }
        if argument.consumes_remaining() && index + 1 < chain.len() {
            return Err(RegistrationError::VariadicNotLast {
                argument: argument.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Indices of the existing nodes the chain shares, root child first.
fn plan<S>(root: &CommandNode<S>, chain: &[Argument<S>]) -> Result<Vec<usize>, RegistrationError> {
    let mut shared = Vec::new();
    let mut node = root;
    for (depth, argument) in chain.iter().enumerate() {
        let parent = parent_label(&chain[..depth]);
        match find_slot(node, argument, &parent)? {
            Some(index) => {
                shared.push(index);
                node = &node.children[index];
            }
            None => break,
        }
    }
    Ok(shared)
}

/// The existing child `argument` merges into, `None` when it needs a new
/// node, or the conflict that forbids adding it beside its siblings.
fn find_slot<S>(
    node: &CommandNode<S>,
    argument: &Argument<S>,
    parent: &str,
) -> Result<Option<usize>, RegistrationError> {
    if let Some(literal) = argument.literal_parser() {
        let existing = node
            .children
            .iter()
            .position(|child| child.is_literal() && child.name() == literal.name());
        for (index, sibling) in node.children.iter().enumerate() {
            if Some(index) == existing {
                continue;
            }
            let Some(other) = sibling.argument().and_then(Argument::literal_parser) else {
                continue;
            };
            if let Some(spelling) = literal.collision_with(other) {
                return Err(RegistrationError::DuplicateLiteral {
                    name: spelling.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        return Ok(existing);
    }

    for (index, sibling) in node.children.iter().enumerate() {
        let Some(existing) = sibling.argument().filter(|arg| !arg.is_literal()) else {
            continue;
        };
        if existing.same_slot(argument) {
            return Ok(Some(index));
        }
        if existing.shape().overlaps(&argument.shape()) {
            return Err(RegistrationError::AmbiguousRegistration {
                parent: parent.to_string(),
                existing: existing.name().to_string(),
                conflicting: argument.name().to_string(),
            });
        }
    }
    Ok(None)
}

/// Whether running out of input at `node` ends in a handler, either its own
/// or one behind optional arguments.
fn reaches_handler<S>(node: &CommandNode<S>) -> bool {
    node.is_terminal()
        || node.children.iter().any(|child| {
            child
                .argument()
                .is_some_and(|arg| !arg.is_literal() && !arg.is_required())
                && reaches_handler(child)
        })
}

fn merge_aliases<S>(node: &mut CommandNode<S>, argument: &Argument<S>) {
    let Some(incoming) = argument.literal_parser() else {
        return;
    };
    if let Some(literal) = node.argument.as_mut().and_then(Argument::literal_parser_mut) {
        for alias in incoming.aliases() {
            literal.add_alias(alias.clone());
        }
    }
}

fn parent_label<S>(prefix: &[Argument<S>]) -> String {
    if prefix.is_empty() {
        "<root>".to_string()
    } else {
        prefix
            .iter()
            .map(Argument::name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ChoiceParser, Flag, FlagParser, IntegerParser, StringParser};
    use crate::sender::BasicSender;

    type Tree = CommandTree<BasicSender>;

    fn cmd(name: &str) -> crate::command::CommandBuilder<BasicSender> {
        Command::builder(name)
    }

    #[test]
    fn test_literals_precede_dynamic_children() {
        let mut tree = Tree::new();
        tree.insert(cmd("tp").required("target", StringParser::single()).handler(|_| Ok(())))
            .expect("dynamic first");
        tree.insert(cmd("tp").literal("spawn").handler(|_| Ok(())))
            .expect("literal second");
        tree.insert(cmd("tp").literal("home").handler(|_| Ok(())))
            .expect("literal third");

        assert_eq!(tree.child_names(&["tp"]), vec!["spawn", "home", "target"]);
    }

    #[test]
    fn test_alias_collision_is_rejected() {
        let mut tree = Tree::new();
        tree.insert(cmd("gamemode").alias("gm").handler(|_| Ok(())))
            .expect("first");
        let err = tree
            .insert(cmd("gm").handler(|_| Ok(())))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateLiteral {
                name: "gm".into(),
                parent: "<root>".into()
            }
        );

        // Aliases merge when the same literal is registered again.
        tree.insert(cmd("gamemode").alias("mode").literal("reset").handler(|_| Ok(())))
            .expect("alias merge");
        assert_eq!(tree.child_names(&["mode"]), vec!["reset"]);
    }

    #[test]
    fn test_ambiguous_dynamic_siblings_leave_tree_unchanged() {
        let mut tree = Tree::new();
        tree.insert(cmd("set").required("a", IntegerParser::new()).handler(|_| Ok(())))
            .expect("first");
        let before = format!("{tree:?}");

        let err = tree
            .insert(cmd("set").required("b", IntegerParser::new()).literal("x").handler(|_| Ok(())))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AmbiguousRegistration { .. }));
        assert_eq!(format!("{tree:?}"), before);
        assert_eq!(tree.command_count(), 1);
    }

    #[test]
    fn test_disjoint_shapes_may_coexist() {
        let mut tree = Tree::new();
        tree.insert(cmd("page").required("low", IntegerParser::range(1, 9)).handler(|_| Ok(())))
            .expect("low");
        tree.insert(cmd("page").required("high", IntegerParser::range(10, 99)).handler(|_| Ok(())))
            .expect("high");
        tree.insert(
            cmd("page")
                .required("named", ChoiceParser::new(["first", "last"]))
                .handler(|_| Ok(())),
        )
        .expect("choices");
        assert_eq!(tree.child_names(&["page"]), vec!["low", "high", "named"]);
    }

    #[test]
    fn test_chain_validation() {
        let mut tree = Tree::new();
        let misordered = cmd("give")
            .optional("target", StringParser::single())
            .required("amount", IntegerParser::new())
            .handler(|_| Ok(()));
        assert_eq!(
            tree.insert(misordered).unwrap_err(),
            RegistrationError::MisorderedOptional {
                argument: "amount".into()
            }
        );

        let variadic = cmd("say")
            .required("message", StringParser::greedy())
            .flags(FlagParser::new().flag(Flag::presence("loud")))
            .handler(|_| Ok(()));
        assert!(matches!(
            tree.insert(variadic).unwrap_err(),
            RegistrationError::VariadicNotLast { .. }
        ));

        let root = Command::<BasicSender>::from_parts(
            vec![Argument::required("x", IntegerParser::new())],
            |_| Ok(()),
        );
        assert!(matches!(
            tree.insert(root).unwrap_err(),
            RegistrationError::RootNotLiteral { .. }
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_duplicate_command() {
        let mut tree = Tree::new();
        tree.insert(cmd("ping").handler(|_| Ok(()))).expect("first");
        assert!(matches!(
            tree.insert(cmd("ping").handler(|_| Ok(()))).unwrap_err(),
            RegistrationError::DuplicateCommand { .. }
        ));
        // A longer command through an existing terminal is fine.
        tree.insert(cmd("ping").literal("all").handler(|_| Ok(())))
            .expect("extension");
        assert_eq!(tree.command_count(), 2);
    }

    #[test]
    fn test_optional_suffix_duplicates_are_rejected() {
        let mut tree = Tree::new();
        let give = cmd("give").required("amount", IntegerParser::range(1, 64));
        tree.insert(
            give.clone()
                .optional("target", StringParser::single())
                .handler(|_| Ok(())),
        )
        .expect("give <amount> [target]");

        // `give 5` already ends in a handler through the optional target.
        assert!(matches!(
            tree.insert(give.clone().handler(|_| Ok(()))).unwrap_err(),
            RegistrationError::DuplicateCommand { .. }
        ));

        let mut reverse = Tree::new();
        reverse
            .insert(give.clone().handler(|_| Ok(())))
            .expect("give <amount>");
        assert!(matches!(
            reverse
                .insert(give.optional("target", StringParser::single()).handler(|_| Ok(())))
                .unwrap_err(),
            RegistrationError::DuplicateCommand { .. }
        ));
        assert_eq!(reverse.command_count(), 1);
        assert_eq!(tree.command_count(), 1);
    }

    #[test]
    fn test_required_extension_past_optional_terminal_is_allowed() {
        let mut tree = Tree::new();
        let warp = cmd("warp");
        tree.insert(
            warp.clone()
                .optional("place", StringParser::single())
                .handler(|_| Ok(())),
        )
        .expect("warp [place]");
        tree.insert(warp.literal("list").handler(|_| Ok(())))
            .expect("warp list");
        assert_eq!(tree.command_count(), 2);
    }

    #[test]
    fn test_same_name_with_different_parser_is_ambiguous() {
        let mut tree = Tree::new();
        tree.insert(
            cmd("find")
                .required("q", StringParser::single().matching("^[0-9]+$").expect("regex"))
                .literal("exact")
                .handler(|_| Ok(())),
        )
        .expect("find <q> exact");
        let before = format!("{tree:?}");

        let err = tree
            .insert(
                cmd("find")
                    .required("q", StringParser::single())
                    .literal("all")
                    .handler(|_| Ok(())),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AmbiguousRegistration { .. }));
        assert_eq!(format!("{tree:?}"), before);
    }

    #[test]
    fn test_same_parser_with_different_permission_is_ambiguous() {
        let mut tree = Tree::new();
        let player = Argument::<BasicSender>::required("player", StringParser::single());
        tree.insert(
            cmd("mute")
                .argument(player.clone())
                .literal("chat")
                .handler(|_| Ok(())),
        )
        .expect("mute <player> chat");

        let err = tree
            .insert(
                cmd("mute")
                    .argument(player.clone().with_permission("admin.mute"))
                    .literal("voice")
                    .handler(|_| Ok(())),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::AmbiguousRegistration { .. }));

        // The very same argument shares its node.
        tree.insert(cmd("mute").argument(player).literal("all").handler(|_| Ok(())))
            .expect("shared slot");
        assert_eq!(tree.child_names(&["mute"]), vec!["player"]);
        assert_eq!(tree.command_count(), 2);
    }
}
