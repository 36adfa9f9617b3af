//! Help listing: every command a sender can reach, with its syntax.

use serde::Serialize;

use crate::sender::CommandSender;
use crate::syntax::{SyntaxChain, SyntaxPart};

use super::{CommandNode, CommandTree};

/// One runnable command as shown by help output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub syntax: SyntaxChain,
    pub description: Option<String>,
}

impl<S: CommandSender> CommandTree<S> {
    /// Terminal nodes visible to `sender`, in tree order.
    ///
    /// A non-empty `query` keeps only commands whose rendered syntax starts
    /// with it.
    pub fn help_entries(&self, sender: &S, query: &str) -> Vec<HelpEntry> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        collect(&self.root, sender, &mut path, &mut entries);

        let query = query.trim();
        if !query.is_empty() {
            entries.retain(|entry| entry.syntax.to_string().starts_with(query));
        }
        entries
    }
}

fn collect<S: CommandSender>(
    node: &CommandNode<S>,
    sender: &S,
    path: &mut Vec<SyntaxPart>,
    entries: &mut Vec<HelpEntry>,
) {
    for child in node.visible_children(sender) {
        let Some(part) = child.syntax_part() else {
            continue;
        };
        path.push(part);
        if child.is_terminal() {
            entries.push(HelpEntry {
                syntax: SyntaxChain::from(path.clone()),
                description: child.description.clone(),
            });
        }
        collect(child, sender, path, entries);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::parser::{IntegerParser, StringParser};
    use crate::sender::BasicSender;

    #[test]
    fn test_entries_follow_tree_order_and_permissions() {
        let mut tree = CommandTree::<BasicSender>::new();
        tree.insert(
            Command::builder("give")
                .required("amount", IntegerParser::range(1, 64))
                .optional("target", StringParser::single())
                .description("give items")
                .handler(|_| Ok(())),
        )
        .expect("give");
        tree.insert(
            Command::builder("config")
                .literal("get")
                .required("key", StringParser::single())
                .permission("config.read")
                .handler(|_| Ok(())),
        )
        .expect("config get");

        let guest = BasicSender::new("guest");
        let entries = tree.help_entries(&guest, "");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].syntax.to_string(), "give <amount> [target]");
        assert_eq!(entries[0].description.as_deref(), Some("give items"));

        let reader = BasicSender::new("reader").grant("config.read");
        let rendered: Vec<String> = tree
            .help_entries(&reader, "config")
            .iter()
            .map(|entry| entry.syntax.to_string())
            .collect();
        assert_eq!(rendered, vec!["config get <key>"]);
    }
}
