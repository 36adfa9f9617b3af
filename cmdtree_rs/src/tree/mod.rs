//! The command tree: a trie of argument nodes rooted at command literals.
//!
//! # Module Structure
//!
//! - [`insert`] - merging command chains into shared prefixes, all-or-nothing
//! - [`parse`] - token descent into a bound [`Invocation`]
//! - [`suggest`] - the same descent, non-destructively, for completions
//! - [`help`] - listing reachable commands with their syntax
//!
//! Children are ordered: literal children always precede dynamic ones, and
//! within each group insertion order is kept. Both traversals rely on it.

pub mod help;
mod insert;
pub mod parse;
pub mod suggest;

use std::fmt;

use crate::argument::Argument;
use crate::command::Handler;
use crate::permission::Permission;
use crate::sender::CommandSender;
use crate::syntax::{StandardSyntaxFormatter, SyntaxPart};

pub use help::HelpEntry;
pub use parse::{Invocation, ParseOptions};
pub use suggest::SuggestOptions;

/// Who may see a node, aggregated over every command registered through it.
///
/// A node is open once any command without a permission passes through it;
/// otherwise it is visible to senders holding any one of the recorded
/// command permissions.
struct Access<S> {
    open: bool,
    permissions: Vec<Permission<S>>,
}

impl<S> Access<S> {
    fn open() -> Self {
        Self {
            open: true,
            permissions: Vec::new(),
        }
    }

    fn closed() -> Self {
        Self {
            open: false,
            permissions: Vec::new(),
        }
    }

    fn grant(&mut self, permission: Option<&Permission<S>>) {
        match permission {
            None => {
                self.open = true;
                self.permissions.clear();
            }
            Some(permission) if !self.open => self.permissions.push(permission.clone()),
            Some(_) => {}
        }
    }
}

impl<S> Clone for Access<S> {
    fn clone(&self) -> Self {
        Self {
            open: self.open,
            permissions: self.permissions.clone(),
        }
    }
}

/// One node of the tree. The root is the only node without an argument.
pub struct CommandNode<S> {
    argument: Option<Argument<S>>,
    children: Vec<CommandNode<S>>,
    handler: Option<Handler<S>>,
    description: Option<String>,
    access: Access<S>,
}

impl<S> CommandNode<S> {
    fn root() -> Self {
        Self {
            argument: None,
            children: Vec::new(),
            handler: None,
            description: None,
            access: Access::open(),
        }
    }

    fn new(argument: Argument<S>) -> Self {
        Self {
            argument: Some(argument),
            children: Vec::new(),
            handler: None,
            description: None,
            access: Access::closed(),
        }
    }

    pub fn argument(&self) -> Option<&Argument<S>> {
        self.argument.as_ref()
    }

    pub fn name(&self) -> &str {
        self.argument.as_ref().map(Argument::name).unwrap_or_default()
    }

    pub fn children(&self) -> &[CommandNode<S>] {
        &self.children
    }

    pub fn handler(&self) -> Option<&Handler<S>> {
        self.handler.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A node with an attached handler: a complete, executable command.
    pub fn is_terminal(&self) -> bool {
        self.handler.is_some()
    }

    pub fn is_literal(&self) -> bool {
        self.argument.as_ref().is_some_and(Argument::is_literal)
    }

    fn syntax_part(&self) -> Option<SyntaxPart> {
        self.argument.as_ref().map(Argument::syntax_part)
    }

    fn rendered(&self) -> String {
        self.syntax_part()
            .map(|part| StandardSyntaxFormatter::part(&part))
            .unwrap_or_default()
    }

    /// Whether this is a literal node spelled `token` (name or alias).
    fn matches_literal(&self, token: &str) -> bool {
        self.argument
            .as_ref()
            .and_then(Argument::literal_parser)
            .is_some_and(|literal| literal.matches(token))
    }
}

impl<S: CommandSender> CommandNode<S> {
    /// The first requirement `sender` fails on this node, rendered for display.
    pub fn denied_permission(&self, sender: &S) -> Option<String> {
        if let Some(permission) = self.argument.as_ref().and_then(Argument::permission) {
            if !permission.allows(sender) {
                return Some(permission.to_string());
            }
        }
        if self.access.open || self.access.permissions.iter().any(|p| p.allows(sender)) {
            return None;
        }
        let labels: Vec<String> = self.access.permissions.iter().map(ToString::to_string).collect();
        Some(labels.join(" | "))
    }

    pub fn permits(&self, sender: &S) -> bool {
        self.denied_permission(sender).is_none()
    }

    /// Children `sender` may see, in tree order.
    pub fn visible_children<'a>(&'a self, sender: &'a S) -> impl Iterator<Item = &'a CommandNode<S>> {
        self.children.iter().filter(move |child| child.permits(sender))
    }
}

impl<S> Clone for CommandNode<S> {
    fn clone(&self) -> Self {
        Self {
            argument: self.argument.clone(),
            children: self.children.clone(),
            handler: self.handler.clone(),
            description: self.description.clone(),
            access: self.access.clone(),
        }
    }
}

impl<S> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("argument", &self.argument)
            .field("terminal", &self.is_terminal())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// The registered command forest.
///
/// A tree is immutable once shared: [`CommandDispatcher`](crate::CommandDispatcher)
/// clones it to insert and swaps the result in, so parse and suggest calls
/// only ever read.
pub struct CommandTree<S> {
    root: CommandNode<S>,
}

impl<S> CommandTree<S> {
    pub fn new() -> Self {
        Self {
            root: CommandNode::root(),
        }
    }

    pub fn root(&self) -> &CommandNode<S> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Number of terminal nodes, i.e. registered commands.
    pub fn command_count(&self) -> usize {
        fn count<S>(node: &CommandNode<S>) -> usize {
            usize::from(node.is_terminal()) + node.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    /// Primary names of the children reached by following `path` through
    /// literal spellings. Empty when the path does not exist.
    pub fn child_names(&self, path: &[&str]) -> Vec<String> {
        let mut node = &self.root;
        for segment in path {
            match node.children.iter().find(|child| child.matches_literal(segment)) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        node.children.iter().map(|child| child.name().to_string()).collect()
    }
}

impl<S> Default for CommandTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for CommandTree<S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<S> fmt::Debug for CommandTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("commands", &self.root.children)
            .finish()
    }
}
