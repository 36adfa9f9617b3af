//! Command senders: the identity behind an invocation.

use std::collections::BTreeSet;

/// Identity that issues commands.
///
/// The tree only asks a sender whether it holds a named permission. Anything
/// richer (locations, worlds, player handles) lives in the implementing type
/// and is reachable from handlers and context-bound parsers through
/// [`CommandContext::sender`](crate::CommandContext::sender).
pub trait CommandSender: Send + Sync + 'static {
    fn has_permission(&self, permission: &str) -> bool;
}

/// A sender backed by a fixed permission set.
///
/// A granted `*` matches every permission, and a granted `prefix.*` matches
/// every permission under `prefix.`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicSender {
    name: String,
    permissions: BTreeSet<String>,
}

impl BasicSender {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// A sender holding every permission.
    pub fn console() -> Self {
        Self::new("console").grant("*")
    }

    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }
}

impl CommandSender for BasicSender {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == "*"
                || granted == permission
                || granted
                    .strip_suffix('*')
                    .is_some_and(|prefix| prefix.ends_with('.') && permission.starts_with(prefix))
        })
    }
}
