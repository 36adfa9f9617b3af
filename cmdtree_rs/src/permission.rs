//! Permission predicates attached to argument nodes and commands.

use std::fmt;
use std::sync::Arc;

use crate::sender::CommandSender;

/// Requirement a sender must satisfy to see a node.
pub enum Permission<S> {
    /// A named permission checked through [`CommandSender::has_permission`].
    Node(String),
    /// An arbitrary check on the sender. `label` names it in error messages.
    Predicate {
        label: String,
        check: Arc<dyn Fn(&S) -> bool + Send + Sync>,
    },
    AnyOf(Vec<Permission<S>>),
    AllOf(Vec<Permission<S>>),
}

impl<S: CommandSender> Permission<S> {
    pub fn node(name: impl Into<String>) -> Self {
        Permission::Node(name.into())
    }

    pub fn predicate<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Permission::Predicate {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    pub fn allows(&self, sender: &S) -> bool {
        match self {
            Permission::Node(name) => sender.has_permission(name),
            Permission::Predicate { check, .. } => check(sender),
            Permission::AnyOf(options) => options.iter().any(|p| p.allows(sender)),
            Permission::AllOf(required) => required.iter().all(|p| p.allows(sender)),
        }
    }
}

impl<S> Permission<S> {
    /// Structural equality: named nodes by name, predicates by identity.
    pub fn same_requirement(&self, other: &Permission<S>) -> bool {
        match (self, other) {
            (Permission::Node(a), Permission::Node(b)) => a == b,
            (Permission::Predicate { check: a, .. }, Permission::Predicate { check: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            (Permission::AnyOf(a), Permission::AnyOf(b))
            | (Permission::AllOf(a), Permission::AllOf(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_requirement(y))
            }
            _ => false,
        }
    }
}

impl<S> Clone for Permission<S> {
    fn clone(&self) -> Self {
        match self {
            Permission::Node(name) => Permission::Node(name.clone()),
            Permission::Predicate { label, check } => Permission::Predicate {
                label: label.clone(),
                check: Arc::clone(check),
            },
            Permission::AnyOf(options) => Permission::AnyOf(options.clone()),
            Permission::AllOf(required) => Permission::AllOf(required.clone()),
        }
    }
}

impl<S> fmt::Display for Permission<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Node(name) => f.write_str(name),
            Permission::Predicate { label, .. } => f.write_str(label),
            Permission::AnyOf(options) => write_joined(f, options, " | "),
            Permission::AllOf(required) => write_joined(f, required, " & "),
        }
    }
}

fn write_joined<S>(f: &mut fmt::Formatter<'_>, parts: &[Permission<S>], sep: &str) -> fmt::Result {
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{part}")?;
    }
    Ok(())
}

impl<S> fmt::Debug for Permission<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permission({self})")
    }
}

impl<S> From<&str> for Permission<S> {
    fn from(name: &str) -> Self {
        Permission::Node(name.to_string())
    }
}

impl<S> From<String> for Permission<S> {
    fn from(name: String) -> Self {
        Permission::Node(name)
    }
}
