//! Per-invocation key/value store.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::json;

use crate::value::{FromValue, Value};

/// Values bound while walking the tree for a single parse or suggestion call.
///
/// A context is created fresh for every invocation attempt and owned by the
/// call that created it. Parsers receive it by reference: context-bound
/// parsers read earlier bindings, and every parser may append its own.
pub struct CommandContext<'s, S> {
    sender: &'s S,
    values: BTreeMap<String, Value>,
    flags: BTreeMap<String, Value>,
    pending_flag: Option<String>,
    pending_part: Option<usize>,
    suggestions: bool,
}

impl<'s, S> CommandContext<'s, S> {
    pub fn new(sender: &'s S) -> Self {
        Self {
            sender,
            values: BTreeMap::new(),
            flags: BTreeMap::new(),
            pending_flag: None,
            pending_part: None,
            suggestions: false,
        }
    }

    /// A context for a completion request.
    ///
    /// Parsers can check [`is_suggestions`](Self::is_suggestions) to tolerate
    /// input that is incomplete only because the user is still typing.
    pub fn for_suggestions(sender: &'s S) -> Self {
        Self {
            suggestions: true,
            ..Self::new(sender)
        }
    }

    pub fn sender(&self) -> &'s S {
        self.sender
    }

    pub fn is_suggestions(&self) -> bool {
        self.suggestions
    }

    /// Bind `value` under `name`, replacing any earlier binding.
    pub fn store(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.values.get(name).and_then(T::from_value)
    }

    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn set_flag(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.flags.insert(name.into(), value.into());
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn flag<T: FromValue>(&self, name: &str) -> Option<T> {
        self.flags.get(name).and_then(T::from_value)
    }

    pub fn flags(&self) -> &BTreeMap<String, Value> {
        &self.flags
    }

    /// Value flag whose value has not been typed yet (completion only).
    pub fn pending_flag(&self) -> Option<&str> {
        self.pending_flag.as_deref()
    }

    pub fn set_pending_flag(&mut self, name: Option<String>) {
        self.pending_flag = name;
    }

    /// Index of the next part of a partly typed compound argument
    /// (completion only).
    pub fn pending_part(&self) -> Option<usize> {
        self.pending_part
    }

    pub fn set_pending_part(&mut self, index: Option<usize>) {
        self.pending_part = index;
    }

    /// Bound values and flags as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "values": self.values,
            "flags": self.flags,
        })
    }
}

impl<S> fmt::Debug for CommandContext<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("values", &self.values)
            .field("flags", &self.flags)
            .field("pending_flag", &self.pending_flag)
            .field("pending_part", &self.pending_part)
            .field("suggestions", &self.suggestions)
            .finish_non_exhaustive()
    }
}
