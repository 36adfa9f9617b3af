//! Argument parsers: the capability behind every dynamic node.
//!
//! A parser consumes a deterministic number of leading tokens from a
//! [`TokenCursor`] and returns a typed [`Value`], or an [`ArgumentError`]
//! without consuming anything the tree cannot rewind. Independently it can
//! propose completions for a partially typed token.
//!
//! # Module Structure
//!
//! - [`literal`] - fixed names with aliases (sub-command names)
//! - [`integer`] - bounded `i64` values
//! - [`string`] - single-token and greedy strings, optional regex constraint
//! - [`choice`] - one of a fixed set of words
//! - [`flag`] - `--flag` / `-f` groups that consume trailing input
//! - [`compound`] - several sub-parsers bound as one list value
//! - [`function`] - closure-backed, context-bound user parsers

pub mod choice;
pub mod compound;
pub mod flag;
pub mod function;
pub mod integer;
pub mod literal;
pub mod string;

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::context::CommandContext;
use crate::error::ArgumentError;
use crate::input::TokenCursor;
use crate::syntax::FlagSyntax;
use crate::value::Value;

pub use choice::ChoiceParser;
pub use compound::CompoundParser;
pub use flag::{Flag, FlagParser};
pub use function::{FnParser, from_fn};
pub use integer::IntegerParser;
pub use literal::LiteralParser;
pub use string::{StringMode, StringParser};

/// Per-argument completion override, replacing the parser's own suggestions.
pub type SuggestionProvider<S> =
    Arc<dyn Fn(&CommandContext<'_, S>, &str) -> Vec<String> + Send + Sync>;

/// Capability implemented by every argument type.
pub trait ArgumentParser<S>: Send + Sync {
    /// Consume leading tokens from `input` and produce a value.
    ///
    /// On failure the tree rewinds the cursor, so implementations may return
    /// early without restoring it, but they must not touch tokens beyond the
    /// ones they would consume on success.
    fn parse(
        &self,
        ctx: &mut CommandContext<'_, S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentError>;

    /// Completions for the partially typed `input`. Must be side-effect free.
    fn suggestions(&self, _ctx: &CommandContext<'_, S>, _input: &str) -> Vec<String> {
        Vec::new()
    }

    /// Whether the result depends on the input tokens alone.
    fn is_context_free(&self) -> bool {
        false
    }

    /// The input space this parser accepts, used to reject ambiguous siblings.
    fn shape(&self) -> InputShape {
        InputShape::Any
    }

    /// Whether the parser swallows all trailing input (greedy strings, flags).
    fn consumes_remaining(&self) -> bool {
        false
    }

    /// Flags rendered for syntax hints, for flag-group parsers.
    fn flag_syntax(&self) -> Option<Vec<FlagSyntax>> {
        None
    }
}

/// Coarse description of the tokens a parser accepts.
///
/// Two dynamic siblings may coexist only when their shapes cannot both
/// accept the same leading token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputShape {
    Any,
    Integer { min: i64, max: i64 },
    /// Lower-cased accepted words.
    Choices(BTreeSet<String>),
    Flags,
}

impl InputShape {
    pub fn overlaps(&self, other: &InputShape) -> bool {
        match (self, other) {
            (
                InputShape::Integer { min: a_min, max: a_max },
                InputShape::Integer { min: b_min, max: b_max },
            ) => a_min <= b_max && b_min <= a_max,
            (InputShape::Choices(a), InputShape::Choices(b)) => !a.is_disjoint(b),
            (InputShape::Integer { min, max }, InputShape::Choices(words))
            | (InputShape::Choices(words), InputShape::Integer { min, max }) => {
                words.iter().any(|word| {
                    word.parse::<i64>()
                        .is_ok_and(|number| (*min..=*max).contains(&number))
                })
            }
            _ => true,
        }
    }
}

/// Run `parser.parse`, turning a panic into a failed match.
pub(crate) fn guarded_parse<S>(
    parser: &dyn ArgumentParser<S>,
    ctx: &mut CommandContext<'_, S>,
    input: &mut TokenCursor<'_>,
) -> Result<Value, ArgumentError> {
    match panic::catch_unwind(AssertUnwindSafe(|| parser.parse(ctx, input))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "argument parser panicked; treating branch as failed");
            Err(ArgumentError::ParserPanicked { message })
        }
    }
}

/// Run a suggestion source, turning a panic into "no suggestions".
pub(crate) fn guarded_suggestions(source: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match panic::catch_unwind(AssertUnwindSafe(source)) {
        Ok(suggestions) => suggestions,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "suggestion provider panicked; dropping its suggestions");
            Vec::new()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> InputShape {
        InputShape::Choices(list.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_integer_ranges_overlap_only_when_intersecting() {
        let low = InputShape::Integer { min: 1, max: 5 };
        let high = InputShape::Integer { min: 6, max: 10 };
        let wide = InputShape::Integer {
            min: i64::MIN,
            max: i64::MAX,
        };
        assert!(!low.overlaps(&high));
        assert!(low.overlaps(&wide));
        assert!(wide.overlaps(&wide));
    }

    #[test]
    fn test_choices_and_any() {
        assert!(!words(&["red", "blue"]).overlaps(&words(&["green"])));
        assert!(words(&["red"]).overlaps(&words(&["red", "green"])));
        assert!(InputShape::Any.overlaps(&words(&["red"])));
        assert!(InputShape::Flags.overlaps(&InputShape::Integer { min: 0, max: 1 }));
        assert!(!words(&["7", "x"]).overlaps(&InputShape::Integer { min: 1, max: 5 }));
        assert!(words(&["3"]).overlaps(&InputShape::Integer { min: 1, max: 5 }));
    }

    #[test]
    fn test_guarded_suggestions_swallow_panics() {
        let suggestions = guarded_suggestions(|| panic!("provider exploded"));
        assert!(suggestions.is_empty());
        assert_eq!(guarded_suggestions(|| vec!["ok".into()]), vec!["ok".to_string()]);
    }
}
