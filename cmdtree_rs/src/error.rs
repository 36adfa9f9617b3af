//! Error types for registration, parsing and dispatch.
//!
//! Failures are plain values, never unwinding control flow:
//!
//! - [`ArgumentError`]: why a single argument parser rejected its input.
//! - [`ParseError`]: why a token sequence did not resolve to exactly one
//!   command. Every variant carries the deepest [`SyntaxChain`] reached, so a
//!   caller can print a "correct syntax is: ..." hint.
//! - [`RegistrationError`]: why a command chain could not be linked into the
//!   tree. Registration is all-or-nothing: on error the tree is unchanged.
//! - [`DispatchError`]: what the dispatcher surfaces to its caller.

use thiserror::Error;

use crate::syntax::SyntaxChain;

/// Failure detail produced by an argument parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("no input was provided")]
    NoInput,

    #[error("'{input}' is not a valid number")]
    NotANumber { input: String },

    #[error("'{input}' is not in the range [{min}, {max}]")]
    OutOfRange { input: String, min: i64, max: i64 },

    #[error("'{input}' does not match the pattern '{pattern}'")]
    PatternMismatch { input: String, pattern: String },

    #[error("'{input}' is not one of: {}", .expected.join(", "))]
    UnknownLiteral { input: String, expected: Vec<String> },

    #[error("'{input}' is not a valid choice, expected one of: {}", .choices.join(", "))]
    InvalidChoice { input: String, choices: Vec<String> },

    #[error("unknown flag '{flag}'")]
    UnknownFlag { flag: String },

    #[error("flag '--{flag}' was given more than once")]
    DuplicateFlag { flag: String },

    #[error("flag '--{flag}' requires a value")]
    MissingFlagValue { flag: String },

    #[error("expected a flag but found '{input}'")]
    ExpectedFlag { input: String },

    /// The parser panicked; the branch is treated as a failed match.
    #[error("argument parser panicked: {message}")]
    ParserPanicked { message: String },

    #[error("{0}")]
    Custom(String),
}

impl ArgumentError {
    pub fn custom(message: impl Into<String>) -> Self {
        ArgumentError::Custom(message.into())
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ArgumentError::OutOfRange { .. })
    }

    pub fn is_no_input(&self) -> bool {
        matches!(self, ArgumentError::NoInput)
    }
}

/// Runtime failure to resolve a token sequence into an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no input provided{}", for_argument(.argument))]
    NoInputProvided {
        /// The argument that was expected next; `None` for an empty command line.
        argument: Option<String>,
        chain: SyntaxChain,
    },

    #[error("unknown command or argument '{input}'{}", did_you_mean(.suggestion))]
    UnrecognizedInput {
        input: String,
        suggestion: Option<String>,
        chain: SyntaxChain,
    },

    #[error("invalid value for argument '{argument}': {source}")]
    ArgumentParseFailure {
        argument: String,
        #[source]
        source: ArgumentError,
        chain: SyntaxChain,
    },

    #[error("invalid command syntax, correct syntax is: {chain}")]
    InvalidSyntax { chain: SyntaxChain },

    /// More than one literal sibling matched a token. Registration rejects
    /// such trees, so reaching this is a defect rather than a user error.
    #[error("ambiguous command tree: '{input}' matched more than one node")]
    AmbiguousAtRuntime { input: String, chain: SyntaxChain },
}

fn for_argument(argument: &Option<String>) -> String {
    argument
        .as_ref()
        .map(|name| format!(" for argument '{name}'"))
        .unwrap_or_default()
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

impl ParseError {
    /// The deepest node chain reached before the failure.
    pub fn chain(&self) -> &SyntaxChain {
        match self {
            ParseError::NoInputProvided { chain, .. }
            | ParseError::UnrecognizedInput { chain, .. }
            | ParseError::ArgumentParseFailure { chain, .. }
            | ParseError::InvalidSyntax { chain }
            | ParseError::AmbiguousAtRuntime { chain, .. } => chain,
        }
    }

    /// Short stable identifier for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::NoInputProvided { .. } => "no_input_provided",
            ParseError::UnrecognizedInput { .. } => "unrecognized_input",
            ParseError::ArgumentParseFailure { .. } => "argument_parse_failure",
            ParseError::InvalidSyntax { .. } => "invalid_syntax",
            ParseError::AmbiguousAtRuntime { .. } => "ambiguous_at_runtime",
        }
    }

    /// Failures a sender could see simply because a branch was pruned.
    pub(crate) fn may_hide_permission(&self) -> bool {
        matches!(
            self,
            ParseError::UnrecognizedInput { .. }
                | ParseError::InvalidSyntax { .. }
                | ParseError::NoInputProvided { .. }
        )
    }
}

/// Registration-time failure. The tree is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("a command needs at least one argument")]
    EmptyChain,

    #[error("command root '{name}' must be a literal")]
    RootNotLiteral { name: String },

    #[error("literal '{name}' collides with an existing sibling under '{parent}'")]
    DuplicateLiteral { name: String, parent: String },

    #[error(
        "argument '{conflicting}' is ambiguous with existing argument '{existing}' under '{parent}'"
    )]
    AmbiguousRegistration {
        parent: String,
        existing: String,
        conflicting: String,
    },

    #[error("required argument '{argument}' follows an optional argument")]
    MisorderedOptional { argument: String },

    #[error("argument '{argument}' consumes all remaining input and must come last")]
    VariadicNotLast { argument: String },

    #[error("argument name '{name}' is used more than once in the same command")]
    DuplicateArgumentName { name: String },

    #[error("command '{syntax}' is already registered")]
    DuplicateCommand { syntax: String },
}

/// Failure surfaced by [`CommandDispatcher`](crate::CommandDispatcher).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Only produced when `permissions.report_denied` is enabled; otherwise a
    /// missing permission looks exactly like an unknown command.
    #[error("missing permission '{permission}'")]
    PermissionDenied { permission: String },

    #[error(transparent)]
    Execution(anyhow::Error),
}

impl DispatchError {
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            DispatchError::Parse(err) => Some(err),
            _ => None,
        }
    }
}
