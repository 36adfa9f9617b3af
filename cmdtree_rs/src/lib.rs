//! # cmdtree
//!
//! **Command tree dispatch engine** - typed argument nodes, ambiguity-checked
//! registration, parsing and tab completion for line-oriented command input.
//!
//! Commands are chains of argument nodes: a root literal followed by
//! sub-command literals and parser-backed dynamic arguments. Registration
//! merges chains into a shared tree and rejects overlaps up front, so parsing
//! a line is a single greedy descent and never has to guess.
//!
//! ## Features
//!
//! - **Literal-first matching** - literals (with aliases) are tried before dynamic arguments
//! - **Ambiguity checks at registration** - overlapping siblings fail fast, all-or-nothing
//! - **Optional arguments and defaults** - filled in when input runs out
//! - **Greedy strings and flag groups** - trailing arguments that take the rest of the line
//! - **Permission pruning** - hidden branches look exactly like unknown commands
//! - **Tab completion** - the same descent, non-destructively, over a partial line
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdtree::{BasicSender, Command, CommandDispatcher, parser::IntegerParser};
//!
//! let dispatcher = CommandDispatcher::<BasicSender>::new();
//! dispatcher
//!     .register(
//!         Command::builder("give")
//!             .required("amount", IntegerParser::range(1, 64))
//!             .handler(|ctx| {
//!                 let amount: i64 = ctx.get("amount").unwrap_or_default();
//!                 println!("gave {amount}");
//!                 Ok(())
//!             }),
//!     )
//!     .unwrap();
//!
//! let sender = BasicSender::new("steve");
//! dispatcher.execute(&sender, "give 10").unwrap();
//! assert!(dispatcher.execute(&sender, "give 100").is_err());
//! assert_eq!(dispatcher.suggest(&sender, "gi"), vec!["give"]);
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Argument descriptors: literal or parser-backed, required or optional.
pub mod argument;

/// Command chains, the immutable [`CommandBuilder`] and handler type.
pub mod command;

/// Dispatcher configuration loaded from TOML.
pub mod config;

/// Per-invocation store of bound values and flags.
pub mod context;

/// Registration, parse and dispatch error taxonomy.
pub mod error;

/// Whitespace tokenization and the rewindable [`TokenCursor`](input::TokenCursor).
pub mod input;

/// Argument parsers.
///
/// # Submodules
///
/// - [`parser::literal`] - command and sub-command names
/// - [`parser::integer`] - bounded integers with numeric completion
/// - [`parser::string`] - single, greedy and regex-constrained strings
/// - [`parser::choice`] - one of a fixed set of words
/// - [`parser::flag`] - `--flag` groups
/// - [`parser::compound`] - several values bound as one list
/// - [`parser::function`] - closure-backed parsers
pub mod parser;

/// Permission requirements on nodes and commands.
pub mod permission;

/// The identity issuing commands.
pub mod sender;

/// Syntax chains and their rendering (`give <amount> [target]`).
pub mod syntax;

/// The command tree: insertion, parsing, completion and help listing.
pub mod tree;

/// Parsed argument values.
pub mod value;

mod dispatcher;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use argument::Argument;
pub use command::{Command, CommandBuilder, Handler};
pub use config::{DispatcherConfig, SuggestionFilter};
pub use context::CommandContext;
pub use dispatcher::{CommandDispatcher, SuggestionProcessor};
pub use error::{ArgumentError, DispatchError, ParseError, RegistrationError};
pub use input::{tokenize, tokenize_partial};
pub use parser::ArgumentParser;
pub use permission::Permission;
pub use sender::{BasicSender, CommandSender};
pub use syntax::{StandardSyntaxFormatter, SyntaxChain, SyntaxFormatter, SyntaxPart};
pub use tree::{CommandTree, HelpEntry, Invocation, ParseOptions, SuggestOptions};
pub use value::{FromValue, Value};
