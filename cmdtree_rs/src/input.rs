//! Token input for the command tree.
//!
//! Tokenization is deliberately naive: a command line is split on whitespace
//! and no quoting or escaping rules apply. Parsers read the resulting tokens
//! through a [`TokenCursor`], which the tree can rewind when a branch fails.

/// Split a raw command line into tokens.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Split a partially typed command line for completion.
///
/// The last token is the one being typed. When the line is empty or ends in
/// whitespace, the token being typed is empty and is appended explicitly.
pub fn tokenize_partial(input: &str) -> Vec<String> {
    let mut tokens = tokenize(input);
    if tokens.is_empty() || input.ends_with(char::is_whitespace) {
        tokens.push(String::new());
    }
    tokens
}

/// Read position over an ordered token slice.
///
/// Cursors are `Copy`: the tree saves a [`position`](Self::position) before
/// handing the cursor to a parser and [`rewind`](Self::rewind)s on failure,
/// so a failed parser never consumes input.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'a> {
    tokens: &'a [String],
    position: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// The next unconsumed token, if any.
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// The unconsumed token `offset` positions ahead of the next one.
    pub fn peek_at(&self, offset: usize) -> Option<&'a str> {
        self.tokens.get(self.position + offset).map(String::as_str)
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    /// Consume every remaining token.
    pub fn take_rest(&mut self) -> &'a [String] {
        let rest = self.remaining();
        self.position = self.tokens.len();
        rest
    }

    pub fn remaining(&self) -> &'a [String] {
        &self.tokens[self.position.min(self.tokens.len())..]
    }

    /// Number of unconsumed tokens.
    pub fn len(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move back to a position previously returned by [`position`](Self::position).
    pub fn rewind(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }
}

// ============================================================================
// Tests
// ============================================================================
