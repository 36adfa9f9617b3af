//! Dispatcher configuration.
//!
//! Loaded from an optional TOML file. Every section has defaults, so an empty
//! or partial file is valid.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::tree::{ParseOptions, SuggestOptions};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Maximum edit distance for "did you mean" hints; `0` disables them.
    pub did_you_mean_distance: usize,
    pub suggestions: SuggestionConfig,
    pub permissions: PermissionConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            did_you_mean_distance: 2,
            suggestions: SuggestionConfig::default(),
            permissions: PermissionConfig::default(),
        }
    }
}

/// How raw suggestions are post-processed before they reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub filter: SuggestionFilter,
    /// Offer literal aliases alongside primary names.
    pub include_aliases: bool,
    /// Cap on the number of suggestions returned.
    pub limit: Option<usize>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            filter: SuggestionFilter::default(),
            include_aliases: true,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionFilter {
    /// Keep suggestions starting with the partial token.
    #[default]
    StartsWith,
    StartsWithIgnoreCase,
    /// Pass everything through.
    #[serde(rename = "none")]
    Disabled,
}

impl SuggestionFilter {
    pub fn accepts(&self, partial: &str, suggestion: &str) -> bool {
        match self {
            SuggestionFilter::StartsWith => suggestion.starts_with(partial),
            SuggestionFilter::StartsWithIgnoreCase => suggestion
                .to_lowercase()
                .starts_with(&partial.to_lowercase()),
            SuggestionFilter::Disabled => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Report `PermissionDenied` instead of "unknown command" when the input
    /// would match a command the sender may not run.
    pub report_denied: bool,
}

impl SuggestionConfig {
    /// Filter, de-duplicate (keeping first occurrences) and cap `suggestions`.
    pub fn process(&self, partial: &str, suggestions: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            if self.filter.accepts(partial, &suggestion) && !kept.contains(&suggestion) {
                kept.push(suggestion);
            }
        }
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        kept
    }
}

impl DispatcherConfig {
    /// Parse a TOML document, returning the error to the caller.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse dispatcher config");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read dispatcher config");
                Self::default()
            }
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            did_you_mean_distance: self.did_you_mean_distance,
            check_permissions: true,
        }
    }

    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            include_aliases: self.suggestions.include_aliases,
        }
    }
}
