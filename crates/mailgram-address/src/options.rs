//! Parser and serializer configuration.
//!
//! Both option types follow the same discipline: a process-wide immutable
//! default reachable through `shared()`, and explicit clone-to-customize for
//! anything else. The shared default is never mutated in place.

use std::sync::LazyLock;

/// Default maximum line length used when folding serialized header values.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 78;

/// Options controlling tolerant parsing behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Charset label used when an encoded word declares an unknown charset or
    /// its payload does not decode cleanly under the declared charset.
    pub fallback_charset: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            fallback_charset: String::from("utf-8"),
        }
    }
}

impl ParserOptions {
    /// Creates options equal to the shared default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared immutable default options.
    ///
    /// Callers that need different settings must clone this value and modify
    /// the copy.
    #[must_use]
    pub fn shared() -> &'static Self {
        static DEFAULT: LazyLock<ParserOptions> = LazyLock::new(ParserOptions::default);
        &DEFAULT
    }
}

/// Options controlling serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line length before the encoder folds at a token boundary.
    pub max_line_length: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl FormatOptions {
    /// Creates options equal to the shared default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared immutable default options.
    #[must_use]
    pub fn shared() -> &'static Self {
        static DEFAULT: LazyLock<FormatOptions> = LazyLock::new(FormatOptions::default);
        &DEFAULT
    }
}
