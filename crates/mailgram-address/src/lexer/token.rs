//! Lexical units of the header grammar.

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of atom characters (unquoted text without special characters).
    Atom(&'a str),
    /// Quoted string with escape sequences resolved and folding collapsed.
    QuotedString(String),
    /// Bracketed domain literal, brackets included, folding dropped.
    DomainLiteral(String),
    /// Parenthesized comment; the content excludes the outer parentheses.
    Comment(String),
    /// Opening angle bracket.
    LAngle,
    /// Closing angle bracket.
    RAngle,
    /// At sign.
    At,
    /// Comma.
    Comma,
    /// Colon.
    Colon,
    /// Semicolon.
    Semicolon,
    /// Dot.
    Dot,
    /// End of input.
    Eof,
}
