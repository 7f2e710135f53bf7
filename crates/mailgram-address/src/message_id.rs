//! Message identifier lists and free-text reference extraction.
//!
//! The structured grammar parses `<id>` tokens separated by CFWS and commas.
//! The free-text scanner handles obsolete In-Reply-To/References bodies where
//! message identifiers are buried in arbitrary prose.

use std::fmt;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};

/// Ordered list of message identifiers, stored without their angle brackets.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageIdList {
    ids: Vec<String>,
}

impl MessageIdList {
    /// Creates an empty message-id list.
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Returns the number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the list has no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the identifier at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Returns an iterator over the identifiers in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.ids.iter()
    }

    /// Returns the position of the first occurrence of `id`.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|entry| entry == id)
    }

    /// Returns true if the list contains `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Appends an identifier (without angle brackets).
    pub fn push(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Inserts an identifier at `index`, shifting later entries.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, like [`Vec::insert`].
    pub fn insert(&mut self, index: usize, id: impl Into<String>) {
        self.ids.insert(index, id.into());
    }

    /// Removes and returns the identifier at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, like [`Vec::remove`].
    pub fn remove(&mut self, index: usize) -> String {
        self.ids.remove(index)
    }

    /// Parses a message-id list, returning `None` on failure.
    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Parses one or more `<id>` tokens separated by CFWS and commas.
    ///
    /// Empty elements between separators are dropped; a token missing its
    /// closing `>` fails the whole list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for empty or whitespace-only input and a
    /// positional error for malformed lists.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lexer = Lexer::new(text.as_bytes());
        lexer.skip_cfws()?;
        if lexer.is_eof() {
            return Err(Error::EmptyInput);
        }
        let mut list = Self::new();
        loop {
            match lexer.next_token()? {
                Token::Eof => break,
                Token::Comma | Token::Comment(_) => {}
                Token::LAngle => {
                    let id = read_id(&mut lexer)?;
                    if !id.is_empty() {
                        list.push(id);
                    }
                }
                _ => {
                    return Err(lexer.syntax_error("expected '<' to begin a message identifier"));
                }
            }
        }
        if list.is_empty() {
            return Err(lexer.syntax_error("expected at least one message identifier"));
        }
        Ok(list)
    }
}

/// Reads the content of one identifier after its opening `<`.
fn read_id(lexer: &mut Lexer<'_>) -> Result<String> {
    let mut id = String::new();
    loop {
        match lexer.next_token()? {
            Token::RAngle => return Ok(id),
            Token::Atom(text) => id.push_str(text),
            Token::QuotedString(text) => id.push_str(&text),
            Token::DomainLiteral(text) => id.push_str(&text),
            Token::Dot => id.push('.'),
            Token::At => id.push('@'),
            Token::Colon => id.push(':'),
            Token::Comment(_) => {}
            Token::Eof => {
                return Err(Error::Syntax {
                    position: lexer.position(),
                    message: "message identifier is missing its closing '>'".to_string(),
                });
            }
            Token::LAngle | Token::Comma | Token::Semicolon => {
                return Err(lexer.syntax_error("unexpected character in message identifier"));
            }
        }
    }
}

impl fmt::Display for MessageIdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.ids.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "<{id}>")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MessageIdList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Scans arbitrary text for `<...>` tokens in left-to-right order.
///
/// Used for obsolete In-Reply-To bodies that mix prose (often a date and
/// display phrase) with the actual message identifiers. Each yielded item
/// includes its enclosing angle brackets; when the prose itself contains a
/// stray `<`, the token starts at the innermost `<` before the closing `>`.
/// The iterator is lazy and finite; a fresh call over the same text yields
/// the same sequence.
#[must_use]
pub fn enumerate_references(text: &str) -> References<'_> {
    References { text, pos: 0 }
}

/// Iterator over `<...>` tokens in free-form text.
///
/// See [`enumerate_references`].
#[derive(Debug, Clone)]
pub struct References<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for References<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.text.get(self.pos..)?;
        let open = rest.find('<')?;
        let close = rest[open + 1..].find('>')? + open + 1;
        // A stray '<' in the prose restarts the token at the innermost one.
        let open = rest[..close].rfind('<').unwrap_or(open);
        self.pos += close + 1;
        Some(&rest[open..=close])
    }
}

impl std::iter::FusedIterator for References<'_> {}
