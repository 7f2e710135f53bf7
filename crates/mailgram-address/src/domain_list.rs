//! Obsolete source-route domain lists, e.g. `@route1,@route2`.
//!
//! These appear both as a standalone header value and as the route prefix
//! inside an angle address (`<@route1,@route2:local@domain>`).

use std::fmt;

use crate::error::{Error, Result};
use crate::lexer::{self, Lexer};

/// Ordered list of route domains.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList {
    domains: Vec<String>,
}

impl DomainList {
    /// Creates an empty domain list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    /// Returns the number of domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns true if the list has no domains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Returns the domain at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.domains.get(index).map(String::as_str)
    }

    /// Returns an iterator over the domains in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.domains.iter()
    }

    /// Returns the position of the first occurrence of `domain`.
    #[must_use]
    pub fn index_of(&self, domain: &str) -> Option<usize> {
        self.domains.iter().position(|d| d == domain)
    }

    /// Returns true if the list contains `domain`.
    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.index_of(domain).is_some()
    }

    /// Appends a domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomain`] if the domain is empty or whitespace.
    pub fn push(&mut self, domain: impl Into<String>) -> Result<()> {
        let domain = domain.into();
        Self::validate(&domain)?;
        self.domains.push(domain);
        Ok(())
    }

    /// Inserts a domain at `index`, shifting later entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomain`] if the domain is empty or whitespace.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, like [`Vec::insert`].
    pub fn insert(&mut self, index: usize, domain: impl Into<String>) -> Result<()> {
        let domain = domain.into();
        Self::validate(&domain)?;
        self.domains.insert(index, domain);
        Ok(())
    }

    /// Replaces the domain at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomain`] if the domain is empty or whitespace.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, domain: impl Into<String>) -> Result<()> {
        let domain = domain.into();
        Self::validate(&domain)?;
        self.domains[index] = domain;
        Ok(())
    }

    /// Removes and returns the domain at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, like [`Vec::remove`].
    pub fn remove(&mut self, index: usize) -> String {
        self.domains.remove(index)
    }

    fn validate(domain: &str) -> Result<()> {
        if domain.trim().is_empty() {
            return Err(Error::InvalidDomain {
                position: 0,
                message: "domain must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parses a source-route list, returning `None` on failure.
    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Parses a source-route list such as `@domain1,@domain2`.
    ///
    /// Empty elements between separators are dropped. The whole list fails on
    /// a malformed domain, an unterminated comment or domain literal, or
    /// input that is empty, whitespace-only, or a lone `@`.
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
        let route = parse_route(&mut lexer)?;
        lexer.skip_cfws()?;
        if !lexer.is_eof() {
            return Err(lexer.syntax_error("unexpected text after domain list"));
        }
        if route.is_empty() {
            return Err(Error::InvalidDomain {
                position: lexer.position(),
                message: "expected at least one domain".to_string(),
            });
        }
        Ok(route)
    }
}

impl fmt::Display for DomainList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, domain) in self.domains.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "@{domain}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DomainList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}

/// Parses `@domain` entries separated by commas and CFWS, stopping at the
/// first byte that belongs to neither. Consecutive separators are skipped.
pub(crate) fn parse_route(lexer: &mut Lexer<'_>) -> Result<DomainList> {
    let mut route = DomainList::new();
    loop {
        lexer.skip_cfws()?;
        match lexer.peek() {
            Some(b',') => {
                lexer.advance();
            }
            Some(b'@') => {
                lexer.advance();
                lexer.skip_cfws()?;
                route.push(read_domain(lexer)?)?;
            }
            _ => break,
        }
    }
    Ok(route)
}

/// Reads one domain: either a bracketed domain literal or dot-separated
/// atoms. Comments between labels are discarded; trailing CFWS is left
/// unconsumed.
pub(crate) fn read_domain(lexer: &mut Lexer<'_>) -> Result<String> {
    match lexer.peek() {
        Some(b'[') => lexer.read_domain_literal(),
        Some(byte) if lexer::is_atext(byte) => {
            let mut domain = String::from(lexer.read_atom()?);
            loop {
                let mark = lexer.position();
                lexer.skip_cfws()?;
                if lexer.peek() == Some(b'.') {
                    lexer.advance();
                    lexer.skip_cfws()?;
                    match lexer.peek() {
                        Some(byte) if lexer::is_atext(byte) => {
                            domain.push('.');
                            domain.push_str(lexer.read_atom()?);
                        }
                        // Tolerate a dangling trailing dot.
                        _ => break,
                    }
                } else {
                    lexer.seek(mark);
                    break;
                }
            }
            Ok(domain)
        }
        _ => Err(Error::InvalidDomain {
            position: lexer.position(),
            message: "expected domain after '@'".to_string(),
        }),
    }
}
